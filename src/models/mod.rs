// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod asset;
pub mod todo;
pub mod user;

pub use asset::{ImageUpload, StoredAsset, UploadResponse};
pub use todo::{
    CreateTodoRequest, DeleteTodoRequest, MessageResponse, NewTodo, Todo, TodoPatch,
    TodoResponse, UpdateTodoRequest,
};
pub use user::{Credentials, LoginResponse, RegisterResponse, User};
