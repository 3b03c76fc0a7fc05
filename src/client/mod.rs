// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client cache and sync engine for the todo API.

pub mod api;
pub mod cache;
pub mod flash;
pub mod image;
pub mod sync;

pub use api::{ApiClient, ClientError};
pub use cache::TodoCache;
pub use flash::{Flash, FLASH_TTL};
pub use image::PendingImage;
pub use sync::{OpState, Session, SyncEngine, TodoForm, UiState};
