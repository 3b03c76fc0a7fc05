// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod assets;
pub mod identity;
pub mod todos;

pub use assets::{AssetStore, LocalAssetStore};
pub use identity::IdentityService;
pub use todos::TodoService;
