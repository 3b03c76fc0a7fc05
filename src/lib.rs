// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Todo Board: a shared todo list with per-author mutation rights.
//!
//! This crate provides the backend API (with volatile and Firestore
//! storage), image uploads, and a client-side cache and sync engine that
//! talks to the API.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Backend;
use services::{AssetStore, IdentityService, TodoService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: IdentityService,
    pub todos: TodoService,
    pub assets: Arc<dyn AssetStore>,
}

impl AppState {
    /// Wire services over the selected backend and asset store.
    pub fn new(config: Config, backend: Backend, assets: Arc<dyn AssetStore>) -> Self {
        let identity = IdentityService::new(backend.users);
        let todos = TodoService::new(backend.todos, identity.clone(), assets.clone());
        Self {
            config,
            identity,
            todos,
            assets,
        }
    }
}
