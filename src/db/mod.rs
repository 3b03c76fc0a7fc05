// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: storage traits and the two backends behind them.
//!
//! Both backends honour the same contract, including error variants and
//! list ordering. One is chosen at startup and shared through [`Backend`].

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{NewTodo, Todo, TodoPatch, User};
use async_trait::async_trait;
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TODOS: &str = "todos";
    /// Monotonic id counters (documents `todos` and `users`)
    pub const COUNTERS: &str = "counters";
}

/// Authoritative todo records.
///
/// `update_todo` and `delete_todo` check ownership and write as one step:
/// no other mutation of the same id may interleave.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a record under a freshly allocated, strictly increasing id.
    async fn insert_todo(&self, new: NewTodo) -> Result<Todo, AppError>;

    /// All records, newest first (see [`Todo::newest_first`]).
    async fn list_todos(&self) -> Result<Vec<Todo>, AppError>;

    /// Apply `patch` if `author` owns the record.
    async fn update_todo(&self, id: u64, author: &str, patch: TodoPatch)
        -> Result<Todo, AppError>;

    /// Remove the record if `author` owns it, returning what was removed.
    async fn delete_todo(&self, id: u64, author: &str) -> Result<Todo, AppError>;
}

/// Registered users (the identity oracle's storage).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; `UsernameTaken` if the name exists.
    async fn insert_user(&self, username: &str, password: &str) -> Result<User, AppError>;

    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError>;
}

/// Shared ownership check for both backends.
pub(crate) fn ensure_author(todo: &Todo, author: &str) -> Result<(), AppError> {
    if todo.author == author {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// The storage handles selected at process start.
#[derive(Clone)]
pub struct Backend {
    pub todos: Arc<dyn TodoStore>,
    pub users: Arc<dyn UserStore>,
}

impl Backend {
    /// Volatile in-process backend.
    pub fn memory() -> Self {
        let db = MemoryDb::new();
        Self {
            todos: Arc::new(db.clone()),
            users: Arc::new(db),
        }
    }

    /// Persistent Firestore backend.
    pub fn firestore(db: FirestoreDb) -> Self {
        Self {
            todos: Arc::new(db.clone()),
            users: Arc::new(db),
        }
    }

    /// Build the backend named in the configuration.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage_backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::memory())
            }
            StorageBackend::Firestore => {
                let project_id = config.gcp_project_id.as_deref().ok_or_else(|| {
                    AppError::Database("GCP_PROJECT_ID is required for Firestore".to_string())
                })?;
                Ok(Self::firestore(FirestoreDb::new(project_id).await?))
            }
        }
    }
}
