// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Volatile in-process backend.
//!
//! Everything lives behind one `RwLock`, so id allocation and the
//! check-then-write of update/delete are serialized for free.

use crate::db::{ensure_author, TodoStore, UserStore};
use crate::error::AppError;
use crate::models::{NewTodo, Todo, TodoPatch, User};
use crate::time_utils::now_micros;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    todos: BTreeMap<u64, Todo>,
    users: HashMap<String, User>,
    last_todo_id: u64,
    last_user_id: u64,
}

/// In-memory store for users and todos. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryDb {
    async fn insert_todo(&self, new: NewTodo) -> Result<Todo, AppError> {
        let mut inner = self.inner.write().await;
        inner.last_todo_id += 1;
        let todo = new.into_todo(inner.last_todo_id);
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        let inner = self.inner.read().await;
        let mut todos: Vec<Todo> = inner.todos.values().cloned().collect();
        todos.sort_by(Todo::newest_first);
        Ok(todos)
    }

    async fn update_todo(
        &self,
        id: u64,
        author: &str,
        patch: TodoPatch,
    ) -> Result<Todo, AppError> {
        let mut inner = self.inner.write().await;
        let todo = inner
            .todos
            .get_mut(&id)
            .ok_or_else(AppError::todo_not_found)?;
        ensure_author(todo, author)?;
        patch.apply(todo);
        Ok(todo.clone())
    }

    async fn delete_todo(&self, id: u64, author: &str) -> Result<Todo, AppError> {
        let mut inner = self.inner.write().await;
        let todo = inner.todos.get(&id).ok_or_else(AppError::todo_not_found)?;
        ensure_author(todo, author)?;
        inner.todos.remove(&id).ok_or_else(AppError::todo_not_found)
    }
}

#[async_trait]
impl UserStore for MemoryDb {
    async fn insert_user(&self, username: &str, password: &str) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(username) {
            return Err(AppError::UsernameTaken);
        }
        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            username: username.to_string(),
            password: password.to_string(),
            created_at: now_micros(),
        };
        inner.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }
}
