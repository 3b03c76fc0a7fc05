// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo lifecycle: creation with authorship binding, ownership-gated
//! mutation, and release of attached images on delete.

use crate::db::TodoStore;
use crate::error::{AppError, Result};
use crate::models::todo::non_empty;
use crate::models::{CreateTodoRequest, NewTodo, Todo, TodoPatch};
use crate::services::assets::AssetStore;
use crate::services::identity::IdentityService;
use crate::time_utils::now_micros;
use std::sync::Arc;

/// Business rules on top of a [`TodoStore`].
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    identity: IdentityService,
    assets: Arc<dyn AssetStore>,
}

impl TodoService {
    pub fn new(
        store: Arc<dyn TodoStore>,
        identity: IdentityService,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            store,
            identity,
            assets,
        }
    }

    /// Create a todo for an existing author.
    ///
    /// The image locator is stored as given; its content is never inspected.
    pub async fn create(&self, request: CreateTodoRequest) -> Result<Todo> {
        if request.title.trim().is_empty() || request.author.is_empty() {
            return Err(AppError::Validation(
                "Title and author required".to_string(),
            ));
        }

        let author = self
            .identity
            .resolve(&request.author)
            .await?
            .ok_or(AppError::AuthorNotFound)?;

        let todo = self
            .store
            .insert_todo(NewTodo {
                title: request.title,
                description: non_empty(request.description),
                author: author.username,
                author_id: author.id,
                image_url: non_empty(request.image_url),
                created_at: now_micros(),
            })
            .await?;

        tracing::info!(
            todo_id = todo.id,
            author = %todo.author,
            has_image = todo.image_url.is_some(),
            "Todo created"
        );
        Ok(todo)
    }

    /// All todos, newest first.
    pub async fn list(&self) -> Result<Vec<Todo>> {
        self.store.list_todos().await
    }

    pub async fn update(&self, id: u64, author: &str, patch: TodoPatch) -> Result<Todo> {
        let todo = self.store.update_todo(id, author, patch).await?;
        tracing::debug!(todo_id = id, completed = todo.completed, "Todo updated");
        Ok(todo)
    }

    /// Delete a todo and release its image.
    ///
    /// A failed release is logged; the record is gone either way.
    pub async fn delete(&self, id: u64, author: &str) -> Result<()> {
        let removed = self.store.delete_todo(id, author).await?;

        if let Some(locator) = removed.image_url.as_deref() {
            if let Err(e) = self.assets.release(locator).await {
                tracing::warn!(
                    todo_id = id,
                    locator,
                    error = %e,
                    "Failed to release image for deleted todo"
                );
            }
        }

        tracing::info!(todo_id = id, author, "Todo deleted");
        Ok(())
    }
}
