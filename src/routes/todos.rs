// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo routes.
//!
//! Mutations carry the acting `author` in the body; it must match the
//! stored author exactly.

use crate::error::{AppError, Result};
use crate::models::{
    CreateTodoRequest, DeleteTodoRequest, MessageResponse, TodoResponse, UpdateTodoRequest,
};
use crate::routes::ApiJson;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", put(update_todo).delete(delete_todo))
}

/// Ids are numeric; anything else cannot name a todo.
fn parse_id(raw: &str) -> Result<u64> {
    raw.parse().map_err(|_| AppError::todo_not_found())
}

/// All todos, newest first.
async fn list_todos(State(state): State<Arc<AppState>>) -> Result<ApiJson<Vec<TodoResponse>>> {
    let todos = state.todos.list().await?;
    tracing::debug!(count = todos.len(), "Listing todos");
    Ok(ApiJson(todos.into_iter().map(TodoResponse::from).collect()))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateTodoRequest>,
) -> Result<(StatusCode, ApiJson<TodoResponse>)> {
    let todo = state.todos.create(request).await?;
    Ok((StatusCode::CREATED, ApiJson(todo.into())))
}

/// Mutation bodies are optional. A missing body means no author, which
/// fails the ownership check rather than the request.
fn mutation_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiJson<TodoResponse>> {
    let id = parse_id(&id)?;
    let request: UpdateTodoRequest = mutation_body(&body)?;
    let (author, patch) = request.into_parts();
    let todo = state.todos.update(id, &author, patch).await?;
    Ok(ApiJson(todo.into()))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ApiJson<MessageResponse>> {
    let id = parse_id(&id)?;
    let request: DeleteTodoRequest = mutation_body(&body)?;

    state.todos.delete(id, &request.author).await?;

    Ok(ApiJson(MessageResponse {
        message: "Deleted".to_string(),
    }))
}
