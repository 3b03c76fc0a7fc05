// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Todo model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored todo record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Monotonic identifier (also used as document ID)
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    /// Author username; the key checked on update/delete
    pub author: String,
    /// Author user ID, resolved at creation
    pub author_id: u64,
    pub completed: bool,
    /// Locator of the attached image, if any
    pub image_url: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339_micros")]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// List order: newest `created_at` first. Equal timestamps go to the
    /// higher id first, so ties list in reverse insertion order.
    pub fn newest_first(a: &Todo, b: &Todo) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// Fields of a todo about to be inserted; the store assigns `id`.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    pub author_id: u64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewTodo {
    pub fn into_todo(self, id: u64) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            author: self.author,
            author_id: self.author_id,
            completed: false,
            image_url: self.image_url,
            created_at: self.created_at,
        }
    }
}

/// Partial update of the mutable todo fields.
///
/// `description: None` leaves the field alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Apply the patch in place. An empty title keeps the current one.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = non_empty(description);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
    }
}

/// Treat empty strings the same as an absent value.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Distinguish an explicit `null` from a missing key.
fn explicit_null<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

// ─── Wire Types ──────────────────────────────────────────────

/// Todo as exposed over the API (`_id` mirrors `id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodoResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[serde(rename = "_id")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub legacy_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub author: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub author_id: u64,
    pub completed: bool,
    pub image_url: Option<String>,
    #[serde(with = "crate::time_utils::rfc3339_micros")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            legacy_id: todo.id,
            title: todo.title,
            description: todo.description,
            author: todo.author,
            author_id: todo.author_id,
            completed: todo.completed,
            image_url: todo.image_url,
            created_at: todo.created_at,
        }
    }
}

/// Body of `POST /api/todos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Body of `PUT /api/todos/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default)]
    pub author: String,
}

impl UpdateTodoRequest {
    /// Split into the authorization key and the field patch.
    pub fn into_parts(self) -> (String, TodoPatch) {
        (
            self.author,
            TodoPatch {
                title: self.title,
                description: self.description,
                completed: self.completed,
            },
        )
    }
}

/// Body of `DELETE /api/todos/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteTodoRequest {
    #[serde(default)]
    pub author: String,
}

/// Plain `{message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}
