// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local mirror of the server's todo list.

use crate::models::TodoResponse;

/// Ordered cache of todos, newest first as the server lists them.
///
/// Entries are only changed with records the server has confirmed.
#[derive(Debug, Clone, Default)]
pub struct TodoCache {
    todos: Vec<TodoResponse>,
}

impl TodoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with a fresh server listing.
    pub fn replace_all(&mut self, todos: Vec<TodoResponse>) {
        self.todos = todos;
    }

    /// Insert a newly created todo at the head.
    pub fn prepend(&mut self, todo: TodoResponse) {
        self.todos.insert(0, todo);
    }

    /// Swap in the server's copy of a todo. Unknown ids are ignored.
    pub fn replace(&mut self, todo: TodoResponse) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }

    /// Drop a todo by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) {
        self.todos.retain(|t| t.id != id);
    }

    pub fn clear(&mut self) {
        self.todos.clear();
    }

    pub fn get(&self, id: u64) -> Option<&TodoResponse> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn todos(&self) -> &[TodoResponse] {
        &self.todos
    }

    pub fn todos_by<'a>(&'a self, author: &'a str) -> impl Iterator<Item = &'a TodoResponse> + 'a {
        self.todos.iter().filter(move |t| t.author == author)
    }

    /// Number of todos written by `author`.
    pub fn own_count(&self, author: &str) -> usize {
        self.todos_by(author).count()
    }

    pub fn total_count(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }
}
