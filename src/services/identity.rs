// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity oracle: registration, credential checks and user lookup.
//!
//! Passwords are compared as stored; hashing and sessions are not part of
//! this service.

use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{Credentials, User};
use std::sync::Arc;
use validator::Validate;

const MISSING_CREDENTIALS: &str = "Username and password required";

/// Validates credentials against the user store.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new user.
    pub async fn register(&self, credentials: &Credentials) -> Result<User> {
        if !credentials.is_complete() {
            return Err(AppError::Validation(MISSING_CREDENTIALS.to_string()));
        }
        credentials.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid registration".to_string());
            AppError::Validation(message)
        })?;

        let user = self
            .users
            .insert_user(&credentials.username, &credentials.password)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username/password pair.
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        if !credentials.is_complete() {
            return Err(AppError::Validation(MISSING_CREDENTIALS.to_string()));
        }

        let user = self
            .users
            .find_user(&credentials.username)
            .await?
            .filter(|user| user.password == credentials.password)
            .ok_or(AppError::InvalidCredentials)?;

        tracing::debug!(user_id = user.id, "Login accepted");
        Ok(user)
    }

    /// Look up a user by name (authorship binding).
    pub async fn resolve(&self, username: &str) -> Result<Option<User>> {
        self.users.find_user(username).await
    }
}
