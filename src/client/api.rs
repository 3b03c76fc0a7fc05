// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the todo API.
//!
//! Errors carry the server's `message` verbatim so callers can surface it
//! without interpretation.

use crate::client::image::PendingImage;
use crate::models::{
    CreateTodoRequest, Credentials, DeleteTodoRequest, LoginResponse, MessageResponse,
    RegisterResponse, TodoResponse, UpdateTodoRequest, UploadResponse,
};
use serde::Deserialize;

/// Client-side failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error status.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A local precondition failed before any request was sent.
    #[error("{0}")]
    Rejected(String),

    /// A create is already in flight for this session.
    #[error("Another todo is still being added")]
    Busy,
}

impl ClientError {
    /// Text to show the user: the server's message when there is one,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Rejected(message) => message.clone(),
            ClientError::Busy => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Thin typed wrapper over the REST endpoints.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server origin, e.g. `http://localhost:5001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<RegisterResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/register"))
            .json(credentials)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/login"))
            .json(credentials)
            .send()
            .await?;
        check_response_json(response).await
    }

    /// Upload image bytes as the multipart field `image`.
    pub async fn upload_image(&self, image: &PendingImage) -> Result<UploadResponse, ClientError> {
        let part = reqwest::multipart::Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn list_todos(&self) -> Result<Vec<TodoResponse>, ClientError> {
        let response = self.http.get(self.url("/api/todos")).send().await?;
        check_response_json(response).await
    }

    pub async fn create_todo(&self, request: &CreateTodoRequest) -> Result<TodoResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/todos"))
            .json(request)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn update_todo(
        &self,
        id: u64,
        request: &UpdateTodoRequest,
    ) -> Result<TodoResponse, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/todos/{}", id)))
            .json(request)
            .send()
            .await?;
        check_response_json(response).await
    }

    pub async fn delete_todo(&self, id: u64, author: &str) -> Result<MessageResponse, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/todos/{}", id)))
            .json(&DeleteTodoRequest {
                author: author.to_string(),
            })
            .send()
            .await?;
        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_default();

        tracing::debug!(status = status.as_u16(), message = %message, "API request failed");
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}
