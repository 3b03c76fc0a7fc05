// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image selected for the next create, validated before any upload.

use crate::client::api::ClientError;
use crate::models::asset::{is_image_media_type, MAX_IMAGE_BYTES};
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const NOT_AN_IMAGE: &str = "Please select an image file (JPEG, PNG, GIF, etc.)";
pub const IMAGE_TOO_LARGE: &str = "Image file size must be less than 5MB";

/// A local image that passed the type and size gate.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl PendingImage {
    /// Gate a selected file: it must be `image/*` and at most 5 MiB.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, ClientError> {
        let content_type = content_type.into();
        if !is_image_media_type(&content_type) {
            return Err(ClientError::Rejected(NOT_AN_IMAGE.to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ClientError::Rejected(IMAGE_TOO_LARGE.to_string()));
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Inline `data:` URI used as the local preview.
    pub fn preview_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}
