// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uploaded image assets.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Public route prefix under which stored images are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Whether a media type names an image.
pub fn is_image_media_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Image bytes handed to the asset store.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Result of persisting an image.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAsset {
    /// Stable locator, e.g. `/uploads/1704103200000-123456789.png`
    pub locator: String,
    pub filename: String,
}

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UploadResponse {
    pub message: String,
    pub image_url: String,
    pub filename: String,
}
