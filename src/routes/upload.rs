// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image upload route.

use crate::error::{AppError, Result};
use crate::models::asset::MAX_IMAGE_BYTES;
use crate::models::{ImageUpload, UploadResponse};
use crate::routes::ApiJson;
use crate::AppState;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Router,
};
use std::sync::Arc;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

/// Body limit for uploads: headroom over the image limit so oversized
/// files reach the size check instead of failing mid-stream.
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_IMAGE_BYTES;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/upload",
        post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
}

fn no_file() -> AppError {
    AppError::Validation("No image file uploaded".to_string())
}

/// Store an uploaded image and return its locator.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ApiJson<UploadResponse>> {
    let mut multipart = multipart.map_err(|_| no_file())?;
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(no_file)?;
    let asset = state.assets.store(upload).await?;

    Ok(ApiJson(UploadResponse {
        message: "Image uploaded successfully".to_string(),
        image_url: asset.locator,
        filename: asset.filename,
    }))
}
