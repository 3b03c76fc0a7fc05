// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Image asset storage.
//!
//! Images are written to a local directory and addressed by a locator of
//! the form `/uploads/<filename>`, where the filename is
//! `<unix millis>-<random below 1e9><original extension>`.

use crate::error::{AppError, Result};
use crate::models::asset::{is_image_media_type, MAX_IMAGE_BYTES, UPLOADS_ROUTE};
use crate::models::{ImageUpload, StoredAsset};
use async_trait::async_trait;
use ring::rand::SystemRandom;
use std::path::{Component, Path, PathBuf};

/// Accepts image bytes and hands back stable locators.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Gate and persist an image.
    async fn store(&self, upload: ImageUpload) -> Result<StoredAsset>;

    /// Remove the asset behind `locator`. Missing assets are not an error.
    async fn release(&self, locator: &str) -> Result<()>;
}

/// Reject anything that is not an image of acceptable size.
pub fn check_image(content_type: Option<&str>, len: usize) -> Result<()> {
    if !content_type.map(is_image_media_type).unwrap_or(false) {
        return Err(AppError::Validation(
            "Only image files are allowed!".to_string(),
        ));
    }
    if len == 0 {
        return Err(AppError::Validation("No image file uploaded".to_string()));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(
            "Image file size must be less than 5MB".to_string(),
        ));
    }
    Ok(())
}

/// Keep a short alphanumeric extension from the client's file name.
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// Extract the bare filename from a locator, refusing anything that could
/// escape the upload directory.
fn filename_from_locator(locator: &str) -> Option<&str> {
    let name = locator
        .strip_prefix(UPLOADS_ROUTE)
        .and_then(|rest| rest.strip_prefix('/'))?;

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}

/// Asset store backed by a directory on local disk.
pub struct LocalAssetStore {
    dir: PathBuf,
    rng: SystemRandom,
}

impl LocalAssetStore {
    /// Use `dir` for uploads, creating it if needed.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to create upload directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self {
            dir,
            rng: SystemRandom::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn unique_filename(&self, file_name: Option<&str>) -> Result<String> {
        let millis = chrono::Utc::now().timestamp_millis();
        let random: [u8; 4] = ring::rand::generate(&self.rng)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Random generator failed")))?
            .expose();
        let suffix = u32::from_le_bytes(random) % 1_000_000_000;
        Ok(format!("{}-{}{}", millis, suffix, extension_of(file_name)))
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn store(&self, upload: ImageUpload) -> Result<StoredAsset> {
        check_image(upload.content_type.as_deref(), upload.bytes.len())?;

        let filename = self.unique_filename(upload.file_name.as_deref())?;
        let path = self.dir.join(&filename);

        // create_new: never overwrite another upload's bytes
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create {}: {}", filename, e)))?;
        tokio::io::AsyncWriteExt::write_all(&mut file, &upload.bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write {}: {}", filename, e)))?;

        tracing::info!(
            filename = %filename,
            bytes = upload.bytes.len(),
            "Image stored"
        );

        Ok(StoredAsset {
            locator: format!("{}/{}", UPLOADS_ROUTE, filename),
            filename,
        })
    }

    async fn release(&self, locator: &str) -> Result<()> {
        let filename = filename_from_locator(locator).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Unrecognised asset locator: {}", locator))
        })?;

        match tokio::fs::remove_file(self.dir.join(filename)).await {
            Ok(()) => {
                tracing::info!(locator, "Image released");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(locator, "Image already gone");
                Ok(())
            }
            Err(e) => Err(AppError::Internal(anyhow::anyhow!(
                "Failed to remove {}: {}",
                locator,
                e
            ))),
        }
    }
}
