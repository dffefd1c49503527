//! Local storage for uploaded crop images

use std::path::{Path, PathBuf};

use chrono::Utc;
use shared::ImageReference;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};

/// Public URL prefix the upload directory is served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Writes accepted images to the configured upload directory
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            root: PathBuf::from(&config.destination),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store image bytes under a fresh unique name
    pub async fn save(
        &self,
        bytes: &[u8],
        original_name: Option<&str>,
        content_type: &str,
    ) -> AppResult<ImageReference> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to create upload directory: {}", e)))?;

        let file_name = unique_file_name(original_name, content_type);
        let path = self.root.join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to write image: {}", e)))?;

        tracing::debug!("Stored upload {} ({} bytes)", path.display(), bytes.len());

        Ok(ImageReference::new(
            format!("{}/{}", UPLOADS_URL_PREFIX, file_name),
            path.to_string_lossy().into_owned(),
        ))
    }
}

/// `image-{unix_millis}-{uuid}{ext}`
fn unique_file_name(original_name: Option<&str>, content_type: &str) -> String {
    format!(
        "image-{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension(original_name, content_type)
    )
}

fn extension(original_name: Option<&str>, content_type: &str) -> String {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match from_name {
        Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
        None => match content_type {
            "image/png" => ".png".to_string(),
            "image/jpeg" | "image/jpg" => ".jpg".to_string(),
            _ => String::new(),
        },
    }
}
