use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::AppError;

/// 5 MiB upload limit per image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// An image written to disk under a generated name.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub filename: String,
    pub original_name: String,
}

/// Flat directory of gallery images, one file per upload.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn new(dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&dir).await?;
        tracing::info!("image storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<StoredImage, AppError> {
        let ext = image_extension(original_name, content_type).ok_or_else(|| {
            AppError::Validation("only jpeg, png, gif or webp images can be uploaded".to_string())
        })?;
        if data.is_empty() {
            return Err(AppError::Validation("image file is empty".to_string()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation(format!(
                "image exceeds the {} MB limit",
                MAX_IMAGE_BYTES / (1024 * 1024)
            )));
        }

        let filename = format!(
            "gallery-{}-{}.{ext}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        let path = self.file_path(&filename);

        if let Err(e) = write_file(&path, data).await {
            self.remove(&filename).await;
            return Err(e.into());
        }

        tracing::info!(filename = %filename, size = data.len(), "image stored");
        Ok(StoredImage {
            filename,
            original_name: original_name.to_string(),
        })
    }

    /// Best-effort delete; failures are logged and swallowed.
    pub async fn remove(&self, filename: &str) {
        let path = self.file_path(filename);
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(error = %e, path = %path.display(), "failed to delete image file");
        }
    }
}

async fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.flush().await
}

/// The lowercase extension to store an upload under, if both its file name and
/// declared content type name an allowed image format.
pub fn image_extension(original_name: &str, content_type: Option<&str>) -> Option<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())?;
    if !ALLOWED_TYPES.contains(&ext.as_str()) {
        return None;
    }

    let subtype = content_type?
        .trim()
        .to_ascii_lowercase()
        .strip_prefix("image/")?
        .to_string();
    if !ALLOWED_TYPES.contains(&subtype.as_str()) {
        return None;
    }

    Some(ext)
}
