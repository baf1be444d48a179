use std::path::PathBuf;

use actix_multipart::Field;
use chrono::Utc;
use futures_util::TryStreamExt;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::attendance::PhotoEvidence;

/// Public URL prefix the upload root is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

const ATTENDANCE_SUBDIR: &str = "attendance";

fn extension_for(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        _ => None,
    }
}

/// Disk-backed store for check-in photos. Type and size are enforced here,
/// before the check-in workflow sees the file.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_size: usize,
}

impl UploadStore {
    pub async fn new(root: PathBuf, max_size: usize) -> std::io::Result<Self> {
        fs::create_dir_all(root.join(ATTENDANCE_SUBDIR)).await?;
        Ok(Self { root, max_size })
    }

    /// Streams a multipart file field to disk.
    pub async fn save_field(&self, mut field: Field) -> Result<PhotoEvidence, AppError> {
        let mime = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        if extension_for(&mime).is_none() {
            return Err(AppError::invalid("Only JPG/PNG images are allowed"));
        }

        let original_name = field
            .content_disposition()
            .get_filename()
            .unwrap_or("photo")
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if data.len() + chunk.len() > self.max_size {
                return Err(self.too_large());
            }
            data.extend_from_slice(&chunk);
        }

        self.save(&original_name, &mime, &data).await
    }

    pub async fn save(
        &self,
        original_name: &str,
        mime: &str,
        data: &[u8],
    ) -> Result<PhotoEvidence, AppError> {
        let ext = extension_for(mime)
            .ok_or_else(|| AppError::invalid("Only JPG/PNG images are allowed"))?;
        if data.is_empty() {
            return Err(AppError::invalid("Photo is empty"));
        }
        if data.len() > self.max_size {
            return Err(self.too_large());
        }

        let stamp = Utc::now().format("%Y%m%dT%H%M%S");
        let stored_name = format!("{}_{}.{}", stamp, Uuid::new_v4().to_simple(), ext);
        let path = self.root.join(ATTENDANCE_SUBDIR).join(&stored_name);

        fs::write(&path, data).await.map_err(|e| {
            AppError::Internal(format!("Failed to write upload {}: {}", path.display(), e))
        })?;

        debug!(file = %stored_name, size = data.len(), "Stored attendance photo");

        Ok(PhotoEvidence {
            file_path: format!("{}/{}/{}", PUBLIC_PREFIX, ATTENDANCE_SUBDIR, stored_name),
            file_name: original_name.to_string(),
            mime_type: mime.to_string(),
            file_size: data.len() as u64,
        })
    }

    /// Removes a stored file whose check-in was rejected. Best effort.
    pub async fn discard(&self, evidence: &PhotoEvidence) {
        let Some(name) = evidence.file_path.rsplit('/').next() else {
            return;
        };
        if name.is_empty() || name.contains("..") {
            return;
        }
        let path = self.root.join(ATTENDANCE_SUBDIR).join(name);
        if let Err(e) = fs::remove_file(&path).await {
            warn!(error = %e, path = %path.display(), "Failed to discard rejected upload");
        }
    }

    fn too_large(&self) -> AppError {
        AppError::invalid(format!(
            "Photo exceeds the maximum size of {} bytes",
            self.max_size
        ))
    }
}
