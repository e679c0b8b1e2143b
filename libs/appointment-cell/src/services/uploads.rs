use std::path::PathBuf;

use chrono::Utc;
use tokio::fs;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{AppointmentDocument, AppointmentError};

pub const PUBLIC_PREFIX: &str = "/uploads";

/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(raw).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn is_image(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
        }
    }

    /// Writes the bytes under a unique name and returns the public record.
    pub async fn save(
        &self,
        original_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<AppointmentDocument, AppointmentError> {
        if bytes.is_empty() {
            return Err(AppointmentError::ValidationError("Uploaded file is empty".to_string()));
        }

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(original_name));

        fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            error!("Cannot create upload dir {}: {}", self.upload_dir.display(), e);
            AppointmentError::UploadError(e.to_string())
        })?;

        let target = self.upload_dir.join(&stored_name);
        fs::write(&target, bytes).await.map_err(|e| {
            error!("Cannot write upload {}: {}", target.display(), e);
            AppointmentError::UploadError(e.to_string())
        })?;
        debug!("Stored {} bytes at {}", bytes.len(), target.display());

        Ok(AppointmentDocument {
            name: original_name.to_string(),
            path: format!("{}/{}", PUBLIC_PREFIX, stored_name),
            uploaded_at: Utc::now(),
            mime_type: mime_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_flattened_and_cleaned() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\scans\\x ray (1).png"), "x_ray__1_.png");
        assert_eq!(sanitize_file_name("..."), "file");
        assert_eq!(sanitize_file_name(""), "file");
    }

    #[test]
    fn only_image_mime_types_count_as_images() {
        assert!(is_image("image/jpeg"));
        assert!(!is_image("application/pdf"));
    }
}
