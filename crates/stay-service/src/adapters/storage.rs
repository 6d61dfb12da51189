//! Local-disk media storage
//!
//! Each upload is stored as a flat file `{upload_dir}/{uuid}.{ext}` and served
//! from `{public_base_url}/{uuid}.{ext}`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stay_common::StorageConfig;
use stay_core::{DomainError, MediaStorage};
use tokio::fs;
use tracing::{debug, info};

pub struct LocalMediaStorage {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalMediaStorage {
    pub async fn new(
        dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        max_bytes: usize,
    ) -> Result<Self, DomainError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| DomainError::MediaStorage(format!("{}: {e}", dir.display())))?;
        info!(dir = %dir.display(), "Media storage directory ready");

        Ok(Self {
            dir,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        })
    }

    pub async fn from_config(config: &StorageConfig) -> Result<Self, DomainError> {
        Self::new(
            &config.upload_dir,
            config.public_base_url.clone(),
            config.max_file_size_bytes(),
        )
        .await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "audio/webm" => "weba",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, bytes: &[u8], content_type: &str) -> Result<String, DomainError> {
        if bytes.len() > self.max_bytes {
            return Err(DomainError::ValidationError(format!(
                "upload of {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_bytes
            )));
        }

        let name = format!("{}.{}", uuid::Uuid::new_v4(), extension_for(content_type));
        let path = self.dir.join(&name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::MediaStorage(format!("{}: {e}", path.display())))?;

        debug!(file = %name, size = bytes.len(), content_type, "Media stored");
        Ok(format!("{}/{name}", self.public_base_url))
    }
}
