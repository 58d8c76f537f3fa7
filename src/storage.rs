//! Artifact storage
//!
//! Uploaded artifacts are addressed by request id. [`LocalArtifactStore`] writes them into a
//! directory that is expected to be served under `public_base_url`.

use async_trait::async_trait;
use std::path::PathBuf;
use url::Url;

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::types::{ReportFormat, RequestId};

/// Destination for finished report artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `id` and return the URL the artifact can be fetched from
    async fn upload(&self, bytes: Vec<u8>, id: &RequestId) -> Result<String>;
}

/// [`ArtifactStore`] writing into a local directory
pub struct LocalArtifactStore {
    root_dir: PathBuf,
    public_base_url: Url,
    format: ReportFormat,
}

impl LocalArtifactStore {
    /// Create a store from configuration
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let mut public_base_url = Url::parse(&config.public_base_url).map_err(StorageError::Url)?;
        if !public_base_url.path().ends_with('/') {
            let path = format!("{}/", public_base_url.path());
            public_base_url.set_path(&path);
        }

        Ok(Self {
            root_dir: config.root_dir.clone(),
            public_base_url,
            format: ReportFormat::Xlsx,
        })
    }

    /// Directory artifacts are written to
    pub fn root_dir(&self) -> &PathBuf {
        &self.root_dir
    }

    fn file_name(&self, id: &RequestId) -> std::result::Result<String, StorageError> {
        let raw = id.as_str();
        let valid = !raw.is_empty()
            && !raw.starts_with('.')
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidId(raw.to_string()));
        }
        Ok(format!("{}.{}", raw, self.format.name()))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn upload(&self, bytes: Vec<u8>, id: &RequestId) -> Result<String> {
        let file_name = self.file_name(id)?;
        let path = self.root_dir.join(&file_name);
        let partial = self.root_dir.join(format!("{}.part", file_name));

        tracing::info!(request_id = %id, path = %path.display(), "Start saving report");

        let write = async {
            tokio::fs::create_dir_all(&self.root_dir).await?;
            tokio::fs::write(&partial, &bytes).await?;
            // Rename so readers never observe a half-written artifact
            tokio::fs::rename(&partial, &path).await
        };
        if let Err(source) = write.await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StorageError::Write { path, source }.into());
        }

        let url = self
            .public_base_url
            .join(&file_name)
            .map_err(StorageError::Url)?;

        tracing::info!(request_id = %id, url = %url, "Finish saving report");
        Ok(url.to_string())
    }
}
