/// Avatar storage
///
/// Signup accepts an avatar file and must end up with a URL to store on
/// the user. [`AvatarHost`] abstracts where the bytes go: deployments
/// with an upload service forward them over HTTP, everyone else writes
/// them under a local directory that the front proxy serves as
/// `/uploads`. Tests plug in [`MemoryAvatarHost`].
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::AvatarConfig;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Transport(String),
    #[error("upload service returned no url")]
    MissingUrl,
    #[error("failed to store avatar: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait AvatarHost: Send + Sync {
    /// Store the file and return the public URL it will be served from.
    async fn upload(&self, filename: &str, data: Bytes) -> Result<String, UploadError>;
}

/// Pick the host from configuration: the upload service when an
/// endpoint is configured, local disk otherwise.
pub fn from_config(config: &AvatarConfig) -> Arc<dyn AvatarHost> {
    match &config.upload_url {
        Some(url) => Arc::new(HttpAvatarHost::new(url.clone())),
        None => Arc::new(DiskAvatarHost::new(config.dir.clone())),
    }
}

/// Forwards avatars to an external upload service and relays back the
/// URL the service assigns.
pub struct HttpAvatarHost {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadServiceResponse {
    url: String,
}

impl HttpAvatarHost {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AvatarHost for HttpAvatarHost {
    async fn upload(&self, filename: &str, data: Bytes) -> Result<String, UploadError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec()).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let body: UploadServiceResponse =
            response.json().await.map_err(|_| UploadError::MissingUrl)?;

        Ok(body.url)
    }
}

/// Writes avatars under a local directory with a fresh UUID name,
/// keeping the original file extension.
pub struct DiskAvatarHost {
    dir: PathBuf,
}

impl DiskAvatarHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl AvatarHost for DiskAvatarHost {
    async fn upload(&self, filename: &str, data: Bytes) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };

        tokio::fs::write(self.dir.join(&name), &data).await?;

        Ok(format!("/uploads/{name}"))
    }
}

/// In-memory host for tests and demos. Records every upload and can be
/// built to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryAvatarHost {
    uploads: Mutex<Vec<String>>,
    fail: bool,
}

impl MemoryAvatarHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// URLs handed out so far.
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl AvatarHost for MemoryAvatarHost {
    async fn upload(&self, filename: &str, _data: Bytes) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Transport("simulated upload failure".to_string()));
        }

        let url = format!("/uploads/{filename}");
        self.uploads.lock().unwrap_or_else(|e| e.into_inner()).push(url.clone());

        Ok(url)
    }
}
