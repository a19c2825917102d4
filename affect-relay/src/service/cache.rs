//! Last-payload cache
//!
//! Keeps the most recent raw provider payload on disk so it can be
//! downloaded later. Writes go to a unique sibling file that is then renamed
//! over the target, so readers never see a half-written file. Concurrent
//! writers are last-writer-wins.

use affect_client::RawPayload;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const DEFAULT_FILE_NAME: &str = "last_response.json";

#[derive(Debug, Clone)]
pub struct PayloadCache {
    path: PathBuf,
}

impl PayloadCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name offered to downloads
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
    }

    /// Replaces the cached payload
    pub async fn store(&self, payload: &RawPayload) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", self.file_name(), Uuid::new_v4().simple()));

        let replaced = async {
            fs::write(&tmp, payload.as_bytes()).await?;
            fs::rename(&tmp, &self.path).await
        }
        .await;

        // A failed write may leave a partial temp file behind
        if let Err(err) = replaced {
            let _ = fs::remove_file(&tmp).await;
            return Err(err);
        }

        tracing::debug!(
            path = %self.path.display(),
            bytes = payload.len(),
            "Stored raw payload"
        );

        Ok(())
    }

    /// The cached payload, or `None` if nothing has been stored yet
    pub async fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
pub(crate) fn temp_cache() -> PayloadCache {
    let dir = std::env::temp_dir().join(format!("affect-relay-{}", Uuid::new_v4()));
    PayloadCache::new(dir.join("last_response.json"))
}
