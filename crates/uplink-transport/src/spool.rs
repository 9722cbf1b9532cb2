//! Local filesystem spool transport.
//!
//! Stages each unit as a file named after the unit in a target
//! directory, with a JSON sidecar carrying the unit's caption and
//! attributes and a copy of its thumbnail when one is attached.

use crate::traits::{Transport, TransportError, TransportResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncRead;

use uplink_core::UnitMeta;

/// Local filesystem spool
#[derive(Clone)]
pub struct LocalSpool {
    base_path: PathBuf,
    max_object_size: u64,
}

impl LocalSpool {
    /// Create a new spool rooted at `base_path`, creating the
    /// directory if needed.
    pub async fn new(base_path: impl Into<PathBuf>, max_object_size: u64) -> TransportResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            TransportError::ConfigError(format!(
                "Failed to create spool directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalSpool {
            base_path,
            max_object_size,
        })
    }

    /// Convert a unit name to a spool path, rejecting names that would
    /// escape the spool directory.
    fn name_to_path(&self, name: &str) -> TransportResult<PathBuf> {
        if name.is_empty()
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(TransportError::InvalidName(name.to_string()));
        }
        Ok(self.base_path.join(name))
    }
}

#[async_trait]
impl Transport for LocalSpool {
    fn max_object_size(&self) -> u64 {
        self.max_object_size
    }

    async fn send(
        &self,
        meta: UnitMeta,
        mut payload: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> TransportResult<String> {
        if meta.size > self.max_object_size {
            return Err(TransportError::Rejected(format!(
                "\"{}\" is {} bytes, limit is {}",
                meta.name, meta.size, self.max_object_size
            )));
        }

        let path = self.name_to_path(&meta.name)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            TransportError::SendFailed(format!("Failed to create {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut payload, &mut file).await.map_err(|e| {
            TransportError::SendFailed(format!("Failed to write {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            TransportError::SendFailed(format!("Failed to sync {}: {}", path.display(), e))
        })?;

        if bytes_copied != meta.size {
            tracing::warn!(
                unit = %meta.name,
                declared = meta.size,
                copied = bytes_copied,
                "Unit stream length did not match its declared size"
            );
        }

        if let Some(thumb) = &meta.thumbnail {
            self.copy_thumbnail(&meta.name, thumb).await?;
        }

        let sidecar = self.name_to_path(&format!("{}.meta.json", meta.name))?;
        let manifest = serde_json::to_vec_pretty(&meta)
            .map_err(|e| TransportError::SendFailed(format!("Failed to encode manifest: {}", e)))?;
        fs::write(&sidecar, manifest).await.map_err(|e| {
            TransportError::SendFailed(format!("Failed to write {}: {}", sidecar.display(), e))
        })?;

        tracing::info!(
            unit = %meta.name,
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Unit staged"
        );

        Ok(path.display().to_string())
    }
}

impl LocalSpool {
    async fn copy_thumbnail(&self, unit_name: &str, thumb: &Path) -> TransportResult<()> {
        let dest = self.name_to_path(&format!("{}.thumb.jpg", unit_name))?;
        fs::copy(thumb, &dest).await.map_err(|e| {
            TransportError::SendFailed(format!(
                "Failed to copy thumbnail {} to {}: {}",
                thumb.display(),
                dest.display(),
                e
            ))
        })?;
        Ok(())
    }
}
