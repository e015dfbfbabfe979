use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::{self, PurgeReport};
use crate::security;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Marker embedded in the names of in-flight temporary files.
pub(crate) const TMP_MARKER: &str = ".britetmp.";

#[derive(Debug)]
pub struct StorageInner {
    /// Canonical physical root; every resolved path starts with it.
    pub(crate) root: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// Cheaply cloneable handle to a sandboxed directory.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Resolves a relative path to a physical path inside the root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] for absolute paths, `..` escapes and
    /// symlinks pointing outside the root, [`StorageError::Io`] if an existing ancestor
    /// cannot be inspected.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file does not exist.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::FileNotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Writes a file atomically, creating parent directories as needed.
    ///
    /// The bytes land in `<name>.britetmp.<n>` first, are synced, then renamed over the
    /// target. A crash leaves either the previous content or the new one, never a mix.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the root and
    /// [`StorageError::Io`] when the disk refuses the write.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directories for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);
        if let Err(err) = write_synced(&temp, data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&resolved)
                    .await
                    .context(format!("Failed to replace existing file: {}", resolved.display()))?;
                fs::rename(&temp, &resolved)
                    .await
                    .context(format!("Atomic swap failed: {}", resolved.display()))?;
            } else {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Atomic swap failed: {}", resolved.display()).into()),
                });
            }
        }

        if let Some(parent) = resolved.parent() {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File saved atomically");
        Ok(())
    }

    /// Removes a file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if there is nothing to remove.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        match fs::remove_file(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "File deleted");
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Err(StorageError::FileNotFound {
                message: resolved.display().to_string().into(),
                context: None,
            }),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", resolved.display()).into()),
            }),
        }
    }

    /// # Errors
    ///
    /// Fails only when the path is rejected by the sandbox.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.is_file())
    }

    /// Names of the regular files directly inside `dir`, sorted, temporary files excluded.
    ///
    /// A directory that does not exist yet lists as empty.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be read.
    pub async fn list(&self, dir: impl AsRef<Path>) -> Result<Vec<String>, StorageError> {
        let resolved = self.resolve(dir)?;

        let mut entries = match fs::read_dir(&resolved).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to list: {}", resolved.display()).into()),
                });
            },
        };

        let mut names = Vec::new();
        while let Some(entry) =
            entries.next_entry().await.context(format!("Failed to list: {}", resolved.display()))?
        {
            if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !name.contains(TMP_MARKER) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// Removes temporary files older than five minutes along with empty directories.
    pub async fn purge_tmp(&self) -> PurgeReport {
        maintenance::purge_tmp(&self.root, maintenance::STALE_AFTER).await
    }
}

async fn write_synced(temp: &Path, data: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(temp)
        .await
        .context(format!("Temp creation failed: {}", temp.display()))?;
    file.write_all(data).await.context("Write failed")?;
    file.sync_all().await.context("Hardware sync failed")?;
    Ok(())
}

async fn sync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
}
