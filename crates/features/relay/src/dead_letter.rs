//! Submissions that could not be delivered, kept as JSON files for manual recovery.

use crate::error::{RelayError, RelayErrorExt};
use brite_storage::{Storage, StorageError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

const PREFIX: &str = "failed-";
const EXTENSION: &str = ".json";

/// Contents of one dead-letter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    /// RFC 3339 time the payload was given up on.
    pub timestamp: String,
    pub payload: Value,
    pub errors: Vec<String>,
}

/// Dead-letter directory backed by [`Storage`], so every file is written atomically.
#[derive(Debug, Clone)]
pub struct DeadLetterStore {
    storage: Storage,
}

impl DeadLetterStore {
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Opens (and creates) the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Storage`] if the directory cannot be created.
    pub async fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, RelayError> {
        let storage = Storage::builder().root(path).create(true).connect().await.context("dead-letter directory")?;
        Ok(Self::new(storage))
    }

    /// Attaches to an existing directory without creating it or sweeping temporary
    /// files, so it is safe next to a running server.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Storage`] if the directory does not exist.
    pub async fn open_existing(path: impl Into<std::path::PathBuf>) -> Result<Self, RelayError> {
        let storage = Storage::builder()
            .root(path)
            .create(false)
            .sweep(false)
            .connect()
            .await
            .context("dead-letter directory")?;
        Ok(Self::new(storage))
    }

    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        self.storage.root()
    }

    /// Writes `payload` with the reasons it failed and returns the new file name.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Json`] or [`RelayError::Storage`] if the file cannot be
    /// written.
    pub async fn record(&self, payload: &Value, errors: &[String]) -> Result<String, RelayError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let name = format!("{PREFIX}{}-{}{EXTENSION}", now.replace([':', '.'], "-"), brite_kernel::safe_nanoid!());

        let letter = DeadLetter { timestamp: now, payload: payload.clone(), errors: errors.to_vec() };
        let json = serde_json::to_vec_pretty(&letter).context("serialize dead letter")?;
        self.storage.write(&name, &json).await.context(name.clone())?;

        error!(file = %name, errors = errors.len(), "Payload written to dead-letter store");
        Ok(name)
    }

    /// Like [`Self::record`], but failures are only logged.
    pub async fn record_or_log(&self, payload: &Value, errors: &[String]) -> Option<String> {
        match self.record(payload, errors).await {
            Ok(name) => Some(name),
            Err(e) => {
                error!(error = %e, "Failed to write dead letter");
                None
            },
        }
    }

    /// Dead-letter file names, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Storage`] if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<String>, RelayError> {
        let mut names: Vec<String> = self
            .storage
            .list(".")
            .await
            .context("list dead letters")?
            .into_iter()
            .filter(|name| is_dead_letter(name))
            .collect();
        names.reverse();
        Ok(names)
    }

    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] for unknown names, [`RelayError::Storage`] for
    /// unreadable files and [`RelayError::Json`] for malformed ones.
    pub async fn load(&self, name: &str) -> Result<DeadLetter, RelayError> {
        let name = checked_name(name)?;
        let bytes = match self.storage.read(name).await {
            Ok(bytes) => bytes,
            Err(StorageError::FileNotFound { .. }) => {
                return Err(RelayError::NotFound { message: name.to_owned().into(), context: None });
            },
            Err(e) => return Err(e).context(name.to_owned()),
        };
        serde_json::from_slice(&bytes).context(name.to_owned())
    }

    /// # Errors
    ///
    /// Returns [`RelayError::NotFound`] for unknown names and [`RelayError::Storage`] if the
    /// file cannot be deleted.
    pub async fn remove(&self, name: &str) -> Result<(), RelayError> {
        let name = checked_name(name)?;
        match self.storage.delete(name).await {
            Ok(()) => {
                debug!(file = %name, "Dead letter removed");
                Ok(())
            },
            Err(StorageError::FileNotFound { .. }) => {
                Err(RelayError::NotFound { message: name.to_owned().into(), context: None })
            },
            Err(e) => Err(e).context(name.to_owned()),
        }
    }
}

fn is_dead_letter(name: &str) -> bool {
    name.starts_with(PREFIX) && name.ends_with(EXTENSION)
}

/// Accepts bare dead-letter file names only.
fn checked_name(name: &str) -> Result<&str, RelayError> {
    let name = name.trim();
    if is_dead_letter(name) && !name.contains(['/', '\\']) {
        Ok(name)
    } else {
        Err(RelayError::NotFound { message: name.to_owned().into(), context: Some("not a dead-letter file".into()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> (tempfile::TempDir, DeadLetterStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DeadLetterStore::open(dir.path().join("failed-payloads")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn records_pretty_json_with_timestamped_name() {
        let (_dir, store) = store().await;
        let payload = json!({ "practiceName": "Glow" });

        let name = store.record(&payload, &["Payment not verified".to_owned()]).await.unwrap();
        assert!(name.starts_with("failed-20"));
        assert!(name.ends_with(".json"));
        assert!(!name.contains(':'));
        assert_eq!(name.matches('.').count(), 1);

        let raw = std::fs::read_to_string(store.root().join(&name)).unwrap();
        assert!(raw.contains("\n  \"payload\""));

        let letter = store.load(&name).await.unwrap();
        assert_eq!(letter.payload, payload);
        assert_eq!(letter.errors, vec!["Payment not verified".to_owned()]);
        assert!(letter.timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn lists_newest_first_and_removes() {
        let (_dir, store) = store().await;
        std::fs::write(store.root().join("failed-2025-01-01T00-00-00-000Z-a.json"), "{}").unwrap();
        std::fs::write(store.root().join("failed-2025-03-01T00-00-00-000Z-b.json"), "{}").unwrap();
        std::fs::write(store.root().join("notes.txt"), "").unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(
            names,
            vec!["failed-2025-03-01T00-00-00-000Z-b.json", "failed-2025-01-01T00-00-00-000Z-a.json"]
        );

        store.remove(&names[0]).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(matches!(store.remove(&names[0]).await, Err(RelayError::NotFound { .. })));
    }

    #[tokio::test]
    async fn rejects_foreign_names() {
        let (_dir, store) = store().await;
        assert!(matches!(store.load("../secrets.json").await, Err(RelayError::NotFound { .. })));
        assert!(matches!(store.load("failed-x/../y.json").await, Err(RelayError::NotFound { .. })));
        assert!(matches!(store.load("failed-missing.json").await, Err(RelayError::NotFound { .. })));
    }

    #[tokio::test]
    async fn attaching_requires_an_existing_directory() {
        let (dir, store) = store().await;
        store.record(&json!({}), &[]).await.unwrap();

        let attached = DeadLetterStore::open_existing(store.root()).await.unwrap();
        assert_eq!(attached.list().await.unwrap().len(), 1);

        let missing = DeadLetterStore::open_existing(dir.path().join("absent")).await;
        assert!(matches!(missing, Err(RelayError::Storage { .. })));
        assert!(!dir.path().join("absent").exists());
    }
}
