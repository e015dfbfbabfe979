use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Clone)]
struct StorageConfig {
    create: bool,
    sweep: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { create: true, sweep: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    /// Whether a missing root is created on connect (default `true`).
    #[must_use = "the builder does nothing until .connect() is called"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    /// Whether stale temporary files are deleted on connect (default `true`).
    ///
    /// A second process attaching to a directory another process writes to (the operator
    /// CLI next to the server) must turn this off, or it may delete an in-flight write.
    #[must_use = "the builder does nothing until .connect() is called"]
    pub const fn sweep(mut self, enable: bool) -> Self {
        self.config.sweep = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> StorageBuilder<N> {
        StorageBuilder { state, config: self.config }
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the builder does nothing until .connect() is called"]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl StorageBuilder<WithRoot> {
    /// Opens the store: creates the root when allowed, canonicalizes it and, unless
    /// disabled with [`StorageBuilder::sweep`], removes temporary files left behind by an
    /// earlier crash.
    ///
    /// Sweep failures are logged and never abort the connect.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root is missing (with `create(false)`) or cannot
    /// be created or resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
            debug!(path = %root.display(), "Storage root ready");
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        if self.config.sweep {
            storage.purge_tmp().await;
        } else {
            debug!(path = %storage.root().display(), "Attached without sweeping temporary files");
        }

        Ok(storage)
    }
}
