//! A small sandboxed file store.
//!
//! Every path handed to [`Storage`] is relative to a canonical root and is rejected when it
//! would escape it. Writes go through a unique temporary file that is synced and renamed
//! into place, so readers never observe a partially written document. Temporary files
//! orphaned by a crash are removed when the store is opened.
//!
//! ```rust
//! use brite_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("failed-payloads");
//!     let storage = Storage::builder().root(&root).create(true).connect().await?;
//!
//!     storage.write("failed-1.json", br#"{"errors":[]}"#).await?;
//!     assert_eq!(storage.list(".").await?, vec!["failed-1.json".to_owned()]);
//!
//!     let data = storage.read("failed-1.json").await?;
//!     assert_eq!(data, br#"{"errors":[]}"#);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
pub use maintenance::PurgeReport;
