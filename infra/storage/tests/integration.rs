use brite_storage::{Storage, StorageError};
use tempfile::TempDir;

async fn open(temp: &TempDir) -> Storage {
    Storage::builder().root(temp.path()).connect().await.unwrap()
}

#[tokio::test]
async fn path_traversal_is_blocked() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    assert!(matches!(
        storage.resolve("../etc/passwd"),
        Err(StorageError::PathTraversalAttempt { .. })
    ));
    assert!(storage.resolve("foo/../../bar").is_err());
    assert!(storage.resolve("/etc/passwd").is_err());
    assert!(storage.resolve("foo/../bar.json").is_ok());
}

#[tokio::test]
async fn write_then_read_and_overwrite() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    storage.write("nested/doc.json", b"{\"v\":1}").await.unwrap();
    assert!(storage.exists("nested/doc.json").unwrap());
    assert_eq!(storage.read("nested/doc.json").await.unwrap(), b"{\"v\":1}");

    storage.write("nested/doc.json", b"{\"v\":2}").await.unwrap();
    assert_eq!(storage.read("nested/doc.json").await.unwrap(), b"{\"v\":2}");
}

#[tokio::test]
async fn list_is_sorted_and_hides_temporary_files() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    storage.write("failed-b.json", b"{}").await.unwrap();
    storage.write("failed-a.json", b"{}").await.unwrap();
    std::fs::write(temp.path().join("failed-c.json.britetmp.1.1"), b"{").unwrap();
    std::fs::create_dir(temp.path().join("subdir")).unwrap();

    let names = storage.list(".").await.unwrap();
    assert_eq!(names, vec!["failed-a.json".to_owned(), "failed-b.json".to_owned()]);
}

#[tokio::test]
async fn listing_a_missing_directory_is_empty() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    assert!(storage.list("not-yet").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_and_exists() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    storage.write("file.txt", b"x").await.unwrap();
    storage.delete("file.txt").await.unwrap();
    assert!(!storage.exists("file.txt").unwrap());

    let err = storage.delete("file.txt").await.expect_err("second delete must fail");
    assert!(matches!(err, StorageError::FileNotFound { .. }));
}

#[tokio::test]
async fn read_missing_returns_file_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    let err = storage.read("missing.bin").await.expect_err("expected error");
    assert!(matches!(err, StorageError::FileNotFound { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn connect_without_create_requires_existing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent");

    let err = Storage::builder().root(&missing).create(false).connect().await.unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));

    let storage = Storage::builder().root(&missing).connect().await.unwrap();
    assert!(storage.root().is_dir());
}
