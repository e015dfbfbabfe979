use crate::engine::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Temporary files younger than this may belong to a write still in flight.
pub(crate) const STALE_AFTER: Duration = Duration::from_secs(300);

/// Outcome of a temporary-file sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: usize,
    pub failed: usize,
}

pub(crate) async fn purge_tmp(root: &Path, max_age: Duration) -> PurgeReport {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || sweep(&root, now, max_age)).await {
        Ok(report) => {
            if report.removed > 0 || report.failed > 0 {
                info!(removed = report.removed, failed = report.failed, "Purged orphaned temporary files");
            }
            report
        },
        Err(e) => {
            error!(error = %e, "Temporary file sweep panicked");
            PurgeReport::default()
        },
    }
}

fn sweep(root: &Path, now: SystemTime, max_age: Duration) -> PurgeReport {
    let mut report = PurgeReport::default();

    // contents_first lets emptied directories be removed on the way back up
    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        let path = entry.path();
        if path == root {
            continue;
        }

        if entry.file_type().is_dir() {
            let _ = std::fs::remove_dir(path);
        } else if is_tmp(&entry) && older_than(&entry, now, max_age) {
            match std::fs::remove_file(path) {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Temporary file removal failed");
                    report.failed += 1;
                },
            }
        }
    }

    report
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn older_than(entry: &DirEntry, now: SystemTime, max_age: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age >= max_age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sweeps_only_temporary_files() {
        let dir = tempdir().unwrap();
        let keep = dir.path().join("failed-1.json");
        let orphan = dir.path().join(format!("failed-2.json{TMP_MARKER}7.1"));
        std::fs::write(&keep, b"{}").unwrap();
        std::fs::write(&orphan, b"{").unwrap();

        let report = sweep(dir.path(), SystemTime::now(), Duration::ZERO);

        assert_eq!(report, PurgeReport { removed: 1, failed: 0 });
        assert!(keep.exists());
        assert!(!orphan.exists());
    }

    #[test]
    fn keeps_fresh_temporary_files() {
        let dir = tempdir().unwrap();
        let fresh = dir.path().join(format!("a.json{TMP_MARKER}1.1"));
        std::fs::write(&fresh, b"{").unwrap();

        let report = sweep(dir.path(), SystemTime::now(), STALE_AFTER);

        assert_eq!(report.removed, 0);
        assert!(fresh.exists());
    }

    #[test]
    fn removes_empty_directories() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        sweep(dir.path(), SystemTime::now(), STALE_AFTER);

        assert!(!dir.path().join("a").exists());
    }
}
