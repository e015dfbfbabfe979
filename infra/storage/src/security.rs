use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` lexically; a `..` that would climb above the root is rejected.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Path attempted to escape sandbox via '..'".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed in sandbox".into()),
                });
            },
        }
    }

    Ok(out)
}

/// Joins `path` to `root`, rejecting anything that lands outside it.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();

    if path.is_absolute() {
        return Err(StorageError::PathTraversalAttempt {
            message: format!("Absolute paths are not allowed in sandbox {}", path.display()).into(),
            context: None,
        });
    }

    let safe_rel = normalize_relative(path)?;
    let joined = root.join(safe_rel);

    match joined.canonicalize() {
        Ok(canonical) => validate_canonical(root, canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_path(root, &joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

fn validate_canonical(root: &Path, canonical: PathBuf) -> Result<PathBuf, StorageError> {
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Path attempted to escape sandbox via .. sequences".into()),
        })
    }
}

/// Checks a path that does not exist yet through its nearest existing ancestor, which
/// catches a symlinked directory pointing outside the root.
fn validate_path(root: &Path, joined: &Path) -> Result<PathBuf, StorageError> {
    if !joined.starts_with(root) {
        return Err(StorageError::PathTraversalAttempt {
            message: joined.display().to_string().into(),
            context: Some("Path is outside sandbox boundaries".into()),
        });
    }

    let mut current = Some(joined);

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory is a symlink outside sandbox".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No valid parent directory found within sandbox".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_inner_parent_segments() {
        let out = normalize_relative(Path::new("a/./b/../c.json")).unwrap();
        assert_eq!(out, PathBuf::from("a/c.json"));
    }

    #[test]
    fn rejects_climbing_above_root() {
        let err = normalize_relative(Path::new("a/../../c.json")).unwrap_err();
        assert!(matches!(err, StorageError::PathTraversalAttempt { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_escaping_root() {
        let outside = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let root_path = root.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(outside.path(), root_path.join("link")).unwrap();

        let err = resolve_path(&root_path, "link/new.json").unwrap_err();
        assert!(matches!(err, StorageError::PathTraversalAttempt { .. }));
    }
}
