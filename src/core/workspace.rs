//! Working-tree filesystem operations: pruning and teardown.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;

/// Remove `<export_dir>/<entry>`.
pub fn prune(export_dir: &Path, entry: &str) -> Result<PathBuf> {
    let relative = Path::new(entry);
    if entry.trim().is_empty() || relative.has_root() || !paths::is_contained(relative) {
        return Err(Error::config_invalid_value(
            "prune",
            Some(entry.to_string()),
            "Prune entries must be relative paths inside the export directory",
        ));
    }

    let target = export_dir.join(entry);
    if !target.exists() {
        return Err(Error::internal_io(
            format!("Not found: {}", target.display()),
            Some("prune".to_string()),
        ));
    }

    remove(&target, "prune")?;
    Ok(target)
}

/// Recursively delete the export directory.
pub fn teardown(export_dir: &Path) -> Result<()> {
    if !export_dir.exists() {
        return Err(Error::internal_io(
            format!("Not found: {}", export_dir.display()),
            Some("teardown".to_string()),
        ));
    }
    remove(export_dir, "teardown")
}

fn remove(target: &Path, context: &str) -> Result<()> {
    let result = if target.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };

    result.map_err(|e| {
        Error::internal_io(
            format!("{}: {}", target.display(), e),
            Some(context.to_string()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prune_removes_nested_directory() {
        let dir = tempdir().unwrap();
        let snapshot = dir.path().join("snapshot");
        fs::create_dir_all(snapshot.join("inner")).unwrap();
        fs::write(snapshot.join("inner").join("build.py"), "x").unwrap();

        let removed = prune(dir.path(), "snapshot").unwrap();
        assert_eq!(removed, snapshot);
        assert!(!snapshot.exists());
    }

    #[test]
    fn prune_missing_entry_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(prune(dir.path(), "snapshot").is_err());
    }

    #[test]
    fn prune_rejects_escaping_entries() {
        let dir = tempdir().unwrap();
        let err = prune(dir.path(), "../outside").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigInvalidValue);
        assert!(prune(dir.path(), "/").is_err());
    }

    #[test]
    fn teardown_removes_whole_tree() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export");
        fs::create_dir_all(export.join("Java").join("dist")).unwrap();
        fs::write(export.join("Java").join("dist").join("ddb.jar"), "jar").unwrap();

        teardown(&export).unwrap();
        assert!(!export.exists());
    }

    #[test]
    fn teardown_of_missing_dir_reports_error() {
        let dir = tempdir().unwrap();
        assert!(teardown(&dir.path().join("export")).is_err());
    }
}
