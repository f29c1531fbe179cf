//! Input validation primitives.

use regex::Regex;
use std::path::{Component, Path};

use crate::paths;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None))
    } else {
        Ok(trimmed)
    }
}

// Conservative subset of git's ref-name rules; must not start with '-'
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._/+-]*$").unwrap());

/// A tag name git will accept as a checkout target and that cannot be
/// mistaken for an option.
pub fn validate_tag(tag: &str) -> Result<&str> {
    let tag = require_non_empty(tag, "version", "Version tag is empty")?;

    if !TAG_PATTERN.is_match(tag) || tag.contains("..") || tag.ends_with('/') || tag.ends_with(".lock") {
        return Err(Error::validation_invalid_argument(
            "version",
            "Version tag contains characters git does not allow in a tag name",
            Some(tag.to_string()),
        ));
    }

    Ok(tag)
}

/// The export directory is deleted recursively, so it must name a real
/// subdirectory: not empty, `.`, a root, or anything with `..`.
pub fn validate_export_dir(raw: &str) -> Result<&str> {
    let trimmed = require_non_empty(raw, "export_dir", "Export directory is empty")?;
    let path = Path::new(trimmed);

    let mut normal = 0usize;
    for component in path.components() {
        match component {
            Component::Normal(_) => normal += 1,
            Component::ParentDir => {
                return Err(Error::config_invalid_value(
                    "export_dir",
                    Some(raw.to_string()),
                    "Export directory must not contain '..'",
                ))
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if normal == 0 {
        return Err(Error::config_invalid_value(
            "export_dir",
            Some(raw.to_string()),
            "Export directory must name a subdirectory, not the current directory or a root",
        ));
    }

    Ok(trimmed)
}

/// Checks on the expanded, absolute export directory before anything runs.
///
/// The directory must not exist yet, and must not be `base`, `$HOME`, or an
/// ancestor of either.
pub fn validate_export_target(export_dir: &Path, base: &Path) -> Result<()> {
    let reject = |problem: &str| {
        Err(Error::config_invalid_value(
            "export_dir",
            Some(export_dir.display().to_string()),
            problem,
        ))
    };

    if base.starts_with(export_dir) {
        return reject("Export directory is the launch directory or one of its parents");
    }

    if let Some(home) = paths::home_dir() {
        if home.starts_with(export_dir) {
            return reject("Export directory is the home directory or one of its parents");
        }
    }

    if export_dir.exists() {
        return Err(Error::config_invalid_value(
            "export_dir",
            Some(export_dir.display().to_string()),
            "Export directory already exists; it would be deleted by teardown",
        )
        .with_hint("Remove it or set export_dir to a path that does not exist yet"));
    }

    Ok(())
}
