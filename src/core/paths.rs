use crate::error::{Error, Result};
use std::env;
use std::path::{Component, Path, PathBuf};

/// Name of the per-directory config file checked before the user config.
pub const LOCAL_CONFIG_FILE: &str = "release-export.json";

/// Base config directory (~/.config/release-export/ on Unix, %APPDATA%\release-export on Windows)
pub fn release_export() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("release-export"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("release-export"))
    }
}

/// User-level release.json path
pub fn release_json() -> Result<PathBuf> {
    Ok(release_export()?.join("release.json"))
}

/// The user's home directory, when the environment names one.
pub fn home_dir() -> Option<PathBuf> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Directory-local config path, relative to `base`
pub fn local_config(base: &Path) -> PathBuf {
    base.join(LOCAL_CONFIG_FILE)
}

/// Expand `~` and `$VAR` references in a configured path.
pub fn expand(raw: &str, key: &str) -> Result<String> {
    shellexpand::full(raw)
        .map(|s| s.into_owned())
        .map_err(|e| Error::config_invalid_value(key, Some(raw.to_string()), e.to_string()))
}

/// Resolve a possibly relative path against `base`.
pub fn resolve(base: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        base.join(candidate)
    }
}

/// True when `path` has no components that would walk above its parent.
pub fn is_contained(path: &Path) -> bool {
    !path.components().any(|c| matches!(c, Component::ParentDir))
}
