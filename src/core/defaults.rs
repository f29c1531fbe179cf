use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::utils::template;

/// Root configuration structure for release.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    #[serde(default = "default_project")]
    pub project: String,

    /// Release tag checked out after the clone.
    #[serde(default = "default_version")]
    pub version: String,

    /// Repository location; `{{project}}` is substituted.
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_export_dir")]
    pub export_dir: String,

    /// Subdirectories of the exported tree removed before building.
    #[serde(default = "default_prune")]
    pub prune: Vec<String>,

    #[serde(default)]
    pub interface: InterfaceConfig,

    #[serde(default)]
    pub binaries: BinariesConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
            version: default_version(),
            url: default_url(),
            export_dir: default_export_dir(),
            prune: default_prune(),
            interface: InterfaceConfig::default(),
            binaries: BinariesConfig::default(),
        }
    }
}

impl ReleaseConfig {
    pub fn repository_url(&self) -> String {
        template::render(&self.url, &[(template::TemplateVars::PROJECT, self.project.as_str())])
    }
}

/// Java interface build (Apache Ant)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// Directory inside the exported tree holding build.xml.
    #[serde(default = "default_interface_dir")]
    pub dir: String,

    #[serde(default = "default_interface_tool")]
    pub tool: String,

    /// Exported as ANT_HOME; derived from `tool` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_home: Option<String>,

    #[serde(default = "default_install_target")]
    pub install_target: String,

    #[serde(default = "default_clean_target")]
    pub clean_target: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            dir: default_interface_dir(),
            tool: default_interface_tool(),
            tool_home: None,
            install_target: default_install_target(),
            clean_target: default_clean_target(),
        }
    }
}

/// MATLAB batch compile of the platform executables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinariesConfig {
    #[serde(default = "default_matlab")]
    pub matlab: String,

    #[serde(default = "default_matlab_options")]
    pub options: Vec<String>,

    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Added to the MATLAB path before the entry point is called.
    #[serde(default = "default_script_dir")]
    pub script_dir: String,

    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

impl Default for BinariesConfig {
    fn default() -> Self {
        Self {
            matlab: default_matlab(),
            options: default_matlab_options(),
            log_file: default_log_file(),
            script_dir: default_script_dir(),
            entry_point: default_entry_point(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_project() -> String {
    "imos-toolbox".to_string()
}

fn default_version() -> String {
    "AIMS-2.5.41".to_string()
}

fn default_url() -> String {
    "https://github.com/aodn/{{project}}.git".to_string()
}

fn default_export_dir() -> String {
    "export".to_string()
}

fn default_prune() -> Vec<String> {
    vec!["snapshot".to_string()]
}

fn default_interface_dir() -> String {
    "Java".to_string()
}

fn default_interface_tool() -> String {
    "ant".to_string()
}

fn default_install_target() -> String {
    "install".to_string()
}

fn default_clean_target() -> String {
    "clean".to_string()
}

fn default_matlab() -> String {
    "matlab".to_string()
}

fn default_matlab_options() -> Vec<String> {
    vec!["-nodisplay".to_string(), "-wait".to_string()]
}

fn default_log_file() -> String {
    "log.txt".to_string()
}

fn default_script_dir() -> String {
    "Util".to_string()
}

fn default_entry_point() -> String {
    "imosCompile".to_string()
}

// =============================================================================
// Loading
// =============================================================================

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigSource {
    Explicit { path: String },
    Local { path: String },
    User { path: String },
    Builtin,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadedConfig {
    pub source: ConfigSource,
    pub config: ReleaseConfig,
}

/// Resolve the effective configuration.
///
/// Lookup order: explicit path, `release-export.json` in `base`, the user
/// release.json, built-in defaults. Only a missing user file falls through
/// silently; any file that exists must parse.
pub fn load(explicit: Option<&Path>, base: &Path) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            config: load_from_file(path)?,
            source: ConfigSource::Explicit {
                path: path.display().to_string(),
            },
        });
    }

    let local = paths::local_config(base);
    if local.exists() {
        return Ok(LoadedConfig {
            config: load_from_file(&local)?,
            source: ConfigSource::Local {
                path: local.display().to_string(),
            },
        });
    }

    if let Ok(user) = paths::release_json() {
        if user.exists() {
            return Ok(LoadedConfig {
                config: load_from_file(&user)?,
                source: ConfigSource::User {
                    path: user.display().to_string(),
                },
            });
        }
    }

    Ok(LoadedConfig {
        config: ReleaseConfig::default(),
        source: ConfigSource::Builtin,
    })
}

/// Parse a release.json file; absent fields take their defaults.
pub fn load_from_file(path: &Path) -> Result<ReleaseConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))
}

/// Path `config init` writes to: the explicit path, or the user release.json.
pub fn target_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => paths::release_json(),
    }
}

/// Save config to `path` (creates parent directories).
pub fn save(config: &ReleaseConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let content = serde_json::to_string_pretty(config).map_err(|e| {
        Error::internal_json(e.to_string(), Some("serialize release.json".to_string()))
    })?;

    fs::write(path, content).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("write {}", path.display())))
    })
}
