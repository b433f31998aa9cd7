//! Configuration file support for pkgmeta.
//!
//! pkgmeta supports two configuration file locations:
//! - Global: `~/.pkgmeta/config.toml` - User-wide defaults
//! - Project: `.pkgmeta/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Anything declared in
//! `Pkgmeta.toml` itself takes precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::package::Compatibility;

/// pkgmeta configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation defaults
    pub generate: GenerateConfig,
}

/// Defaults for `pkgmeta generate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Config directory relative to the tree root; `{name}` is replaced
    /// with the project name (e.g. `lib/cmake/{name}`)
    pub config_dest: Option<String>,

    /// Staging directory for install-tree artifacts, relative to the build
    /// directory unless absolute
    pub staging_dir: Option<PathBuf>,

    /// Default version compatibility policy
    pub compatibility: Option<Compatibility>,

    /// Emit legacy `<TARGET>` alias variables by default
    pub legacy_target_vars: Option<bool>,

    /// Also write the unexpanded template next to the build-tree config
    #[serde(default)]
    pub emit_template: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let generate = other.generate;
        if generate.config_dest.is_some() {
            self.generate.config_dest = generate.config_dest;
        }
        if generate.staging_dir.is_some() {
            self.generate.staging_dir = generate.staging_dir;
        }
        if generate.compatibility.is_some() {
            self.generate.compatibility = generate.compatibility;
        }
        if generate.legacy_target_vars.is_some() {
            self.generate.legacy_target_vars = generate.legacy_target_vars;
        }
        if generate.emit_template {
            self.generate.emit_template = true;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.pkgmeta/config.toml)
/// 2. Global config (~/.pkgmeta/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the project config path (.pkgmeta/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".pkgmeta").join("config.toml")
}
