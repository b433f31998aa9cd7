//! Global context for pkgmeta operations.
//!
//! Provides centralized access to configuration paths and the working
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::core::manifest::{find_manifest as find_manifest_from, ManifestError};
use crate::util::config::{self, Config};

/// Environment variable overriding the pkgmeta home directory.
pub const HOME_ENV: &str = "PKGMETA_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for user-wide pkgmeta data (~/.pkgmeta/)
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ => BaseDirs::new().map(|b| b.home_dir().join(".pkgmeta")),
        };

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the pkgmeta home directory (~/.pkgmeta/), if one can be determined.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join("config.toml"))
    }

    /// Find `Pkgmeta.toml` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        find_manifest_from(&self.cwd)
    }

    /// Resolve an explicit manifest path, or search for one.
    pub fn manifest_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
            Some(path) => Ok(self.cwd.join(path)),
            None => Ok(self.find_manifest()?),
        }
    }

    /// Load the merged global and project configuration for the project
    /// rooted at `project_dir`.
    pub fn load_config(&self, project_dir: &Path) -> Config {
        let global = self.config_path();
        config::load_config(global.as_deref(), &config::project_config_path(project_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        if let Some(path) = ctx.config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_find_manifest_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("Pkgmeta.toml");
        std::fs::write(&manifest, "[package]\nname = \"Foo\"\nversion = \"1.0.0\"\n").unwrap();
        let nested = tmp.path().join("src").join("lib");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested).unwrap();
        assert_eq!(ctx.find_manifest().ok(), Some(manifest.clone()));
        assert_eq!(ctx.manifest_path(None).unwrap(), manifest);
    }

    #[test]
    fn test_manifest_path_relative_to_cwd() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert_eq!(
            ctx.manifest_path(Some(Path::new("pkg/Pkgmeta.toml"))).unwrap(),
            tmp.path().join("pkg/Pkgmeta.toml")
        );
    }

    #[test]
    fn test_project_config_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".pkgmeta");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[generate]\nemit_template = true\n").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert!(ctx.load_config(tmp.path()).generate.emit_template);
    }
}
