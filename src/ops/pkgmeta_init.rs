//! Implementation of `pkgmeta init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::{generate_starter_manifest, MANIFEST_NAME};
use crate::core::variable::is_valid_name;

/// Options for creating a starter manifest.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project name
    pub name: String,
}

/// Write a starter `Pkgmeta.toml` into `path`.
pub fn init_manifest(path: &Path, opts: &InitOptions) -> Result<PathBuf> {
    if !is_valid_name(&opts.name) {
        bail!(
            "`{}` cannot be used as a project name\n\
             \n\
             Project names prefix generated variables and must be letters, digits and underscores.",
            opts.name
        );
    }

    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, path.display());
    }

    fs::write(&manifest_path, generate_starter_manifest(&opts.name))
        .with_context(|| format!("failed to write {}", manifest_path.display()))?;

    Ok(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::Manifest;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_manifest() {
        let tmp = TempDir::new().unwrap();
        let path = init_manifest(tmp.path(), &InitOptions { name: "Widget".to_string() }).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.package.name, "Widget");
        assert_eq!(manifest.package.exports[0].name, "WidgetTargets");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_NAME), "# mine\n").unwrap();

        let err = init_manifest(tmp.path(), &InitOptions { name: "Widget".to_string() }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(tmp.path().join(MANIFEST_NAME)).unwrap(), "# mine\n");
    }

    #[test]
    fn test_init_rejects_bad_name() {
        let tmp = TempDir::new().unwrap();
        let err = init_manifest(tmp.path(), &InitOptions { name: "my-lib".to_string() }).unwrap_err();
        assert!(err.to_string().contains("cannot be used as a project name"));
        assert!(!tmp.path().join(MANIFEST_NAME).exists());
    }

    #[test]
    fn test_init_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("new").join("project");
        init_manifest(&dir, &InitOptions { name: "Foo".to_string() }).unwrap();
        assert!(dir.join(MANIFEST_NAME).is_file());
    }
}
