//! Writing generated artifacts.
//!
//! The build-tree config goes straight into the build tree so the package
//! can be consumed without installing. The install-tree config goes to a
//! staging directory together with `install_manifest.json`, which tells the
//! packaging step where each staged file belongs under the install prefix.
//!
//! ```text
//! <build_dir>/<config_dest>/<Name>Config.cmake          (build tree)
//! <build_dir>/<config_dest>/<Name>ConfigVersion.cmake
//! <build_dir>/<config_dest>/<Export>.cmake ...
//! <staging_dir>/<config_dest>/<Name>Config.cmake        (install tree)
//! <staging_dir>/<config_dest>/...
//! <staging_dir>/install_manifest.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::package::PackageConfig;
use crate::generate::GeneratedOutputs;
use crate::util::fs::{to_slash, write_if_changed};

/// File name of the install manifest inside the staging directory.
pub const INSTALL_MANIFEST: &str = "install_manifest.json";

/// Default staging directory, relative to the build directory.
pub const DEFAULT_STAGING_DIR: &str = "pkgmeta-staging";

/// Default install prefix.
pub const DEFAULT_INSTALL_PREFIX: &str = "/usr/local";

/// Where artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub build_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub install_prefix: PathBuf,

    /// Config directory relative to each tree root
    pub config_dest: PathBuf,
}

impl Layout {
    /// Build a layout. A relative `staging_dir` is taken relative to
    /// `build_dir`.
    pub fn new(
        build_dir: &Path,
        staging_dir: Option<&Path>,
        install_prefix: Option<&Path>,
        config_dest: &Path,
    ) -> Self {
        let staging_dir = match staging_dir {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => build_dir.join(dir),
            None => build_dir.join(DEFAULT_STAGING_DIR),
        };
        Layout {
            build_dir: build_dir.to_path_buf(),
            staging_dir,
            install_prefix: install_prefix
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_PREFIX)),
            config_dest: config_dest.to_path_buf(),
        }
    }

    pub fn build_config_dir(&self) -> PathBuf {
        self.build_dir.join(&self.config_dest)
    }

    pub fn staging_config_dir(&self) -> PathBuf {
        self.staging_dir.join(&self.config_dest)
    }

    pub fn install_manifest_path(&self) -> PathBuf {
        self.staging_dir.join(INSTALL_MANIFEST)
    }
}

/// One staged file and where it is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallEntry {
    /// Path relative to the staging directory
    pub source: String,

    /// Path relative to the install prefix
    pub destination: String,
}

/// Contents of `install_manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    pub package: String,
    pub version: String,
    pub install_prefix: String,
    pub files: Vec<InstallEntry>,
}

impl InstallManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read install manifest: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse install manifest: {}", path.display()))
    }
}

/// What happened to each output file.
#[derive(Debug, Clone, Default)]
pub struct EmitResult {
    /// Files written in this run
    pub written: Vec<PathBuf>,

    /// Files that already had the right contents
    pub unchanged: Vec<PathBuf>,
}

impl EmitResult {
    fn record(&mut self, path: PathBuf, written: bool) {
        if written {
            tracing::info!("wrote {}", path.display());
            self.written.push(path);
        } else {
            tracing::debug!("{} is up to date", path.display());
            self.unchanged.push(path);
        }
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

/// Write every artifact of `outputs` according to `layout`.
pub fn emit(
    pkg: &PackageConfig,
    outputs: &GeneratedOutputs,
    layout: &Layout,
    emit_template: bool,
) -> Result<EmitResult> {
    let mut result = EmitResult::default();

    let mut shared: Vec<(String, &str)> = vec![(pkg.version_file_name(), outputs.version_file.as_str())];
    shared.extend(
        outputs
            .exports
            .iter()
            .map(|f| (f.file_name.clone(), f.contents.as_str())),
    );

    // Build tree
    let build_dir = layout.build_config_dir();
    let mut build_files = vec![(pkg.config_file_name(), outputs.build_config.as_str())];
    if emit_template {
        build_files.push((format!("{}.in", pkg.config_file_name()), outputs.template.as_str()));
    }
    build_files.extend(shared.iter().cloned());
    for (name, contents) in &build_files {
        let path = build_dir.join(name);
        let written = write_if_changed(&path, contents)?;
        result.record(path, written);
    }

    // Install tree, staged
    let staging_dir = layout.staging_config_dir();
    let mut staged = vec![(pkg.config_file_name(), outputs.install_config.as_str())];
    staged.extend(shared);

    let mut entries = Vec::with_capacity(staged.len());
    for (name, contents) in &staged {
        let path = staging_dir.join(name);
        let written = write_if_changed(&path, contents)?;
        result.record(path, written);

        let relative = to_slash(&layout.config_dest.join(name));
        entries.push(InstallEntry {
            source: relative.clone(),
            destination: relative,
        });
    }

    let manifest = InstallManifest {
        package: pkg.name.clone(),
        version: pkg.version.clone(),
        install_prefix: to_slash(&layout.install_prefix),
        files: entries,
    };
    let json = serde_json::to_string_pretty(&manifest).context("failed to serialize install manifest")?;
    let path = layout.install_manifest_path();
    let written = write_if_changed(&path, &format!("{}\n", json))?;
    result.record(path, written);

    Ok(result)
}
