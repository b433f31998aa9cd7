//! Pkgmeta.toml manifest parsing and schema.
//!
//! The manifest is the registration surface of a package: it declares the
//! variables, dependency directives, export sets, manually-defined targets
//! and hooks that end up in the generated config file. Arrays of tables keep
//! declaration order, which the generated output preserves.

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::core::dependency::DependencyRecord;
use crate::core::export::{ExportComponent, ExportRecord, ExportedTarget, ManualTargets};
use crate::core::package::{default_config_dest, Compatibility, HookPoint, HookSource, PackageConfig};
use crate::core::variable::{PackageVariable, VarFlags};
use crate::util::config::GenerateConfig;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Pkgmeta.toml";

/// Errors locating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no manifest found: could not find `Pkgmeta.toml` in `{}` or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },
}

/// Search `start` and its parents for a manifest.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}

/// Settings the manifest may leave to the user/project configuration.
#[derive(Debug, Clone, Default)]
pub struct DeclaredSettings {
    pub compatibility: Option<Compatibility>,
    pub legacy_target_vars: Option<bool>,
    pub config_dest: Option<PathBuf>,
}

/// The parsed Pkgmeta.toml manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    /// Package as declared, with built-in defaults for undeclared settings
    pub package: PackageConfig,

    /// Which settings the manifest declared explicitly
    pub declared: DeclaredSettings,

    /// The directory containing this manifest
    pub manifest_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    package: RawPackage,

    #[serde(default, rename = "variable")]
    variables: Vec<RawVariable>,

    #[serde(default, rename = "dependency")]
    dependencies: Vec<RawDependency>,

    #[serde(default, rename = "export")]
    exports: Vec<RawExport>,

    #[serde(default)]
    manual_targets: Option<ManualTargets>,

    #[serde(default)]
    hooks: RawHooks,
}

/// Name and version default to empty so that preflight can report every
/// missing declaration at once instead of failing on the first.
#[derive(Debug, Default, Deserialize)]
struct RawPackage {
    #[serde(default)]
    name: String,

    #[serde(default)]
    version: String,

    #[serde(default)]
    qualifier: Option<String>,

    #[serde(default)]
    build_type: Option<String>,

    #[serde(default)]
    noarch: bool,

    #[serde(default)]
    compatibility: Option<Compatibility>,

    #[serde(default)]
    legacy_target_vars: Option<bool>,

    #[serde(default)]
    config_dest: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawVariable {
    name: String,

    #[serde(default)]
    value: String,

    #[serde(default)]
    build_value: Option<String>,

    #[serde(default)]
    path: bool,

    #[serde(default)]
    omit_if_null: bool,

    #[serde(default)]
    omit_if_empty: bool,

    #[serde(default)]
    omit_if_missing: bool,

    /// Visible in the config file
    #[serde(default = "default_true")]
    config: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    directive: String,

    #[serde(default)]
    component: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawExport {
    name: String,

    #[serde(default)]
    file: Option<String>,

    #[serde(default)]
    namespace: Option<String>,

    #[serde(default)]
    targets: Vec<ExportedTarget>,

    #[serde(default)]
    components: Vec<ExportComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHook {
    Inline(String),
    File { file: PathBuf },
}

#[derive(Debug, Default, Deserialize)]
struct RawHooks {
    #[serde(default)]
    pre_init: Option<RawHook>,
    #[serde(default)]
    post_init: Option<RawHook>,
    #[serde(default)]
    post_vars: Option<RawHook>,
    #[serde(default)]
    post_deps: Option<RawHook>,
    #[serde(default)]
    post_targets: Option<RawHook>,
    #[serde(default)]
    post_target_vars: Option<RawHook>,
}

impl RawHooks {
    fn into_sources(self) -> Vec<(HookPoint, RawHook)> {
        [
            (HookPoint::PreInit, self.pre_init),
            (HookPoint::PostInit, self.post_init),
            (HookPoint::PostVars, self.post_vars),
            (HookPoint::PostDeps, self.post_deps),
            (HookPoint::PostTargets, self.post_targets),
            (HookPoint::PostTargetVars, self.post_target_vars),
        ]
        .into_iter()
        .filter_map(|(point, hook)| hook.map(|h| (point, h)))
        .collect()
    }
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse manifest content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawManifest = toml::from_str(content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let manifest_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        let declared = DeclaredSettings {
            compatibility: raw.package.compatibility,
            legacy_target_vars: raw.package.legacy_target_vars,
            config_dest: raw.package.config_dest.clone(),
        };

        let mut package = PackageConfig::new(raw.package.name, raw.package.version);
        package.qualifier = raw.package.qualifier;
        package.build_type = raw.package.build_type;
        package.noarch = raw.package.noarch;
        package.compatibility = declared.compatibility.unwrap_or_default();
        package.legacy_target_vars = declared.legacy_target_vars.unwrap_or(false);
        package.config_dest = declared
            .config_dest
            .clone()
            .unwrap_or_else(|| default_config_dest(&package.name, package.noarch));
        package.base_dir = manifest_dir.clone();
        check_config_dest(&package.config_dest)
            .with_context(|| format!("invalid manifest: {}", path.display()))?;

        for raw_var in raw.variables {
            let var = PackageVariable {
                name: raw_var.name,
                value: raw_var.value,
                build_value: raw_var.build_value,
                flags: VarFlags {
                    is_path: raw_var.path,
                    omit_if_null: raw_var.omit_if_null,
                    omit_if_empty: raw_var.omit_if_empty,
                    omit_if_missing: raw_var.omit_if_missing,
                    visible_in_config: raw_var.config,
                },
            };
            if var.build_value.is_some() && !var.flags.is_path {
                tracing::warn!(
                    "variable `{}`: build_value is only used for path variables",
                    var.name
                );
            }
            package
                .declare_variable(var)
                .with_context(|| format!("invalid manifest: {}", path.display()))?;
        }

        for dep in raw.dependencies {
            let record = match dep.component {
                Some(component) => DependencyRecord::component(component, dep.directive),
                None => DependencyRecord::top_level(dep.directive),
            };
            package.add_dependency(record);
        }

        for raw_export in raw.exports {
            let export = ExportRecord {
                name: raw_export.name,
                file: raw_export.file,
                namespace: raw_export.namespace,
                targets: raw_export.targets,
                components: raw_export.components,
            };
            package
                .add_export(export)
                .with_context(|| format!("invalid manifest: {}", path.display()))?;
        }

        if let Some(manual) = raw.manual_targets {
            if manual.commands.is_empty() && !manual.targets.is_empty() {
                tracing::warn!(
                    "manual_targets lists {} target(s) but no commands to define them",
                    manual.targets.len()
                );
            }
            package.set_manual_targets(manual);
        }

        for (point, hook) in raw.hooks.into_sources() {
            let source = match hook {
                RawHook::Inline(text) => HookSource::Inline(text),
                RawHook::File { file } => HookSource::File(file),
            };
            package.set_hook(point, source);
        }

        Ok(Manifest {
            package,
            declared,
            manifest_dir,
        })
    }

    /// Resolve the package, filling settings the manifest left undeclared
    /// from the user/project configuration.
    pub fn package_with(&self, config: &GenerateConfig) -> Result<PackageConfig> {
        let mut package = self.package.clone();

        if self.declared.compatibility.is_none() {
            if let Some(compat) = config.compatibility {
                package.compatibility = compat;
            }
        }

        if self.declared.legacy_target_vars.is_none() {
            if let Some(legacy) = config.legacy_target_vars {
                package.legacy_target_vars = legacy;
            }
        }

        if self.declared.config_dest.is_none() {
            if let Some(ref template) = config.config_dest {
                package.config_dest = PathBuf::from(template.replace("{name}", &package.name));
                check_config_dest(&package.config_dest).context("invalid `config_dest` in config")?;
            }
        }

        Ok(package)
    }
}

/// The config destination is joined onto both the build directory and the
/// install prefix, so it must stay beneath them.
fn check_config_dest(dest: &Path) -> Result<()> {
    let contained = dest
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !contained {
        bail!(
            "config_dest `{}` must be a relative path without `..`",
            dest.display()
        );
    }
    Ok(())
}

/// Generate a starter manifest for `pkgmeta init`.
pub fn generate_starter_manifest(name: &str) -> String {
    format!(
        r#"[package]
name = "{name}"
version = "0.1.0"
qualifier = "default"
build_type = "Release"

[[variable]]
name = "INCLUDE_DIR"
value = "include"
path = true
omit_if_missing = true

[[variable]]
name = "LIBRARY_DIR"
value = "lib"
path = true
omit_if_empty = true

[[export]]
name = "{name}Targets"
namespace = "{name}::"
targets = [{{ name = "{name}", kind = "shared", location = "lib/lib{name}.so" }}]
"#
    )
}
