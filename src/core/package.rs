//! The per-package configuration object passed through the pipeline.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dependency::DependencyRecord;
use crate::core::export::{ExportRecord, ManualTargets};
use crate::core::variable::{is_valid_name, PackageVariable, PlaceholderPathVar, RESERVED_NAMES};

/// Errors raised while declaring package metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackageError {
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),

    #[error("invalid variable name `{0}`")]
    InvalidVariableName(String),

    #[error("variable name `{0}` is reserved: `@PACKAGE_{0}@` is a built-in placeholder")]
    ReservedVariableName(String),

    #[error("export set `{0}` is declared more than once")]
    DuplicateExport(String),

    #[error("invalid version `{version}`: {reason}")]
    InvalidVersion { version: String, reason: String },
}

/// Version compatibility policy written to the version file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    /// Any version at least as new as requested
    AnyNewer,
    /// Same major version, at least as new
    #[default]
    SameMajor,
    /// Same major and minor version, at least as new
    SameMinor,
    /// Exactly the requested version
    Exact,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compatibility::AnyNewer => write!(f, "any-newer"),
            Compatibility::SameMajor => write!(f, "same-major"),
            Compatibility::SameMinor => write!(f, "same-minor"),
            Compatibility::Exact => write!(f, "exact"),
        }
    }
}

impl FromStr for Compatibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "any-newer" | "any-newer-version" => Ok(Compatibility::AnyNewer),
            "same-major" | "same-major-version" => Ok(Compatibility::SameMajor),
            "same-minor" | "same-minor-version" => Ok(Compatibility::SameMinor),
            "exact" | "exact-version" => Ok(Compatibility::Exact),
            _ => Err(format!(
                "invalid compatibility '{}'; expected 'any-newer', 'same-major', 'same-minor', or 'exact'",
                s
            )),
        }
    }
}

/// Insertion points for user-supplied text in the assembled template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    PreInit,
    PostInit,
    PostVars,
    PostDeps,
    PostTargets,
    PostTargetVars,
}

impl HookPoint {
    pub const ALL: [HookPoint; 6] = [
        HookPoint::PreInit,
        HookPoint::PostInit,
        HookPoint::PostVars,
        HookPoint::PostDeps,
        HookPoint::PostTargets,
        HookPoint::PostTargetVars,
    ];
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HookPoint::PreInit => "pre_init",
            HookPoint::PostInit => "post_init",
            HookPoint::PostVars => "post_vars",
            HookPoint::PostDeps => "post_deps",
            HookPoint::PostTargets => "post_targets",
            HookPoint::PostTargetVars => "post_target_vars",
        };
        write!(f, "{}", s)
    }
}

/// Where the text of a hook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookSource {
    Inline(String),
    /// Read at assembly time; relative paths are resolved against the
    /// package's base directory.
    File(PathBuf),
}

/// User hooks, one optional source per insertion point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hooks {
    pub pre_init: Option<HookSource>,
    pub post_init: Option<HookSource>,
    pub post_vars: Option<HookSource>,
    pub post_deps: Option<HookSource>,
    pub post_targets: Option<HookSource>,
    pub post_target_vars: Option<HookSource>,
}

impl Hooks {
    pub fn get(&self, point: HookPoint) -> Option<&HookSource> {
        match point {
            HookPoint::PreInit => self.pre_init.as_ref(),
            HookPoint::PostInit => self.post_init.as_ref(),
            HookPoint::PostVars => self.post_vars.as_ref(),
            HookPoint::PostDeps => self.post_deps.as_ref(),
            HookPoint::PostTargets => self.post_targets.as_ref(),
            HookPoint::PostTargetVars => self.post_target_vars.as_ref(),
        }
    }

    pub fn set(&mut self, point: HookPoint, source: HookSource) {
        let slot = match point {
            HookPoint::PreInit => &mut self.pre_init,
            HookPoint::PostInit => &mut self.post_init,
            HookPoint::PostVars => &mut self.post_vars,
            HookPoint::PostDeps => &mut self.post_deps,
            HookPoint::PostTargets => &mut self.post_targets,
            HookPoint::PostTargetVars => &mut self.post_target_vars,
        };
        *slot = Some(source);
    }
}

/// Everything declared for one package.
///
/// Built once while the package description is read and then only read by
/// the generation stages.
#[derive(Debug, Clone, Default)]
pub struct PackageConfig {
    /// Project name, used as the config file stem and variable prefix
    pub name: String,

    /// Project version (semver, missing components allowed)
    pub version: String,

    /// Build qualifier (e.g. `e20:prof`)
    pub qualifier: Option<String>,

    /// Build type (e.g. `Release`)
    pub build_type: Option<String>,

    /// Architecture-independent package
    pub noarch: bool,

    pub compatibility: Compatibility,

    /// Emit `<TARGET>` alias variables for exported targets
    pub legacy_target_vars: bool,

    /// Directory of the config files, relative to the tree root
    pub config_dest: PathBuf,

    /// Directory used to resolve relative hook files
    pub base_dir: PathBuf,

    pub variables: Vec<PackageVariable>,
    pub dependencies: Vec<DependencyRecord>,
    pub exports: Vec<ExportRecord>,
    pub manual_targets: ManualTargets,
    pub hooks: Hooks,
}

impl PackageConfig {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        PackageConfig {
            config_dest: default_config_dest(&name, false),
            name,
            version: version.into(),
            ..Default::default()
        }
    }

    /// Declare a variable. Names must be unique within the package.
    pub fn declare_variable(&mut self, var: PackageVariable) -> Result<(), PackageError> {
        if !is_valid_name(&var.name) {
            return Err(PackageError::InvalidVariableName(var.name));
        }
        if RESERVED_NAMES.contains(&var.name.as_str()) {
            return Err(PackageError::ReservedVariableName(var.name));
        }
        if self.variable(&var.name).is_some() {
            return Err(PackageError::DuplicateVariable(var.name));
        }
        self.variables.push(var);
        Ok(())
    }

    pub fn add_dependency(&mut self, record: DependencyRecord) {
        self.dependencies.push(record);
    }

    /// Register an export set. Names must be unique within the package.
    pub fn add_export(&mut self, export: ExportRecord) -> Result<(), PackageError> {
        if self.exports.iter().any(|e| e.name == export.name) {
            return Err(PackageError::DuplicateExport(export.name));
        }
        self.exports.push(export);
        Ok(())
    }

    pub fn set_manual_targets(&mut self, manual: ManualTargets) {
        self.manual_targets = manual;
    }

    pub fn set_hook(&mut self, point: HookPoint, source: HookSource) {
        self.hooks.set(point, source);
    }

    pub fn variable(&self, name: &str) -> Option<&PackageVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Every path variable, in declaration order. Hidden and omitted ones
    /// are included since hooks may still reference their placeholders.
    pub fn path_vars(&self) -> Vec<PlaceholderPathVar> {
        self.variables
            .iter()
            .filter(|v| v.flags.is_path)
            .map(PlaceholderPathVar::from)
            .collect()
    }

    /// Every component named by a dependency or an export, first declaration first.
    pub fn components(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let from_deps = self.dependencies.iter().filter_map(|d| d.scope.component());
        let from_exports = self
            .exports
            .iter()
            .flat_map(|e| e.components.iter().map(|c| c.name.as_str()));
        for name in from_deps.chain(from_exports) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Parse the version, padding missing minor/patch components with zero.
    pub fn semver(&self) -> Result<Version, PackageError> {
        parse_version(&self.version)
    }

    /// Depth of the config directory below the tree root.
    pub fn config_depth(&self) -> usize {
        self.config_dest
            .components()
            .filter(|c| matches!(c, std::path::Component::Normal(_)))
            .count()
    }

    /// File name of the config file.
    pub fn config_file_name(&self) -> String {
        format!("{}Config.cmake", self.name)
    }

    /// File name of the version file.
    pub fn version_file_name(&self) -> String {
        format!("{}ConfigVersion.cmake", self.name)
    }
}

/// Default config directory: `lib/cmake/<name>`, or `share/cmake/<name>`
/// for architecture-independent packages.
pub fn default_config_dest(name: &str, noarch: bool) -> PathBuf {
    let base = if noarch { "share" } else { "lib" };
    PathBuf::from(base).join("cmake").join(name)
}

/// Parse a version string, accepting `1` and `1.2` as `1.0.0` and `1.2.0`.
pub fn parse_version(version: &str) -> Result<Version, PackageError> {
    let trimmed = version.trim();
    let padded = match trimmed.split('.').count() {
        1 => format!("{}.0.0", trimmed),
        2 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    padded.parse().map_err(|e: semver::Error| PackageError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}
