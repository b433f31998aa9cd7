//! Export sets and manually-defined targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of an exported (imported, from the consumer's side) target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// Static library
    Static,
    /// Shared library
    Shared,
    /// Header-only / usage-requirements-only library
    #[default]
    Interface,
    /// Executable
    Executable,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Static => write!(f, "static"),
            TargetKind::Shared => write!(f, "shared"),
            TargetKind::Interface => write!(f, "interface"),
            TargetKind::Executable => write!(f, "executable"),
        }
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" | "staticlib" => Ok(TargetKind::Static),
            "shared" | "sharedlib" => Ok(TargetKind::Shared),
            "interface" | "header-only" => Ok(TargetKind::Interface),
            "executable" | "exe" => Ok(TargetKind::Executable),
            _ => Err(format!(
                "invalid target kind '{}'; expected 'static', 'shared', 'interface', or 'executable'",
                s
            )),
        }
    }
}

/// A target published by an export set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTarget {
    /// Target name, without namespace
    pub name: String,

    #[serde(default)]
    pub kind: TargetKind,

    /// Built file, relative to the tree root (e.g. `lib/libfoo.so`)
    #[serde(default)]
    pub location: Option<String>,
}

impl ExportedTarget {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        ExportedTarget {
            name: name.into(),
            kind,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Targets of an export set that belong to an optional component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportComponent {
    pub name: String,

    #[serde(default)]
    pub targets: Vec<ExportedTarget>,
}

/// A named group of targets published together under one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Export-set name (e.g. `FooTargets`)
    pub name: String,

    /// Include file name; defaults to `<name>.cmake`
    pub file: Option<String>,

    /// Namespace prefix including the separator (e.g. `Foo::`)
    pub namespace: Option<String>,

    /// Targets always published
    pub targets: Vec<ExportedTarget>,

    /// Per-component targets, in declaration order
    pub components: Vec<ExportComponent>,
}

impl ExportRecord {
    pub fn new(name: impl Into<String>) -> Self {
        ExportRecord {
            name: name.into(),
            file: None,
            namespace: None,
            targets: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_target(mut self, target: ExportedTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, targets: Vec<ExportedTarget>) -> Self {
        self.components.push(ExportComponent {
            name: name.into(),
            targets,
        });
        self
    }

    /// Name of the primary include file.
    pub fn file_name(&self) -> String {
        self.file
            .clone()
            .unwrap_or_else(|| format!("{}.cmake", self.name))
    }

    /// Name of the include file for one component: `<stem>-<component>.<ext>`.
    pub fn component_file_name(&self, component: &str) -> String {
        let file = self.file_name();
        match file.rsplit_once('.') {
            Some((stem, ext)) => format!("{}-{}.{}", stem, component, ext),
            None => format!("{}-{}", file, component),
        }
    }

    /// Fully qualified target name.
    pub fn qualified(&self, target: &str) -> String {
        format!("{}{}", self.namespace.as_deref().unwrap_or(""), target)
    }

    /// All targets of the set, top-level first, then per component.
    pub fn all_targets(&self) -> impl Iterator<Item = &ExportedTarget> {
        self.targets
            .iter()
            .chain(self.components.iter().flat_map(|c| c.targets.iter()))
    }
}

/// Targets the package defines by hand instead of through an export set.
///
/// The generated config runs `commands` only if none of `targets` already
/// exist; a partial pre-existing definition is fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTargets {
    /// Expected fully qualified target names
    pub targets: Vec<String>,

    /// Directives that define the targets
    #[serde(default)]
    pub commands: Vec<String>,
}

impl ManualTargets {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Legacy alias variable for a target: short name after the namespace,
/// uppercased, with every non-alphanumeric character replaced by `_`.
pub fn legacy_alias(qualified: &str) -> String {
    let short = qualified.rsplit("::").next().unwrap_or(qualified);
    short
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
