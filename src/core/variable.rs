//! Package variables exposed to consumers of the generated config file.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic flags attached to a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarFlags {
    /// The value is a filesystem path and is expanded per tree root.
    pub is_path: bool,

    /// Drop the variable entirely when its value is empty.
    pub omit_if_null: bool,

    /// Only assign when the path exists and is a non-empty directory.
    pub omit_if_empty: bool,

    /// Only assign when the path exists.
    pub omit_if_missing: bool,

    /// Export the variable to the config file at all.
    pub visible_in_config: bool,
}

impl Default for VarFlags {
    fn default() -> Self {
        VarFlags {
            is_path: false,
            omit_if_null: false,
            omit_if_empty: false,
            omit_if_missing: false,
            visible_in_config: true,
        }
    }
}

/// A variable declared by the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVariable {
    /// Variable name, without the project prefix (e.g. `INCLUDE_DIR`)
    pub name: String,

    /// Value; for path variables this is the install-tree value
    pub value: String,

    /// Build-tree value for path variables (defaults to `value`)
    pub build_value: Option<String>,

    /// Semantic flags
    pub flags: VarFlags,
}

impl PackageVariable {
    /// Declare a plain variable.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        PackageVariable {
            name: name.into(),
            value: value.into(),
            build_value: None,
            flags: VarFlags::default(),
        }
    }

    /// Declare a path variable.
    pub fn path(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut var = Self::new(name, value);
        var.flags.is_path = true;
        var
    }

    pub fn omit_if_null(mut self) -> Self {
        self.flags.omit_if_null = true;
        self
    }

    pub fn omit_if_empty(mut self) -> Self {
        self.flags.omit_if_empty = true;
        self
    }

    pub fn omit_if_missing(mut self) -> Self {
        self.flags.omit_if_missing = true;
        self
    }

    /// Keep the variable out of the config file (still usable as `@NAME@`).
    pub fn hidden(mut self) -> Self {
        self.flags.visible_in_config = false;
        self
    }

    /// Use a different value when generating the build-tree config.
    pub fn with_build_value(mut self, value: impl Into<String>) -> Self {
        self.build_value = Some(value.into());
        self
    }

    /// Whether the value is unset or empty.
    pub fn is_null(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Whether the variable contributes anything to the variable stage.
    pub fn is_emitted(&self) -> bool {
        self.flags.visible_in_config && !(self.flags.omit_if_null && self.is_null())
    }

    /// Whether the assignment must be wrapped in an existence check.
    pub fn is_conditional(&self) -> bool {
        self.flags.omit_if_missing || self.flags.omit_if_empty
    }

    /// Name of the variable as seen by consumers: `<Project>_<NAME>`.
    pub fn config_name(&self, project: &str) -> String {
        format!("{}_{}", project, self.name)
    }

    /// Name of the path placeholder token, without the `@` delimiters.
    pub fn placeholder(&self) -> String {
        format!("PACKAGE_{}", self.name)
    }

    /// Value used for the build tree.
    pub fn build_value(&self) -> &str {
        self.build_value.as_deref().unwrap_or(&self.value)
    }
}

impl fmt::Display for PackageVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = \"{}\"", self.name, self.value)
    }
}

/// A path variable collected for placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderPathVar {
    /// Placeholder token name (`PACKAGE_<NAME>`)
    pub placeholder: String,

    /// Value for the install tree
    pub install_value: String,

    /// Value for the build tree
    pub build_value: String,
}

impl From<&PackageVariable> for PlaceholderPathVar {
    fn from(var: &PackageVariable) -> Self {
        PlaceholderPathVar {
            placeholder: var.placeholder(),
            install_value: var.value.clone(),
            build_value: var.build_value().to_string(),
        }
    }
}

/// Names whose placeholder would collide with a built-in token.
pub const RESERVED_NAMES: &[&str] = &["INIT"];

/// Check that a variable name is usable in generated code.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
