//! Directive AST for generated config files.
//!
//! Generation builds a tree of [`Directive`]s describing *what* the config
//! file expresses; a [`DirectiveSerializer`] decides *how* it is printed for a
//! given target syntax. [`simulate`] evaluates the same tree against a
//! simulated consumer.

pub mod cmake;
pub mod simulate;

use std::fmt;

use semver::Version;

use crate::core::export::TargetKind;
use crate::core::package::Compatibility;

pub use cmake::CMakeSerializer;

/// One construct of a generated config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Comment text; may span lines.
    Comment(String),

    /// An empty line.
    Blank,

    /// Literal assignment.
    Set { var: String, value: String },

    /// Assignment that fails at consumption time if `path` does not exist.
    SetChecked { var: String, path: String },

    /// Remove a variable.
    Unset(String),

    /// Run `body` only if `path` exists and, with `require_nonempty`, is a
    /// non-empty directory.
    IfPathExists {
        path: String,
        require_nonempty: bool,
        body: Vec<Directive>,
    },

    /// Run `body` only if the consumer requested `component`.
    IfComponent {
        component: String,
        body: Vec<Directive>,
    },

    /// Include a file that lives next to the config file.
    Include { file: String, optional: bool },

    /// Idempotent definition of manually-declared targets.
    DefineIfAbsent(DefineGuard),

    /// Compute the tree root of an export file `depth` levels up.
    ImportPrefix { depth: usize },

    /// Define an imported target unless it already exists.
    ImportedTarget(ImportedTarget),

    /// Abort the consumer's configuration with a message.
    Fatal(String),

    /// Opaque directive text, emitted verbatim at the current indentation.
    Raw(String),
}

/// Targets that must be defined all at once or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineGuard {
    /// Expected target names
    pub targets: Vec<String>,

    /// Directives run when none of the targets exist
    pub commands: Vec<Directive>,
}

/// An imported target published by an export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTarget {
    /// Fully qualified name
    pub name: String,
    pub kind: TargetKind,
    /// Location relative to the import prefix
    pub location: Option<String>,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", CMakeSerializer::new().render(std::slice::from_ref(self)))
    }
}

/// Prints directives in one target syntax.
pub trait DirectiveSerializer {
    /// Render a directive list; the result ends with a newline unless empty.
    fn render(&self, directives: &[Directive]) -> String;

    /// The init block substituted for `@PACKAGE_INIT@`: computes the package
    /// prefix from a config file `depth` directories below the tree root and
    /// defines the helpers the rest of the file relies on.
    fn package_init(&self, depth: usize) -> String;

    /// Reference to a path below the package prefix.
    fn prefix_relative(&self, relative: &str) -> String;

    /// Contents of the version-compatibility file.
    fn version_file(&self, version: &Version, compatibility: Compatibility) -> String;
}
