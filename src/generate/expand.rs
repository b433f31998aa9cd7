//! Placeholder expansion.
//!
//! The assembled template is expanded once per tree. Three kinds of token are
//! recognized:
//!
//! - `@PACKAGE_INIT@`: the serializer's init block for the config depth
//! - `@PACKAGE_<NAME>@` for a path variable: the variable's value relative to
//!   the tree root, as a prefix-relative reference
//! - `@NAME@`: project fields and declared variable values, the same in both
//!   trees
//!
//! Unknown tokens expand to nothing.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::core::package::PackageConfig;
use crate::core::variable::PlaceholderPathVar;
use crate::directive::DirectiveSerializer;
use crate::util::fs::{normalize_path, relative_path, to_slash};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z_][A-Za-z0-9_]*)@").expect("token pattern is valid"));

const INIT: &str = "PACKAGE_INIT";

/// Which tree an expansion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tree {
    Build,
    Install,
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tree::Build => write!(f, "build"),
            Tree::Install => write!(f, "install"),
        }
    }
}

/// Expands templates of one package.
pub struct Expander<'a> {
    serializer: &'a dyn DirectiveSerializer,
    depth: usize,
    path_vars: Vec<PlaceholderPathVar>,
    plain: HashMap<String, String>,
}

impl<'a> Expander<'a> {
    pub fn new(pkg: &PackageConfig, serializer: &'a dyn DirectiveSerializer) -> Self {
        let mut plain = HashMap::new();
        for var in &pkg.variables {
            plain.insert(var.name.clone(), var.value.clone());
        }

        plain.insert("PROJECT_NAME".to_string(), pkg.name.clone());
        plain.insert("PROJECT_VERSION".to_string(), pkg.version.clone());
        if let Ok(version) = pkg.semver() {
            plain.insert("PROJECT_VERSION_MAJOR".to_string(), version.major.to_string());
            plain.insert("PROJECT_VERSION_MINOR".to_string(), version.minor.to_string());
            plain.insert("PROJECT_VERSION_PATCH".to_string(), version.patch.to_string());
        }
        if let Some(ref qualifier) = pkg.qualifier {
            plain.insert("PROJECT_QUALIFIER".to_string(), qualifier.clone());
        }
        if let Some(ref build_type) = pkg.build_type {
            plain.insert("PROJECT_BUILD_TYPE".to_string(), build_type.clone());
        }

        Expander {
            serializer,
            depth: pkg.config_depth(),
            path_vars: pkg.path_vars(),
            plain,
        }
    }

    /// Expand `template` for `tree`, resolving path variables against `root`.
    pub fn expand(&self, template: &str, tree: Tree, root: &Path) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures<'_>| self.token(&caps[1], tree, root))
            .into_owned()
    }

    fn token(&self, name: &str, tree: Tree, root: &Path) -> String {
        if name == INIT {
            return self.serializer.package_init(self.depth);
        }

        if let Some(var) = self.path_vars.iter().find(|v| v.placeholder == name) {
            let value = match tree {
                Tree::Build => &var.build_value,
                Tree::Install => &var.install_value,
            };
            return self.path_reference(value, root);
        }

        match self.plain.get(name) {
            Some(value) => value.clone(),
            None => {
                tracing::debug!("unknown placeholder `@{}@` expands to nothing", name);
                String::new()
            }
        }
    }

    /// Reference to `value` from inside the tree rooted at `root`.
    ///
    /// Relative values are taken as already relative to the root. Absolute
    /// values under the root are made relative; anything else stays absolute.
    fn path_reference(&self, value: &str, root: &Path) -> String {
        let path = Path::new(value.trim());
        if path.is_absolute() {
            let path = normalize_path(path);
            let root = normalize_path(root);
            if path.starts_with(&root) {
                let relative = relative_path(&root, &path);
                self.serializer.prefix_relative(&to_slash(&relative))
            } else {
                to_slash(&path)
            }
        } else {
            let relative = normalize_path(path);
            self.serializer.prefix_relative(&to_slash(&relative))
        }
    }
}

/// Build-tree and install-tree expansions of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub build: String,
    pub install: String,
}

/// Expand `template` for both trees.
pub fn expand_both(
    template: &str,
    pkg: &PackageConfig,
    serializer: &dyn DirectiveSerializer,
    build_root: &Path,
    install_root: &Path,
) -> Expanded {
    let expander = Expander::new(pkg, serializer);
    Expanded {
        build: expander.expand(template, Tree::Build, build_root),
        install: expander.expand(template, Tree::Install, install_root),
    }
}
