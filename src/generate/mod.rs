//! Config-file generation.
//!
//! The pipeline is linear: fragments are generated from a [`PackageConfig`],
//! assembled with hooks and boilerplate into a template, and the template is
//! expanded once per tree. Nothing here touches the output directories; see
//! `ops::install` for that.

pub mod assemble;
pub mod expand;
pub mod exports;
pub mod fragments;
pub mod version;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::package::{HookPoint, PackageConfig, PackageError};
use crate::directive::DirectiveSerializer;
use crate::util::diagnostic::{suggestions, Diagnostic};

pub use assemble::assemble;
pub use expand::{Expanded, Expander, Tree};
pub use exports::ExportFile;
pub use fragments::{generate_fragments, Fragment, Fragments, Stage};

/// Errors raised while producing artifacts.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read {point} fragment `{}`", .path.display())]
    UnreadableFragment {
        point: HookPoint,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("the config file includes `{file}` but no export produced it")]
    MissingExportArtifact { file: String },
}

impl GenerateError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::UnreadableFragment { point, path, source } => Diagnostic::error(format!(
                "cannot read the {} hook `{}`",
                point,
                path.display()
            ))
            .with_context(source.to_string())
            .with_suggestion(suggestions::fix_hook_path(*point)),
            GenerateError::Package(PackageError::InvalidVersion { version, reason }) => {
                Diagnostic::error(format!("invalid version `{}`", version))
                    .with_context(reason.clone())
                    .with_suggestion("use a version of the form MAJOR[.MINOR[.PATCH]]")
            }
            GenerateError::Package(err) => Diagnostic::error(err.to_string()),
            GenerateError::MissingExportArtifact { file } => {
                Diagnostic::error(format!("no export file `{}` was produced", file))
                    .with_context("every include in the config file must have a matching export file")
            }
        }
    }
}

/// Roots the two expansions are resolved against.
#[derive(Debug, Clone)]
pub struct Roots {
    /// Build tree root (where the build-tree config lives)
    pub build: PathBuf,

    /// Install prefix
    pub install: PathBuf,
}

impl Roots {
    pub fn new(build: impl Into<PathBuf>, install: impl Into<PathBuf>) -> Self {
        Roots {
            build: build.into(),
            install: install.into(),
        }
    }

    pub fn get(&self, tree: Tree) -> &Path {
        match tree {
            Tree::Build => &self.build,
            Tree::Install => &self.install,
        }
    }
}

/// Every artifact of one package, rendered but not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedOutputs {
    /// The assembled template, placeholders unexpanded
    pub template: String,

    /// Config file for the build tree
    pub build_config: String,

    /// Config file for the install tree
    pub install_config: String,

    /// Version-compatibility file
    pub version_file: String,

    /// One file per export set and per (export set, component) pair
    pub exports: Vec<ExportFile>,
}

/// Run the whole generation pipeline for `pkg`.
pub fn render_package(
    pkg: &PackageConfig,
    serializer: &dyn DirectiveSerializer,
    roots: &Roots,
) -> Result<GeneratedOutputs, GenerateError> {
    // Fail on the version before reading any hook files.
    let version_file = version::version_file(pkg, serializer)?;

    let fragments = generate_fragments(pkg);
    let template = assemble(pkg, &fragments, serializer)?;

    let Expanded { build, install } = expand::expand_both(
        &template,
        pkg,
        serializer,
        roots.get(Tree::Build),
        roots.get(Tree::Install),
    );

    let exports = exports::export_files(pkg, serializer);
    exports::verify_exports(&fragments.targets, &exports)?;

    tracing::debug!(
        "rendered `{}` ({} export file(s))",
        pkg.config_file_name(),
        exports.len()
    );

    Ok(GeneratedOutputs {
        template,
        build_config: build,
        install_config: install,
        version_file,
        exports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::{ExportRecord, ExportedTarget, TargetKind};
    use crate::core::package::HookSource;
    use crate::core::variable::PackageVariable;
    use crate::directive::CMakeSerializer;

    fn package() -> PackageConfig {
        let mut pkg = PackageConfig::new("Foo", "1.2");
        pkg.declare_variable(PackageVariable::path("INCLUDE_DIR", "include").omit_if_missing())
            .unwrap();
        pkg.add_export(
            ExportRecord::new("FooTargets")
                .with_namespace("Foo::")
                .with_target(ExportedTarget::new("foo", TargetKind::Shared).with_location("lib/libfoo.so")),
        )
        .unwrap();
        pkg
    }

    #[test]
    fn test_render_is_idempotent() {
        let pkg = package();
        let roots = Roots::new("/build", "/usr/local");
        let first = render_package(&pkg, &CMakeSerializer::new(), &roots).unwrap();
        let second = render_package(&pkg, &CMakeSerializer::new(), &roots).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_leaves_no_placeholders() {
        let pkg = package();
        let roots = Roots::new("/build", "/usr/local");
        let out = render_package(&pkg, &CMakeSerializer::new(), &roots).unwrap();

        assert!(out.template.contains("@PACKAGE_INIT@"));
        for text in [&out.build_config, &out.install_config] {
            assert!(!text.contains("@PACKAGE_"), "unexpanded token in:\n{}", text);
            assert!(text.contains("set_and_check(Foo_INCLUDE_DIR \"${PACKAGE_PREFIX_DIR}/include\")"));
            assert!(text.contains("check_required_components(Foo)"));
        }
        assert!(out.version_file.contains("set(PACKAGE_VERSION \"1.2.0\")"));
    }

    #[test]
    fn test_invalid_version_fails_before_hooks() {
        let mut pkg = package();
        pkg.version = "one".to_string();
        pkg.set_hook(HookPoint::PreInit, HookSource::File(PathBuf::from("/nonexistent/hook.cmake")));

        let err = render_package(&pkg, &CMakeSerializer::new(), &Roots::new("/b", "/i")).unwrap_err();
        assert!(matches!(err, GenerateError::Package(PackageError::InvalidVersion { .. })));
    }

    #[test]
    fn test_hidden_path_variable_usable_in_hook() {
        let mut pkg = package();
        pkg.declare_variable(PackageVariable::path("DATA_DIR", "share/foo").hidden())
            .unwrap();
        pkg.set_hook(
            HookPoint::PostVars,
            HookSource::Inline("set(Foo_DATA \"@PACKAGE_DATA_DIR@\")".to_string()),
        );

        let out = render_package(&pkg, &CMakeSerializer::new(), &Roots::new("/b", "/i")).unwrap();
        for text in [&out.build_config, &out.install_config] {
            assert!(text.contains("set(Foo_DATA \"${PACKAGE_PREFIX_DIR}/share/foo\")"));
            assert!(!text.contains("Foo_DATA_DIR"));
        }
    }

    #[test]
    fn test_init_block_appears_once() {
        let mut pkg = package();
        assert!(pkg
            .declare_variable(PackageVariable::path("INIT", "share/init"))
            .is_err());
        pkg.declare_variable(PackageVariable::path("INIT_DIR", "share/init"))
            .unwrap();

        let out = render_package(&pkg, &CMakeSerializer::new(), &Roots::new("/b", "/i")).unwrap();
        assert_eq!(out.install_config.matches("macro(set_and_check").count(), 1);
        assert!(out
            .install_config
            .contains("set_and_check(Foo_INIT_DIR \"${PACKAGE_PREFIX_DIR}/share/init\")"));
    }

    #[test]
    fn test_unreadable_hook_diagnostic() {
        let mut pkg = package();
        pkg.set_hook(HookPoint::PostDeps, HookSource::File(PathBuf::from("/nonexistent/hook.cmake")));

        let err = render_package(&pkg, &CMakeSerializer::new(), &Roots::new("/b", "/i")).unwrap_err();
        let diag = err.to_diagnostic().to_string();
        assert!(diag.contains("post_deps"));
        assert!(diag.contains("/nonexistent/hook.cmake"));
    }
}
