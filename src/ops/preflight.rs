//! Required-declaration checks run before generation.
//!
//! Two passes, and every missing name is collected before failing:
//!
//! 1. the package declaration: name, version and, unless the package is
//!    architecture-independent, qualifier and build type;
//! 2. the environment: the build and source directories, from CLI flags or
//!    `PKGMETA_BUILD_DIR` / `PKGMETA_SOURCE_DIR`.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::package::PackageConfig;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Build directory environment variable.
pub const BUILD_DIR_ENV: &str = "PKGMETA_BUILD_DIR";

/// Source directory environment variable.
pub const SOURCE_DIR_ENV: &str = "PKGMETA_SOURCE_DIR";

/// Required declarations are missing.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("missing required declarations: {}", .missing.join(", "))]
#[diagnostic(
    code(pkgmeta::preflight::missing_declarations),
    help("declare the package fields in Pkgmeta.toml and run pkgmeta from a setup wrapper that exports PKGMETA_BUILD_DIR and PKGMETA_SOURCE_DIR")
)]
pub struct MissingDeclarationsError {
    pub missing: Vec<String>,
}

impl MissingDeclarationsError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(format!(
            "{} required declaration(s) missing",
            self.missing.len()
        ));
        for name in &self.missing {
            diag = diag.with_context(format!("missing: {}", name));
        }
        diag = diag.with_suggestion(usage_banner());
        if self.missing.iter().any(|m| m == BUILD_DIR_ENV) {
            diag = diag.with_suggestion(suggestions::NO_BUILD_DIR);
        }
        diag.with_suggestion(suggestions::MISSING_DECLARATIONS)
    }
}

/// Directories supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct DirOverrides {
    pub build_dir: Option<PathBuf>,
    pub source_dir: Option<PathBuf>,
}

/// Directories the generation runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub build_dir: PathBuf,
    pub source_dir: PathBuf,
}

/// Pass 1: names the package declaration is missing.
pub fn check_declarations(pkg: &PackageConfig) -> Vec<String> {
    let mut missing = Vec::new();
    let blank = |value: Option<&str>| value.map_or(true, |v| v.trim().is_empty());

    if blank(Some(&pkg.name)) {
        missing.push("package.name".to_string());
    }
    if blank(Some(&pkg.version)) {
        missing.push("package.version".to_string());
    }
    if !pkg.noarch {
        if blank(pkg.qualifier.as_deref()) {
            missing.push("package.qualifier".to_string());
        }
        if blank(pkg.build_type.as_deref()) {
            missing.push("package.build_type".to_string());
        }
    }

    missing
}

/// Pass 2: resolve the build and source directories. Flags win over the
/// environment.
pub fn check_environment<F>(overrides: &DirOverrides, env: F) -> Result<Environment, Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |flag: &Option<PathBuf>, var: &str| {
        flag.clone().or_else(|| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        })
    };

    let build_dir = lookup(&overrides.build_dir, BUILD_DIR_ENV);
    let source_dir = lookup(&overrides.source_dir, SOURCE_DIR_ENV);

    match (build_dir, source_dir) {
        (Some(build_dir), Some(source_dir)) => Ok(Environment {
            build_dir,
            source_dir,
        }),
        (build_dir, source_dir) => {
            let mut missing = Vec::new();
            if build_dir.is_none() {
                missing.push(BUILD_DIR_ENV.to_string());
            }
            if source_dir.is_none() {
                missing.push(SOURCE_DIR_ENV.to_string());
            }
            Err(missing)
        }
    }
}

/// Run both passes.
pub fn preflight<F>(
    pkg: &PackageConfig,
    overrides: &DirOverrides,
    env: F,
) -> Result<Environment, MissingDeclarationsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = check_declarations(pkg);
    let environment = match check_environment(overrides, env) {
        Ok(environment) => Some(environment),
        Err(names) => {
            missing.extend(names);
            None
        }
    };

    match environment {
        Some(environment) if missing.is_empty() => {
            tracing::debug!(
                "preflight ok: build dir {}, source dir {}",
                environment.build_dir.display(),
                environment.source_dir.display()
            );
            Ok(environment)
        }
        _ => Err(MissingDeclarationsError { missing }),
    }
}

/// Read from the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Usage text shown when preflight fails.
pub fn usage_banner() -> String {
    format!(
        "pkgmeta is meant to run from a build setup wrapper that exports\n     \
         {} (the build tree) and {} (the project sources),\n     \
         or pass --build-dir and --source-dir explicitly",
        BUILD_DIR_ENV, SOURCE_DIR_ENV
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn declared() -> PackageConfig {
        let mut pkg = PackageConfig::new("Foo", "1.0.0");
        pkg.qualifier = Some("e20:prof".to_string());
        pkg.build_type = Some("Release".to_string());
        pkg
    }

    #[test]
    fn test_complete_declaration_passes() {
        let env = env_of(&[(BUILD_DIR_ENV, "/b"), (SOURCE_DIR_ENV, "/s")]);
        let environment = preflight(&declared(), &DirOverrides::default(), env).unwrap();
        assert_eq!(environment.build_dir, PathBuf::from("/b"));
        assert_eq!(environment.source_dir, PathBuf::from("/s"));
    }

    #[test]
    fn test_every_missing_name_is_reported() {
        let pkg = PackageConfig::new("", " ");
        let err = preflight(&pkg, &DirOverrides::default(), env_of(&[])).unwrap_err();
        assert_eq!(
            err.missing,
            vec![
                "package.name",
                "package.version",
                "package.qualifier",
                "package.build_type",
                BUILD_DIR_ENV,
                SOURCE_DIR_ENV,
            ]
        );
    }

    #[test]
    fn test_noarch_skips_qualifier_and_build_type() {
        let mut pkg = PackageConfig::new("Foo", "1.0.0");
        pkg.noarch = true;
        assert!(check_declarations(&pkg).is_empty());
    }

    #[test]
    fn test_flags_win_over_environment() {
        let overrides = DirOverrides {
            build_dir: Some(PathBuf::from("/flag/build")),
            source_dir: None,
        };
        let env = env_of(&[(BUILD_DIR_ENV, "/env/build"), (SOURCE_DIR_ENV, "/env/src")]);
        let environment = check_environment(&overrides, env).unwrap();
        assert_eq!(environment.build_dir, PathBuf::from("/flag/build"));
        assert_eq!(environment.source_dir, PathBuf::from("/env/src"));
    }

    #[test]
    fn test_empty_environment_value_counts_as_missing() {
        let env = env_of(&[(BUILD_DIR_ENV, ""), (SOURCE_DIR_ENV, "/s")]);
        let missing = check_environment(&DirOverrides::default(), env).unwrap_err();
        assert_eq!(missing, vec![BUILD_DIR_ENV]);
    }

    #[test]
    fn test_diagnostic_lists_names_and_banner() {
        let err = MissingDeclarationsError {
            missing: vec!["package.qualifier".to_string(), BUILD_DIR_ENV.to_string()],
        };
        let text = err.to_diagnostic().to_string();
        assert!(text.contains("2 required declaration(s) missing"));
        assert!(text.contains("missing: package.qualifier"));
        assert!(text.contains("missing: PKGMETA_BUILD_DIR"));
        assert!(text.contains("setup wrapper"));
        assert_eq!(
            err.to_string(),
            "missing required declarations: package.qualifier, PKGMETA_BUILD_DIR"
        );
    }
}
