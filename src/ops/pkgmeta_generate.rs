//! Implementation of `pkgmeta generate`, `pkgmeta check` and `pkgmeta show`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::Manifest;
use crate::core::package::PackageConfig;
use crate::directive::CMakeSerializer;
use crate::generate::{self, assemble, generate_fragments, Roots, Stage};
use crate::ops::install::{self, EmitResult, Layout};
use crate::ops::preflight::{self, DirOverrides, Environment};
use crate::util::config::Config;
use crate::util::fs::{normalize_path, resolve};
use crate::util::GlobalContext;

/// Options for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Explicit manifest path (default: search upward from cwd)
    pub manifest_path: Option<PathBuf>,

    /// Build/source directories from the command line
    pub dirs: DirOverrides,

    /// Staging directory override
    pub staging_dir: Option<PathBuf>,

    /// Install prefix the install-tree config is resolved against
    pub install_prefix: Option<PathBuf>,

    /// Also write the unexpanded template
    pub emit_template: bool,
}

/// A manifest resolved against the user and project configuration.
#[derive(Debug, Clone)]
pub struct LoadedPackage {
    pub manifest_path: PathBuf,
    pub package: PackageConfig,
    pub config: Config,
}

/// Outcome of a generate run.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub package: String,
    pub layout: Layout,
    pub files: EmitResult,
}

/// Find, parse and configure the package.
pub fn load_package(ctx: &GlobalContext, manifest_path: Option<&Path>) -> Result<LoadedPackage> {
    let manifest_path = ctx.manifest_path(manifest_path)?;
    let manifest = Manifest::load(&manifest_path)?;
    let config = ctx.load_config(&manifest.manifest_dir);
    let package = manifest.package_with(&config.generate)?;

    tracing::debug!(
        "loaded `{}` {} from {}",
        package.name,
        package.version,
        manifest_path.display()
    );

    Ok(LoadedPackage {
        manifest_path,
        package,
        config,
    })
}

/// Run preflight for an already-loaded package.
pub fn check<F>(loaded: &LoadedPackage, dirs: &DirOverrides, env: F) -> Result<Environment>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(preflight::preflight(&loaded.package, dirs, env)?)
}

/// Generate and write every artifact.
pub fn generate<F>(ctx: &GlobalContext, opts: &GenerateOptions, env: F) -> Result<GenerateResult>
where
    F: Fn(&str) -> Option<String>,
{
    let loaded = load_package(ctx, opts.manifest_path.as_deref())?;
    let environment = check(&loaded, &opts.dirs, env)?;
    let pkg = &loaded.package;

    let build_dir = absolute(ctx.cwd(), &environment.build_dir);
    let staging_dir = opts
        .staging_dir
        .clone()
        .or_else(|| loaded.config.generate.staging_dir.clone());
    let install_prefix = opts.install_prefix.as_deref().map(|p| absolute(ctx.cwd(), p));
    let layout = Layout::new(
        &build_dir,
        staging_dir.as_deref(),
        install_prefix.as_deref(),
        &pkg.config_dest,
    );

    let serializer = CMakeSerializer::new();
    let roots = Roots::new(&layout.build_dir, &layout.install_prefix);
    let outputs = generate::render_package(pkg, &serializer, &roots)
        .with_context(|| format!("failed to generate config files for `{}`", pkg.name))?;

    let emit_template = opts.emit_template || loaded.config.generate.emit_template;
    let files = install::emit(pkg, &outputs, &layout, emit_template)?;

    Ok(GenerateResult {
        package: pkg.name.clone(),
        layout,
        files,
    })
}

/// What `pkgmeta show` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTarget {
    Stage(Stage),
    Template,
}

/// Render one stage, or the whole template, without writing anything.
pub fn show(loaded: &LoadedPackage, target: ShowTarget) -> Result<String> {
    let serializer = CMakeSerializer::new();
    let fragments = generate_fragments(&loaded.package);
    match target {
        ShowTarget::Stage(stage) => Ok(fragments.get(stage).render(&serializer)),
        ShowTarget::Template => Ok(assemble(&loaded.package, &fragments, &serializer)?),
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    normalize_path(&resolve(cwd, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::preflight::{BUILD_DIR_ENV, SOURCE_DIR_ENV};
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[package]
name = "Foo"
version = "1.2.3"
qualifier = "e20:prof"
build_type = "Release"

[[variable]]
name = "INCLUDE_DIR"
value = "include"
path = true
omit_if_missing = true

[[export]]
name = "FooTargets"
namespace = "Foo::"
targets = [{ name = "foo", kind = "shared", location = "lib/libfoo.so" }]
"#;

    fn project() -> (TempDir, GlobalContext) {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Pkgmeta.toml"), MANIFEST).unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        (tmp, ctx)
    }

    fn env(tmp: &TempDir) -> impl Fn(&str) -> Option<String> {
        let build = tmp.path().join("build").to_string_lossy().into_owned();
        let source = tmp.path().to_string_lossy().into_owned();
        move |name| match name {
            BUILD_DIR_ENV => Some(build.clone()),
            SOURCE_DIR_ENV => Some(source.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_generate_end_to_end() {
        let (tmp, ctx) = project();
        let result = generate(&ctx, &GenerateOptions::default(), env(&tmp)).unwrap();

        let config_dir = tmp.path().join("build/lib/cmake/Foo");
        let config = std::fs::read_to_string(config_dir.join("FooConfig.cmake")).unwrap();
        assert!(config.contains("if(EXISTS \"${PACKAGE_PREFIX_DIR}/include\")"));
        assert!(config.contains("set_and_check(Foo_INCLUDE_DIR \"${PACKAGE_PREFIX_DIR}/include\")"));
        assert_eq!(config.matches("FooTargets.cmake").count(), 1);
        assert!(!config.contains("FIND_COMPONENTS)"));

        assert_eq!(result.package, "Foo");
        assert!(result.layout.install_manifest_path().is_file());
    }

    #[test]
    fn test_generate_twice_is_byte_identical() {
        let (tmp, ctx) = project();
        generate(&ctx, &GenerateOptions::default(), env(&tmp)).unwrap();
        let staged = tmp.path().join("build/pkgmeta-staging/lib/cmake/Foo/FooConfig.cmake");
        let first = std::fs::read(&staged).unwrap();

        let second_run = generate(&ctx, &GenerateOptions::default(), env(&tmp)).unwrap();
        assert!(second_run.files.written.is_empty());
        assert_eq!(first, std::fs::read(&staged).unwrap());
    }

    #[test]
    fn test_generate_fails_without_environment() {
        let (_tmp, ctx) = project();
        let err = generate(&ctx, &GenerateOptions::default(), |_: &str| None).unwrap_err();
        let missing = err
            .downcast_ref::<preflight::MissingDeclarationsError>()
            .expect("preflight error");
        assert_eq!(missing.missing, vec![BUILD_DIR_ENV, SOURCE_DIR_ENV]);
    }

    #[test]
    fn test_unreadable_hook_writes_nothing() {
        let (tmp, ctx) = project();
        let manifest = format!("{}\n[hooks]\npost_vars = {{ file = \"missing.cmake\" }}\n", MANIFEST);
        std::fs::write(tmp.path().join("Pkgmeta.toml"), manifest).unwrap();

        let err = generate(&ctx, &GenerateOptions::default(), env(&tmp)).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.cmake"));
        assert!(!tmp.path().join("build").exists());
    }

    #[test]
    fn test_show_stage_and_template() {
        let (_tmp, ctx) = project();
        let loaded = load_package(&ctx, None).unwrap();

        let vars = show(&loaded, ShowTarget::Stage(Stage::Vars)).unwrap();
        assert!(vars.contains("@PACKAGE_INCLUDE_DIR@"));
        assert!(show(&loaded, ShowTarget::Stage(Stage::Deps)).unwrap().is_empty());

        let template = show(&loaded, ShowTarget::Template).unwrap();
        assert!(template.contains("@PACKAGE_INIT@"));
    }
}
