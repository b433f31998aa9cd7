//! CLI integration tests for pkgmeta.
//!
//! These tests drive the binary from manifest creation through generation.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
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

[[variable]]
name = "FLAVOR"
value = "prof"

[[dependency]]
directive = "find_dependency(Boost 1.80)"

[[export]]
name = "FooTargets"
namespace = "Foo::"
targets = [{ name = "foo", kind = "shared", location = "lib/libfoo.so" }]
components = [{ name = "gui", targets = [{ name = "gui", kind = "interface" }] }]
"#;

/// Get the pkgmeta binary command, isolated from the user's home and the
/// setup-wrapper environment.
fn pkgmeta(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pkgmeta").unwrap();
    cmd.env("PKGMETA_HOME", home)
        .env_remove("PKGMETA_BUILD_DIR")
        .env_remove("PKGMETA_SOURCE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a project directory containing the test manifest.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("Pkgmeta.toml"), MANIFEST).unwrap();
    tmp
}

// ============================================================================
// pkgmeta init
// ============================================================================

#[test]
fn test_init_in_empty_directory() {
    let tmp = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["init", "--name", "Widget"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let manifest = fs::read_to_string(tmp.path().join("Pkgmeta.toml")).unwrap();
    assert!(manifest.contains("name = \"Widget\""));
    assert!(manifest.contains("name = \"WidgetTargets\""));
}

#[test]
fn test_init_fails_if_manifest_exists() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["init", "--name", "Foo"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(tmp.path().join("Pkgmeta.toml")).unwrap(), MANIFEST);
}

#[test]
fn test_init_then_generate() {
    let tmp = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["init", "--name", "Widget"])
        .current_dir(tmp.path())
        .assert()
        .success();

    pkgmeta(home.path())
        .args(["generate", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("build/lib/cmake/Widget/WidgetConfig.cmake").is_file());
}

// ============================================================================
// pkgmeta generate
// ============================================================================

#[test]
fn test_generate_writes_both_trees() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["generate", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished"));

    let build = tmp.path().join("build/lib/cmake/Foo");
    let staged = tmp.path().join("build/pkgmeta-staging/lib/cmake/Foo");
    for dir in [&build, &staged] {
        for name in ["FooConfig.cmake", "FooConfigVersion.cmake", "FooTargets.cmake", "FooTargets-gui.cmake"] {
            assert!(dir.join(name).is_file(), "{} missing in {}", name, dir.display());
        }
    }
    assert!(tmp.path().join("build/pkgmeta-staging/install_manifest.json").is_file());

    let config = fs::read_to_string(build.join("FooConfig.cmake")).unwrap();
    assert!(config.contains("set(Foo_FLAVOR \"prof\")"));
    assert!(config.contains("find_dependency(Boost 1.80)"));
    assert!(config.contains("check_required_components(Foo)"));
    assert!(!config.contains("@PACKAGE_"));
}

#[test]
fn test_generate_reads_environment() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .arg("generate")
        .env("PKGMETA_BUILD_DIR", tmp.path().join("out"))
        .env("PKGMETA_SOURCE_DIR", tmp.path())
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("out/lib/cmake/Foo/FooConfig.cmake").is_file());
}

#[test]
fn test_generate_twice_reports_unchanged() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    let args = ["generate", "--build-dir", "build", "--source-dir", "."];

    pkgmeta(home.path()).args(args).current_dir(tmp.path()).assert().success();
    let config = tmp.path().join("build/lib/cmake/Foo/FooConfig.cmake");
    let first = fs::read(&config).unwrap();

    pkgmeta(home.path())
        .args(args)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("0 written"));
    assert_eq!(first, fs::read(&config).unwrap());
}

#[test]
fn test_generate_emit_template() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["generate", "--build-dir", "build", "--source-dir", ".", "--emit-template"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let template = fs::read_to_string(tmp.path().join("build/lib/cmake/Foo/FooConfig.cmake.in")).unwrap();
    assert!(template.contains("@PACKAGE_INIT@"));
}

#[test]
fn test_generate_fails_without_environment() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing: PKGMETA_BUILD_DIR"))
        .stderr(predicate::str::contains("missing: PKGMETA_SOURCE_DIR"));

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_generate_fails_without_manifest() {
    let tmp = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["generate", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pkgmeta.toml"))
        .stderr(predicate::str::contains("pkgmeta init"));
}

#[test]
fn test_generate_fails_on_unreadable_hook() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    let manifest = format!("{}\n[hooks]\npost_deps = {{ file = \"nope.cmake\" }}\n", MANIFEST);
    fs::write(tmp.path().join("Pkgmeta.toml"), manifest).unwrap();

    pkgmeta(home.path())
        .args(["generate", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.cmake"));

    assert!(!tmp.path().join("build").exists());
}

#[test]
fn test_generate_rejects_absolute_config_dest() {
    let tmp = project();
    let home = TempDir::new().unwrap();
    let manifest = MANIFEST.replace(
        "build_type = \"Release\"\n",
        "build_type = \"Release\"\nconfig_dest = \"/tmp/pkgmeta-escape\"\n",
    );
    fs::write(tmp.path().join("Pkgmeta.toml"), manifest).unwrap();

    pkgmeta(home.path())
        .args(["generate", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a relative path"));

    assert!(!tmp.path().join("build").exists());
}

// ============================================================================
// pkgmeta check
// ============================================================================

#[test]
fn test_check_passes_with_dirs() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["check", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("all required declarations present"));
}

#[test]
fn test_check_lists_missing_package_fields() {
    let tmp = TempDir::new().unwrap();
    let home = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("Pkgmeta.toml"),
        "[package]\nname = \"Foo\"\nversion = \"1.0\"\n",
    )
    .unwrap();

    pkgmeta(home.path())
        .args(["check", "--build-dir", "build", "--source-dir", "."])
        .current_dir(tmp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing: package.qualifier"))
        .stderr(predicate::str::contains("missing: package.build_type"));
}

// ============================================================================
// pkgmeta show
// ============================================================================

#[test]
fn test_show_prints_template() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .arg("show")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("@PACKAGE_INIT@"))
        .stdout(predicate::str::contains("include(CMakeFindDependencyMacro)"));
}

#[test]
fn test_show_single_stage() {
    let tmp = project();
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["show", "--stage", "deps"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("find_dependency(Boost 1.80)"))
        .stdout(predicate::str::contains("@PACKAGE_INIT@").not());
}

// ============================================================================
// misc
// ============================================================================

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();

    pkgmeta(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pkgmeta"));
}
