//! Template assembly.
//!
//! The template is the concatenation of thirteen sources in a fixed order:
//!
//! ```text
//! preamble, pre_init, init, post_init,
//! vars, post_vars, deps, post_deps,
//! targets, post_targets, target_vars, post_target_vars,
//! bottom
//! ```
//!
//! Hooks are optional. Empty sources contribute nothing.

use std::collections::HashMap;

use crate::core::package::{HookPoint, HookSource, PackageConfig};
use crate::directive::{Directive, DirectiveSerializer};
use crate::generate::fragments::{Fragment, Fragments};
use crate::generate::GenerateError;
use crate::util::fs::resolve;

/// Token expanded to the serializer's init block.
pub const INIT_TOKEN: &str = "@PACKAGE_INIT@";

/// Assemble the unexpanded template for `pkg`.
///
/// Every hook file is read before anything is concatenated, so an unreadable
/// file fails the whole assembly.
pub fn assemble(
    pkg: &PackageConfig,
    fragments: &Fragments,
    serializer: &dyn DirectiveSerializer,
) -> Result<String, GenerateError> {
    let hooks = read_hooks(pkg)?;
    let hook = |point: HookPoint| hooks.get(&point).cloned().unwrap_or_default();
    let fragment = |f: &Fragment| f.render(serializer);

    let sources = [
        serializer.render(&preamble()),
        hook(HookPoint::PreInit),
        format!("{}\n", INIT_TOKEN),
        hook(HookPoint::PostInit),
        fragment(&fragments.vars),
        hook(HookPoint::PostVars),
        fragment(&fragments.deps),
        hook(HookPoint::PostDeps),
        fragment(&fragments.targets),
        hook(HookPoint::PostTargets),
        fragment(&fragments.target_vars),
        hook(HookPoint::PostTargetVars),
        serializer.render(&bottom(pkg)),
    ];

    let mut template = String::new();
    for source in sources.iter().filter(|s| !s.trim().is_empty()) {
        if !template.is_empty() {
            template.push('\n');
        }
        template.push_str(source);
        if !source.ends_with('\n') {
            template.push('\n');
        }
    }

    Ok(template)
}

/// Read the text of every configured hook.
fn read_hooks(pkg: &PackageConfig) -> Result<HashMap<HookPoint, String>, GenerateError> {
    let mut hooks = HashMap::new();

    for point in HookPoint::ALL {
        let text = match pkg.hooks.get(point) {
            None => continue,
            Some(HookSource::Inline(text)) => text.clone(),
            Some(HookSource::File(path)) => {
                let path = resolve(&pkg.base_dir, path);
                tracing::debug!("reading {} hook from {}", point, path.display());
                std::fs::read_to_string(&path).map_err(|source| {
                    GenerateError::UnreadableFragment {
                        point,
                        path: path.clone(),
                        source,
                    }
                })?
            }
        };
        hooks.insert(point, text);
    }

    Ok(hooks)
}

fn preamble() -> Vec<Directive> {
    vec![Directive::Comment(
        "Package configuration for @PROJECT_NAME@ @PROJECT_VERSION@.\n\
         Generated by pkgmeta; changes are overwritten on the next run."
            .to_string(),
    )]
}

/// Mark every known component found, then let the consumer check the
/// required ones.
fn bottom(pkg: &PackageConfig) -> Vec<Directive> {
    let mut directives: Vec<Directive> = pkg
        .components()
        .into_iter()
        .map(|component| Directive::Set {
            var: format!("@PROJECT_NAME@_{}_FOUND", component),
            value: "TRUE".to_string(),
        })
        .collect();
    directives.push(Directive::Raw(
        "check_required_components(@PROJECT_NAME@)".to_string(),
    ));
    directives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dependency::DependencyRecord;
    use crate::core::export::ExportRecord;
    use crate::core::variable::PackageVariable;
    use crate::directive::CMakeSerializer;
    use crate::generate::fragments::generate_fragments;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn package() -> PackageConfig {
        let mut pkg = PackageConfig::new("Foo", "1.0.0");
        pkg.declare_variable(PackageVariable::new("FLAVOR", "prof")).unwrap();
        pkg.add_dependency(DependencyRecord::top_level("find_dependency(Boost)"));
        pkg.add_export(ExportRecord::new("FooTargets")).unwrap();
        pkg
    }

    fn render(pkg: &PackageConfig) -> Result<String, GenerateError> {
        assemble(pkg, &generate_fragments(pkg), &CMakeSerializer::new())
    }

    #[test]
    fn test_sources_follow_fixed_order() {
        let mut pkg = package();
        pkg.legacy_target_vars = true;
        for point in HookPoint::ALL {
            pkg.set_hook(point, HookSource::Inline(format!("# hook {}", point)));
        }

        let template = render(&pkg).unwrap();
        let markers = [
            "# Package configuration for @PROJECT_NAME@",
            "# hook pre_init",
            INIT_TOKEN,
            "# hook post_init",
            "set(Foo_FLAVOR \"prof\")",
            "# hook post_vars",
            "find_dependency(Boost)",
            "# hook post_deps",
            "FooTargets.cmake",
            "# hook post_targets",
            "# hook post_target_vars",
            "check_required_components(@PROJECT_NAME@)",
        ];

        let mut last = 0;
        for marker in markers {
            let pos = template[last..]
                .find(marker)
                .map(|p| p + last)
                .unwrap_or_else(|| panic!("`{}` missing or out of order in:\n{}", marker, template));
            last = pos;
        }
    }

    #[test]
    fn test_empty_stages_leave_no_gaps() {
        let pkg = PackageConfig::new("Bare", "0.1.0");
        let template = render(&pkg).unwrap();
        assert!(!template.contains("\n\n\n"));
        assert!(template.contains(INIT_TOKEN));
        assert!(template.ends_with("check_required_components(@PROJECT_NAME@)\n"));
    }

    #[test]
    fn test_hook_file_relative_to_base_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("cmake")).unwrap();
        std::fs::write(tmp.path().join("cmake/extra.cmake"), "set(EXTRA ON)").unwrap();

        let mut pkg = package();
        pkg.base_dir = tmp.path().to_path_buf();
        pkg.set_hook(HookPoint::PostTargets, HookSource::File(PathBuf::from("cmake/extra.cmake")));

        let template = render(&pkg).unwrap();
        assert!(template.contains("set(EXTRA ON)\n"));
    }

    #[test]
    fn test_unreadable_hook_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut pkg = package();
        pkg.base_dir = tmp.path().to_path_buf();
        pkg.set_hook(HookPoint::PostInit, HookSource::Inline("# fine".to_string()));
        pkg.set_hook(HookPoint::PostTargetVars, HookSource::File(PathBuf::from("missing.cmake")));

        match render(&pkg).unwrap_err() {
            GenerateError::UnreadableFragment { point, path, .. } => {
                assert_eq!(point, HookPoint::PostTargetVars);
                assert_eq!(path, tmp.path().join("missing.cmake"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_component_found_flags() {
        let mut pkg = package();
        pkg.add_dependency(DependencyRecord::component("gui", "find_dependency(Qt5)"));
        let template = render(&pkg).unwrap();
        assert!(template.contains("set(@PROJECT_NAME@_gui_FOUND \"TRUE\")\n"));
    }
}
