//! Fragment generation: the four ordered stages of a config file.

use std::fmt;

use crate::core::dependency;
use crate::core::export::legacy_alias;
use crate::core::package::PackageConfig;
use crate::directive::{DefineGuard, Directive, DirectiveSerializer};

/// Generation stage, in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Vars,
    Deps,
    Targets,
    TargetVars,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Vars, Stage::Deps, Stage::Targets, Stage::TargetVars];

    fn title(&self) -> &'static str {
        match self {
            Stage::Vars => "Package variables",
            Stage::Deps => "Transitive dependencies",
            Stage::Targets => "Exported targets",
            Stage::TargetVars => "Legacy target variables",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Vars => "vars",
            Stage::Deps => "deps",
            Stage::Targets => "targets",
            Stage::TargetVars => "target-vars",
        };
        write!(f, "{}", s)
    }
}

/// The directives of one stage. An empty stage has no section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub stage: Stage,
    pub directives: Vec<Directive>,
}

impl Fragment {
    fn new(stage: Stage, body: Vec<Directive>) -> Self {
        let directives = if body.is_empty() {
            body
        } else {
            let mut directives = Vec::with_capacity(body.len() + 1);
            directives.push(Directive::Comment(format!("####### {} #######", stage.title())));
            directives.extend(body);
            directives
        };
        Fragment { stage, directives }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn render(&self, serializer: &dyn DirectiveSerializer) -> String {
        serializer.render(&self.directives)
    }
}

/// All four fragments of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragments {
    pub vars: Fragment,
    pub deps: Fragment,
    pub targets: Fragment,
    pub target_vars: Fragment,
}

impl Fragments {
    pub fn get(&self, stage: Stage) -> &Fragment {
        match stage {
            Stage::Vars => &self.vars,
            Stage::Deps => &self.deps,
            Stage::Targets => &self.targets,
            Stage::TargetVars => &self.target_vars,
        }
    }
}

/// Produce the four fragments for `pkg`.
pub fn generate_fragments(pkg: &PackageConfig) -> Fragments {
    let fragments = Fragments {
        vars: variable_stage(pkg),
        deps: dependency_stage(pkg),
        targets: target_stage(pkg),
        target_vars: target_var_stage(pkg),
    };

    for stage in Stage::ALL {
        tracing::debug!(
            "{} stage: {} directive(s)",
            stage,
            fragments.get(stage).directives.len()
        );
    }

    fragments
}

/// Variable stage: one assignment per config-visible variable.
pub fn variable_stage(pkg: &PackageConfig) -> Fragment {
    let mut body = Vec::new();

    for var in pkg.variables.iter().filter(|v| v.flags.visible_in_config) {
        if !var.is_emitted() {
            tracing::debug!("omitting null variable `{}`", var.name);
            continue;
        }

        let name = var.config_name(&pkg.name);
        let value = if var.flags.is_path {
            format!("@{}@", var.placeholder())
        } else {
            var.value.clone()
        };

        let assignment = if var.flags.is_path {
            Directive::SetChecked {
                var: name,
                path: value.clone(),
            }
        } else {
            Directive::Set {
                var: name,
                value: value.clone(),
            }
        };

        if var.is_conditional() {
            body.push(Directive::IfPathExists {
                path: value,
                require_nonempty: var.flags.omit_if_empty,
                body: vec![assignment],
            });
        } else {
            body.push(assignment);
        }
    }

    Fragment::new(Stage::Vars, body)
}

/// Dependency stage: top-level directives, then one guard per component.
pub fn dependency_stage(pkg: &PackageConfig) -> Fragment {
    let grouped = dependency::group(&pkg.dependencies);
    if grouped.is_empty() {
        return Fragment::new(Stage::Deps, Vec::new());
    }

    let mut body = vec![Directive::Raw("include(CMakeFindDependencyMacro)".to_string())];
    body.extend(
        grouped
            .top_level
            .iter()
            .map(|d| Directive::Raw(d.to_string())),
    );

    for (component, directives) in &grouped.components {
        body.push(Directive::IfComponent {
            component: component.to_string(),
            body: directives
                .iter()
                .map(|d| Directive::Raw(d.to_string()))
                .collect(),
        });
    }

    Fragment::new(Stage::Deps, body)
}

/// Target stage: export includes, then the define-if-absent guard for
/// manually-declared targets.
pub fn target_stage(pkg: &PackageConfig) -> Fragment {
    let mut body = Vec::new();

    for export in &pkg.exports {
        body.push(Directive::Include {
            file: export.file_name(),
            optional: false,
        });

        for component in &export.components {
            body.push(Directive::IfComponent {
                component: component.name.clone(),
                body: vec![Directive::Include {
                    file: export.component_file_name(&component.name),
                    optional: false,
                }],
            });
        }
    }

    if !pkg.manual_targets.is_empty() {
        body.push(Directive::DefineIfAbsent(DefineGuard {
            targets: pkg.manual_targets.targets.clone(),
            commands: pkg
                .manual_targets
                .commands
                .iter()
                .map(|c| Directive::Raw(c.clone()))
                .collect(),
        }));
    }

    Fragment::new(Stage::Targets, body)
}

/// Target-variable stage: legacy `<TARGET>` aliases for exported targets,
/// only when the package enables them.
pub fn target_var_stage(pkg: &PackageConfig) -> Fragment {
    if !pkg.legacy_target_vars {
        return Fragment::new(Stage::TargetVars, Vec::new());
    }

    let mut body = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for export in &pkg.exports {
        for target in export.all_targets() {
            let qualified = export.qualified(&target.name);
            let alias = legacy_alias(&qualified);
            if seen.contains(&alias) {
                tracing::warn!(
                    "legacy variable `{}` for `{}` clashes with an earlier target; skipping",
                    alias,
                    qualified
                );
                continue;
            }
            seen.push(alias.clone());
            body.push(Directive::Set {
                var: alias,
                value: qualified,
            });
        }
    }

    Fragment::new(Stage::TargetVars, body)
}
