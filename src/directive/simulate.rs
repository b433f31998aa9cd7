//! Consumption-time evaluation of directives.
//!
//! The generated config file is only executed later, by the consumer's
//! `find_package`. [`consume`] walks the same directive tree against a
//! simulated consumer so the conditional behavior of the output can be checked
//! without the host build tool.

use std::collections::HashSet;

use thiserror::Error;

use crate::directive::Directive;

/// Errors a consumer would hit while reading the config file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsumeError {
    #[error(
        "some (but not all) expected targets were already defined\n\
         targets defined: {}\n\
         targets not yet defined: {}",
        .defined.join(";"),
        .undefined.join(";")
    )]
    PartialTargetDefinition {
        defined: Vec<String>,
        undefined: Vec<String>,
    },

    #[error("file or directory `{path}` referenced by variable `{var}` does not exist")]
    MissingPath { var: String, path: String },

    #[error("{0}")]
    Fatal(String),
}

/// The consumer side of a `find_package` call.
#[derive(Debug, Clone, Default)]
pub struct Consumer {
    /// Requested components
    pub components: Vec<String>,

    /// Targets defined before the config file runs
    pub defined_targets: HashSet<String>,

    /// Paths that exist (compared literally)
    pub existing_paths: HashSet<String>,

    /// Existing paths that are non-empty directories
    pub nonempty_dirs: HashSet<String>,
}

impl Consumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.defined_targets.insert(target.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.existing_paths.insert(path.into());
        self
    }

    /// An existing, non-empty directory.
    pub fn with_populated_dir(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.existing_paths.insert(path.clone());
        self.nonempty_dirs.insert(path);
        self
    }

    fn requested(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }
}

/// What the consumer ends up with after reading the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Variable assignments in execution order
    pub assignments: Vec<(String, String)>,

    /// Opaque directives that ran (e.g. `find_dependency(...)` lines)
    pub executed: Vec<String>,

    /// Files included, relative to the config directory
    pub includes: Vec<String>,

    /// Targets the file defined
    pub defined_targets: Vec<String>,
}

impl Outcome {
    pub fn value(&self, var: &str) -> Option<&str> {
        self.assignments
            .iter()
            .rev()
            .find(|(name, _)| name == var)
            .map(|(_, value)| value.as_str())
    }
}

/// Evaluate `directives` for `consumer`.
pub fn consume(directives: &[Directive], consumer: &Consumer) -> Result<Outcome, ConsumeError> {
    let mut state = State {
        consumer,
        defined: consumer.defined_targets.clone(),
        outcome: Outcome::default(),
    };
    state.run(directives)?;
    Ok(state.outcome)
}

struct State<'a> {
    consumer: &'a Consumer,
    defined: HashSet<String>,
    outcome: Outcome,
}

impl State<'_> {
    fn run(&mut self, directives: &[Directive]) -> Result<(), ConsumeError> {
        for directive in directives {
            self.step(directive)?;
        }
        Ok(())
    }

    fn step(&mut self, directive: &Directive) -> Result<(), ConsumeError> {
        match directive {
            Directive::Comment(_) | Directive::Blank | Directive::ImportPrefix { .. } => {}
            Directive::Set { var, value } => {
                self.outcome.assignments.push((var.clone(), value.clone()));
            }
            Directive::SetChecked { var, path } => {
                if !self.consumer.existing_paths.contains(path) {
                    return Err(ConsumeError::MissingPath {
                        var: var.clone(),
                        path: path.clone(),
                    });
                }
                self.outcome.assignments.push((var.clone(), path.clone()));
            }
            Directive::Unset(var) => self.outcome.assignments.retain(|(name, _)| name != var),
            Directive::IfPathExists {
                path,
                require_nonempty,
                body,
            } => {
                let exists = self.consumer.existing_paths.contains(path);
                let populated = !require_nonempty || self.consumer.nonempty_dirs.contains(path);
                if exists && populated {
                    self.run(body)?;
                }
            }
            Directive::IfComponent { component, body } => {
                if self.consumer.requested(component) {
                    self.run(body)?;
                }
            }
            Directive::Include { file, .. } => self.outcome.includes.push(file.clone()),
            Directive::DefineIfAbsent(guard) => {
                let (defined, undefined): (Vec<String>, Vec<String>) = guard
                    .targets
                    .iter()
                    .cloned()
                    .partition(|t| self.defined.contains(t));

                if undefined.is_empty() {
                    tracing::trace!("all {} expected targets already defined", defined.len());
                } else if defined.is_empty() {
                    self.run(&guard.commands)?;
                    for target in &guard.targets {
                        self.define(target);
                    }
                } else {
                    return Err(ConsumeError::PartialTargetDefinition { defined, undefined });
                }
            }
            Directive::ImportedTarget(target) => {
                if !self.defined.contains(&target.name) {
                    self.define(&target.name);
                }
            }
            Directive::Fatal(message) => return Err(ConsumeError::Fatal(message.clone())),
            Directive::Raw(text) => self.outcome.executed.push(text.clone()),
        }
        Ok(())
    }

    fn define(&mut self, target: &str) {
        self.defined.insert(target.to_string());
        self.outcome.defined_targets.push(target.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DefineGuard;

    fn guard() -> Directive {
        Directive::DefineIfAbsent(DefineGuard {
            targets: vec![
                "Foo::a".to_string(),
                "Foo::b".to_string(),
                "Foo::c".to_string(),
            ],
            commands: vec![Directive::Raw("define_foo_targets()".to_string())],
        })
    }

    #[test]
    fn test_define_guard_none_defined_runs_commands() {
        let outcome = consume(&[guard()], &Consumer::new()).unwrap();
        assert_eq!(outcome.executed, vec!["define_foo_targets()"]);
        assert_eq!(outcome.defined_targets, vec!["Foo::a", "Foo::b", "Foo::c"]);
    }

    #[test]
    fn test_define_guard_all_defined_skips() {
        let consumer = Consumer::new()
            .with_target("Foo::a")
            .with_target("Foo::b")
            .with_target("Foo::c");
        let outcome = consume(&[guard()], &consumer).unwrap();
        assert!(outcome.executed.is_empty());
        assert!(outcome.defined_targets.is_empty());
    }

    #[test]
    fn test_define_guard_partial_is_fatal() {
        let consumer = Consumer::new().with_target("Foo::b");
        let err = consume(&[guard()], &consumer).unwrap_err();
        assert_eq!(
            err,
            ConsumeError::PartialTargetDefinition {
                defined: vec!["Foo::b".to_string()],
                undefined: vec!["Foo::a".to_string(), "Foo::c".to_string()],
            }
        );
    }

    #[test]
    fn test_define_guard_twice_is_idempotent() {
        let outcome = consume(&[guard(), guard()], &Consumer::new()).unwrap();
        assert_eq!(outcome.executed.len(), 1);
    }

    #[test]
    fn test_checked_assignment_requires_path() {
        let directives = vec![Directive::SetChecked {
            var: "Foo_INCLUDE_DIR".to_string(),
            path: "/opt/foo/include".to_string(),
        }];

        let err = consume(&directives, &Consumer::new()).unwrap_err();
        assert!(matches!(err, ConsumeError::MissingPath { .. }));

        let outcome = consume(&directives, &Consumer::new().with_path("/opt/foo/include")).unwrap();
        assert_eq!(outcome.value("Foo_INCLUDE_DIR"), Some("/opt/foo/include"));
    }

    #[test]
    fn test_nonempty_check() {
        let directives = vec![Directive::IfPathExists {
            path: "/opt/foo/lib".to_string(),
            require_nonempty: true,
            body: vec![Directive::Set {
                var: "X".to_string(),
                value: "1".to_string(),
            }],
        }];

        let empty_dir = Consumer::new().with_path("/opt/foo/lib");
        assert!(consume(&directives, &empty_dir).unwrap().assignments.is_empty());

        let populated = Consumer::new().with_populated_dir("/opt/foo/lib");
        assert_eq!(consume(&directives, &populated).unwrap().value("X"), Some("1"));
    }
}
