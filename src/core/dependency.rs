//! Transitive dependency directives.

use std::fmt;

use indexmap::IndexMap;

/// Which consumer request a dependency directive belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentScope {
    /// Always emitted.
    TopLevel,
    /// Emitted only when the consumer requests this component.
    Component(String),
}

impl ComponentScope {
    pub fn component(&self) -> Option<&str> {
        match self {
            ComponentScope::TopLevel => None,
            ComponentScope::Component(name) => Some(name),
        }
    }
}

impl fmt::Display for ComponentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentScope::TopLevel => write!(f, "top-level"),
            ComponentScope::Component(name) => write!(f, "component `{}`", name),
        }
    }
}

/// A free-form dependency directive, e.g. `find_dependency(Boost 1.80)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub scope: ComponentScope,
    pub directive: String,
}

impl DependencyRecord {
    pub fn top_level(directive: impl Into<String>) -> Self {
        DependencyRecord {
            scope: ComponentScope::TopLevel,
            directive: directive.into(),
        }
    }

    pub fn component(component: impl Into<String>, directive: impl Into<String>) -> Self {
        DependencyRecord {
            scope: ComponentScope::Component(component.into()),
            directive: directive.into(),
        }
    }
}

/// Dependency records split by scope, preserving declaration order.
#[derive(Debug, Default)]
pub struct GroupedDependencies<'a> {
    pub top_level: Vec<&'a str>,
    /// Components in order of first declaration.
    pub components: IndexMap<&'a str, Vec<&'a str>>,
}

impl GroupedDependencies<'_> {
    pub fn is_empty(&self) -> bool {
        self.top_level.is_empty() && self.components.is_empty()
    }
}

/// Group records by scope without reordering.
pub fn group(records: &[DependencyRecord]) -> GroupedDependencies<'_> {
    let mut grouped = GroupedDependencies::default();
    for record in records {
        match &record.scope {
            ComponentScope::TopLevel => grouped.top_level.push(&record.directive),
            ComponentScope::Component(name) => grouped
                .components
                .entry(name.as_str())
                .or_default()
                .push(&record.directive),
        }
    }
    grouped
}
