//! Core data structures for pkgmeta.
//!
//! This module is the metadata store of the pipeline:
//! - Declared variables and their semantic flags
//! - Dependency directives, top-level or per component
//! - Export sets and manually-defined targets
//! - The per-package configuration object and its manifest

pub mod dependency;
pub mod export;
pub mod manifest;
pub mod package;
pub mod variable;

pub use dependency::{ComponentScope, DependencyRecord};
pub use export::{ExportRecord, ExportedTarget, ManualTargets, TargetKind};
pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use package::{Compatibility, HookPoint, HookSource, PackageConfig};
pub use variable::{PackageVariable, PlaceholderPathVar, VarFlags};
