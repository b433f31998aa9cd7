//! High-level operations.
//!
//! This module contains the implementation of pkgmeta commands.

pub mod install;
pub mod pkgmeta_generate;
pub mod pkgmeta_init;
pub mod preflight;

pub use install::{emit, EmitResult, InstallEntry, InstallManifest, Layout};
pub use pkgmeta_generate::{
    check, generate, load_package, show, GenerateOptions, GenerateResult, LoadedPackage, ShowTarget,
};
pub use pkgmeta_init::{init_manifest, InitOptions};
pub use preflight::{preflight, DirOverrides, Environment, MissingDeclarationsError};
