//! pkgmeta - a generator of CMake package config files
//!
//! This crate turns a declarative package description (`Pkgmeta.toml`) into
//! the files consumed by `find_package`: build-tree and install-tree
//! `<Project>Config.cmake`, a version file, and per-export include files.
//!
//! The pipeline is linear: [`core::PackageConfig`] (metadata store) ->
//! [`generate::fragments`] -> [`generate::assemble`] -> [`generate::expand`]
//! -> [`ops::install`].

pub mod core;
pub mod directive;
pub mod generate;
pub mod ops;
pub mod util;

pub use core::{
    dependency::DependencyRecord, export::ExportRecord, manifest::Manifest,
    package::PackageConfig, variable::PackageVariable,
};

pub use directive::{CMakeSerializer, Directive, DirectiveSerializer};
pub use util::context::GlobalContext;
