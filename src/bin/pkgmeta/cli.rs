//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use pkgmeta::generate::Stage;
use pkgmeta::ops::ShowTarget;

/// pkgmeta - generate CMake package config files from Pkgmeta.toml
#[derive(Parser)]
#[command(name = "pkgmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate build-tree and install-tree config files
    Generate(GenerateArgs),

    /// Check that every required declaration is present
    Check(CheckArgs),

    /// Print a generation stage or the assembled template
    Show(ShowArgs),

    /// Write a starter Pkgmeta.toml
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Manifest location shared by commands that read one.
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestArg {
    /// Path to Pkgmeta.toml (default: search upward from the current directory)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

/// Build and source directories.
#[derive(Args, Debug, Clone, Default)]
pub struct DirArgs {
    /// Build tree root (overrides PKGMETA_BUILD_DIR)
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Project source root (overrides PKGMETA_SOURCE_DIR)
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    #[command(flatten)]
    pub dirs: DirArgs,

    /// Where install-tree artifacts are staged (relative to the build dir)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Install prefix the install-tree config is resolved against
    #[arg(long, value_name = "PREFIX")]
    pub install_prefix: Option<PathBuf>,

    /// Also write the unexpanded template next to the build-tree config
    #[arg(long)]
    pub emit_template: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    #[command(flatten)]
    pub dirs: DirArgs,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub manifest: ManifestArg,

    /// What to print
    #[arg(long, value_enum, default_value_t = ShowWhat::Template)]
    pub stage: ShowWhat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowWhat {
    Vars,
    Deps,
    Targets,
    TargetVars,
    Template,
}

impl From<ShowWhat> for ShowTarget {
    fn from(what: ShowWhat) -> Self {
        match what {
            ShowWhat::Vars => ShowTarget::Stage(Stage::Vars),
            ShowWhat::Deps => ShowTarget::Stage(Stage::Deps),
            ShowWhat::Targets => ShowTarget::Stage(Stage::Targets),
            ShowWhat::TargetVars => ShowTarget::Stage(Stage::TargetVars),
            ShowWhat::Template => ShowTarget::Template,
        }
    }
}

#[derive(Args)]
pub struct InitArgs {
    /// Project name (defaults to directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
