//! pkgmeta CLI - generate CMake package config files

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use pkgmeta::core::manifest::ManifestError;
use pkgmeta::generate::GenerateError;
use pkgmeta::ops::MissingDeclarationsError;
use pkgmeta::util::diagnostic::{self, suggestions, Diagnostic};
use pkgmeta::util::Shell;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("pkgmeta=debug")
    } else if cli.quiet {
        EnvFilter::new("pkgmeta=warn")
    } else {
        EnvFilter::new("pkgmeta=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color);

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, &shell),
        Commands::Check(args) => commands::check::execute(args, &shell),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Init(args) => commands::init::execute(args, &shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print known library errors as diagnostics, anything else as a plain
/// error chain.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(missing) = err.chain().find_map(|e| e.downcast_ref::<MissingDeclarationsError>()) {
        diagnostic::emit(&missing.to_diagnostic(), color);
        return;
    }

    if let Some(generate) = err.chain().find_map(|e| e.downcast_ref::<GenerateError>()) {
        diagnostic::emit(&generate.to_diagnostic(), color);
        return;
    }

    if let Some(ManifestError::NotFound { dir }) = err.chain().find_map(|e| e.downcast_ref::<ManifestError>()) {
        let diag = Diagnostic::error("could not find `Pkgmeta.toml`")
            .with_context(format!("searched `{}` and its parents", dir.display()))
            .with_suggestion(suggestions::NO_MANIFEST);
        diagnostic::emit(&diag, color);
        return;
    }

    eprintln!("error: {:#}", err);
}
