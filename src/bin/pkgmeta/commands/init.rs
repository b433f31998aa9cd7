//! `pkgmeta init` command

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::InitArgs;
use pkgmeta::ops::{init_manifest, InitOptions};
use pkgmeta::util::shell::Status;
use pkgmeta::util::Shell;

/// Determines the project name from the arguments or directory.
pub fn determine_package_name(name: &Option<String>, path: &Path) -> String {
    name.clone().unwrap_or_else(|| {
        let dir = if path == Path::new(".") {
            std::env::current_dir().unwrap_or_else(|_| path.to_path_buf())
        } else {
            path.to_path_buf()
        };
        dir.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string()
    })
}

pub fn execute(args: InitArgs, shell: &Shell) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from("."));
    let name = determine_package_name(&args.name, &path);

    let manifest = init_manifest(&path, &InitOptions { name: name.clone() })?;
    shell.status(
        Status::Created,
        format!("`{}` manifest at {}", name, manifest.display()),
    );

    Ok(())
}
