//! `pkgmeta check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use pkgmeta::ops::preflight::process_env;
use pkgmeta::ops::{check, load_package};
use pkgmeta::util::shell::Status;
use pkgmeta::util::{GlobalContext, Shell};

pub fn execute(args: CheckArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let loaded = load_package(&ctx, args.manifest.manifest.as_deref())?;

    shell.status(
        Status::Checking,
        format!("`{}` {}", loaded.package.name, loaded.package.version),
    );

    let environment = check(&loaded, &args.dirs.into(), process_env)?;

    if shell.is_verbose() {
        shell.note(format!("build dir: {}", environment.build_dir.display()));
        shell.note(format!("source dir: {}", environment.source_dir.display()));
    }
    shell.status(Status::Finished, "all required declarations present");

    Ok(())
}
