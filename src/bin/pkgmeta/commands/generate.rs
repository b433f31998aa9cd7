//! `pkgmeta generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use pkgmeta::ops::preflight::process_env;
use pkgmeta::ops::{generate, GenerateOptions, GenerateResult};
use pkgmeta::util::fs::relative_path;
use pkgmeta::util::shell::Status;
use pkgmeta::util::{GlobalContext, Shell};

pub fn execute(args: GenerateArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let opts = GenerateOptions {
        manifest_path: args.manifest.manifest,
        dirs: args.dirs.into(),
        staging_dir: args.staging_dir,
        install_prefix: args.install_prefix,
        emit_template: args.emit_template,
    };

    let result = generate(&ctx, &opts, process_env)?;
    report(&ctx, &result, shell);

    Ok(())
}

fn report(ctx: &GlobalContext, result: &GenerateResult, shell: &Shell) {
    let display = |path: &std::path::Path| relative_path(ctx.cwd(), path).display().to_string();

    for path in &result.files.written {
        shell.status(Status::Created, display(path));
    }
    if shell.is_verbose() {
        for path in &result.files.unchanged {
            shell.status(Status::Fresh, display(path));
        }
    }

    shell.status(
        Status::Finished,
        format!(
            "`{}` config ({} written, {} unchanged)",
            result.package,
            result.files.written.len(),
            result.files.unchanged.len()
        ),
    );
}
