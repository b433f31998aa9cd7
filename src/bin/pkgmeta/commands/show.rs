//! `pkgmeta show` command
//!
//! Prints to stdout so the output can be piped or diffed.

use anyhow::Result;

use crate::cli::ShowArgs;
use pkgmeta::ops::{load_package, show};
use pkgmeta::util::GlobalContext;

pub fn execute(args: ShowArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let loaded = load_package(&ctx, args.manifest.manifest.as_deref())?;

    let text = show(&loaded, args.stage.into())?;
    if text.is_empty() {
        tracing::info!("stage `{:?}` is empty for `{}`", args.stage, loaded.package.name);
    } else {
        print!("{}", text);
        if !text.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
