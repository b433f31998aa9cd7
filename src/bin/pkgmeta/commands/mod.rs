//! Command implementations

pub mod check;
pub mod completions;
pub mod generate;
pub mod init;
pub mod show;

use pkgmeta::ops::DirOverrides;

use crate::cli::DirArgs;

impl From<DirArgs> for DirOverrides {
    fn from(args: DirArgs) -> Self {
        DirOverrides {
            build_dir: args.build_dir,
            source_dir: args.source_dir,
        }
    }
}
