//! Argument models for both binaries.

use std::path::{Path, PathBuf};

use ciprep_io_fs::conf::{C_DIR_BIN_DEFAULT, C_DIR_DESTINATION_DEFAULT, C_DIR_SOURCE_DEFAULT};
use clap::Parser;

/// Copy the source tree into the internal-tests tree with internal linkage stripped.
#[derive(Debug, Clone, Parser)]
#[command(name = "prepare-internal-tests", version)]
pub struct ArgsPrepare {
    /// Project root; relative defaults below are resolved against it [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Source tree to mirror [default: <project-root>/adorad]
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Destination tree [default: <project-root>/AdoradInternalTests]
    #[arg(long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// TOML rule set replacing the built-in preset
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Walk and transform without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Record per-file IO failures and continue instead of aborting
    #[arg(long)]
    pub keep_going: bool,
}

impl ArgsPrepare {
    pub fn path_source(&self, path_project_root: &Path) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| path_project_root.join(C_DIR_SOURCE_DEFAULT))
    }

    pub fn path_destination(&self, path_project_root: &Path) -> PathBuf {
        self.destination
            .clone()
            .unwrap_or_else(|| path_project_root.join(C_DIR_DESTINATION_DEFAULT))
    }
}

/// Copy `<bin-dir>/<BUILD_TYPE>/*` into `<bin-dir>/`.
#[derive(Debug, Clone, Parser)]
#[command(name = "relocate-artifacts", version)]
pub struct ArgsRelocate {
    /// Build configuration name (Debug, Release, ReleaseWithDebInfo, MinSizeRelease)
    pub build_type: String,

    /// Project root [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<PathBuf>,

    /// Binary output directory [default: <project-root>/build/bin]
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// List what would be copied without copying
    #[arg(long)]
    pub dry_run: bool,
}

impl ArgsRelocate {
    pub fn path_bin_dir(&self, path_project_root: &Path) -> PathBuf {
        self.bin_dir
            .clone()
            .unwrap_or_else(|| path_project_root.join(C_DIR_BIN_DEFAULT))
    }
}

/// Explicit `--project-root`, else the working directory.
pub fn resolve_project_root(project_root: Option<&Path>) -> std::io::Result<PathBuf> {
    match project_root {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_dir(),
    }
}
