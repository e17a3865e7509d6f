//! Move per-configuration build outputs up into the binary directory.

use anyhow::Result;
use ciprep_cli::args::ArgsRelocate;
use ciprep_cli::commands::run_relocate;
use ciprep_cli::{init_logging, parse_args_or_exit};

fn main() -> Result<()> {
    let args: ArgsRelocate = parse_args_or_exit();
    init_logging();
    run_relocate(&args)?;
    Ok(())
}
