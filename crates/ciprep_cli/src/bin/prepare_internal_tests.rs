//! Mirror the compiler sources into the internal-tests tree.

use anyhow::Result;
use ciprep_cli::args::ArgsPrepare;
use ciprep_cli::commands::run_prepare;
use ciprep_cli::{init_logging, parse_args_or_exit};

fn main() -> Result<()> {
    let args: ArgsPrepare = parse_args_or_exit();
    init_logging();
    run_prepare(&args)?;
    Ok(())
}
