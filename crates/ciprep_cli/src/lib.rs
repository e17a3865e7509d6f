//! Command-line surfaces for the CI preparation passes.
//!
//! Both binaries share the logging bootstrap and the usage-error policy:
//! a malformed command line exits with status `1` before any filesystem work.

pub mod args;
pub mod commands;

use std::io::Write;

use clap::Parser;
use clap::error::ErrorKind;

/// Line-oriented `[LEVEL] message` output on stdout, `info` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

/// Exit status for a failed `clap` parse.
pub fn usage_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parse `std::env::args`, printing usage and exiting on failure.
pub fn parse_args_or_exit<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(e.kind()));
        }
    }
}
