//! # jot CLI
//!
//! Directory-scoped notes from the command line.
//! Run `jot --help` for usage information.

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
