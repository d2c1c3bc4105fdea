//! Entry point for the `cobble` binary.
//!
//! Delegates to [`cobble_cli::run`], which loads configuration, validates the
//! subcommand and drives it against the process manager daemon.

use std::process::ExitCode;

fn main() -> ExitCode {
    cobble_cli::run(std::env::args_os(), cobble_cli::Io::stdio())
}
