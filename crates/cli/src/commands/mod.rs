//! Subcommand implementations.

pub mod migrate;
pub mod session;
pub mod user;

/// Write one line of command output to stdout.
#[allow(clippy::print_stdout)]
pub fn output(line: impl std::fmt::Display) {
    println!("{line}");
}
