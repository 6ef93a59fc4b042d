//! CLI module.
//!
//! The dispatcher runs early in main() and handles the flags that only
//! print something (`--version`, `--help`):
//!
//! ```ignore
//! use freebox_watcher::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! let options = match run_cli_command(command) {
//!     Some(options) => options,
//!     None => return Ok(()),
//! };
//! ```

pub mod args;

pub use args::{parse_args, usage, CliCommand, RunOptions};

/// Crate version, also sent to the Freebox as the application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `freebox-watcher <version>`
pub fn version_line() -> String {
    format!("freebox-watcher {}", VERSION)
}

/// Returns the options to run the watcher with, or `None` once a
/// print-only command has been handled.
pub fn run_cli_command(command: CliCommand) -> Option<RunOptions> {
    match command {
        CliCommand::Version => {
            println!("{}", version_line());
            None
        }
        CliCommand::Help => {
            println!("{}", usage());
            None
        }
        CliCommand::Run(options) => Some(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_returns_options() {
        let options = RunOptions {
            verbose: true,
            voicemail: true,
        };
        assert_eq!(run_cli_command(CliCommand::Run(options)), Some(options));
    }

    #[test]
    fn test_print_only_commands_return_none() {
        assert!(run_cli_command(CliCommand::Help).is_none());
        assert!(run_cli_command(CliCommand::Version).is_none());
    }

    #[test]
    fn test_version_line() {
        assert!(version_line().starts_with("freebox-watcher "));
        assert!(VERSION.split('.').count() >= 2);
    }
}
