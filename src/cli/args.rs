//! Command-line argument parsing for the watcher binary.

/// Options for a watcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Log at debug level for this crate.
    pub verbose: bool,
    /// Also watch for new voicemails.
    pub voicemail: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            voicemail: true,
        }
    }
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Watch the Freebox (default)
    Run(RunOptions),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use freebox_watcher::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["freebox-watcher".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut options = RunOptions::default();

    for arg in args.skip(1) {
        // Skip the program name
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--verbose" | "-v" => options.verbose = true,
            "--no-voicemail" => options.voicemail = false,
            other => tracing::debug!("Ignoring unknown argument: {}", other),
        }
    }
    CliCommand::Run(options)
}

/// Usage text for `--help`.
pub fn usage() -> &'static str {
    "Usage: freebox-watcher [OPTIONS]

Notify incoming calls and new voicemails of a Freebox.

Options:
  -v, --verbose       Debug logging (overridden by RUST_LOG)
      --no-voicemail  Only watch incoming calls
  -V, --version       Print version
  -h, --help          Print this help

Environment:
  FREEBOX_URL, FREEBOX_TOKEN_DIR, FREEBOX_VOICEMAIL_DIR,
  FREEBOX_NOTIFY_CONFIG, FREEBOX_PAIRING_TIMEOUT_SECS"
}
