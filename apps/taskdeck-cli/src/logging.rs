//! Tracing setup for the CLI

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber
///
/// `RUST_LOG` takes precedence when set; otherwise `-v` selects debug and
/// the default is warnings only, keeping normal command output clean.
/// Diagnostics go to stderr so piped stdout stays machine-readable.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "taskdeck_core=debug,taskdeck_cli=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
