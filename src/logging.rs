//! Tracing subscriber setup for the CLI
//!
//! Diagnostics go to stderr so command output on stdout stays clean.
//! Filter precedence: `--verbose` > `RUST_LOG` > default `warn`. HTTP stack
//! crates stay at `warn` in verbose mode.

use tracing_subscriber::EnvFilter;

/// Filter directive used for `--verbose`
const VERBOSE_FILTER: &str = "sponsordash_cli=debug,sponsordash=debug,hyper=warn,h2=warn,reqwest=warn,rustls=warn";

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
