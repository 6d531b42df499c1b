//! Tracing setup shared by every binary.
//!
//! Output goes to stderr: stdout belongs to the hook payload. Quiet by
//! default (`hookgate=warn`); set `RUST_LOG=hookgate=debug` to see each
//! decision and branch lookup.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "hookgate=warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
