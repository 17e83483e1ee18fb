use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` picks the filter, `info` by
/// default. Output goes to stderr so it stays clear of the terminal UI.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
