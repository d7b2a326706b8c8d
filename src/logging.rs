use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; enabling debug logging in
/// the settings file raises it to `debug` and additionally lets the `RUST_LOG`
/// environment variable override the filter.
pub fn init(debug: bool) {
    // With debug logging off we pin the level to `info` so a stray `RUST_LOG`
    // in the user's environment cannot flood the console.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
