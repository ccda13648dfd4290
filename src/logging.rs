use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Diagnostics go to stderr so stdout carries only program output. The
/// filter comes from `BF_LOG` and defaults to `warn`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("BF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
