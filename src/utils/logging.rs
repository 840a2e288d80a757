use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a `tracing` filter directive, e.g. `monero_tutor=debug`.
pub const LOG_FILTER_ENV: &str = "MONERO_TUTOR_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,monero_tutor=debug"
    } else {
        "warn"
    }
}

/// Installs the diagnostic subscriber. Output goes to stderr so chat text on stdout stays clean.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_tracing(verbose: bool) {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init();
}
