use tracing_subscriber::EnvFilter;

// sqlx reports every statement slower than a second as a warning.
const DEFAULT_FILTER: &str = "warn,sqlx=error";

fn default_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Logs go to stderr so stdout carries nothing but the table.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
