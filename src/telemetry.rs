use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Pretty output for local debugging, JSON lines otherwise. `RUST_LOG`
/// overrides the default level.
pub fn get_subscriber(debug: bool) -> impl tracing::Subscriber + Send + Sync {
    let default_level = if debug { "trace" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (pretty_log, json_log) = if debug {
        (Some(fmt::layer().pretty()), None)
    } else {
        (None, Some(fmt::layer().json()))
    };

    Registry::default()
        .with(env_filter)
        .with(pretty_log)
        .with(json_log)
}

pub fn init_subscriber(subscriber: impl tracing::Subscriber + Send + Sync) {
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}
