/// Tracing subscriber setup shared by the server and seed binaries
///
/// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches to
/// one JSON object per line.

use crate::config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber
pub fn init(default_filter: &str) {
    let format = LogFormat::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with((format == LogFormat::Text).then(fmt::layer))
        .with((format == LogFormat::Json).then(|| fmt::layer().json()))
        .init();
}
