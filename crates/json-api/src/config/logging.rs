//! Logging Config

use clap::Args;
use tracing_subscriber::EnvFilter;

/// Logging output settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log filter applied when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl LoggingConfig {
    /// Initialize the global tracing subscriber.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_unset| EnvFilter::new(&self.log_level));

        let builder = tracing_subscriber::fmt().with_env_filter(filter);

        if self.log_json {
            builder.json().init();
        } else {
            builder.init();
        }
    }
}
