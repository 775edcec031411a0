use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global fmt subscriber once. `RUST_LOG` wins over `level`.
pub fn init_logging(level: Level) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    });
}

/// Parses a log level name, falling back to `INFO`.
pub fn parse_level(name: &str) -> Level {
    name.parse().unwrap_or(Level::INFO)
}
