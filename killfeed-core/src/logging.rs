use crate::conf::types::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// File name prefix of the daily rolling log.
pub const LOG_FILE_PREFIX: &str = "killfeed.log";

/// Initialize the logging system with JSON formatting and environment-based filtering
///
/// - `RUST_LOG` wins over `logging.level`, which wins over "info"
/// - Events are flattened JSON on stderr, leaving stdout to command output
/// - With `logging.directory` set, the same events also go to a daily rolling
///   file; keep the returned guard alive until exit so it is flushed
pub fn init_normal_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.level.as_deref().unwrap_or("info"))
    });

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // If tokio-console is enabled, DO NOT install the normal subscriber
    if std::env::var("TOKIO_CONSOLE").is_ok() {
        init_console_logging();
        None
    } else {
        init_normal_logging(config)
    }
}

fn init_console_logging() {
    console_subscriber::init();
}
