use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

/// Keeps the background log writer alive; drop it last so buffered lines get flushed.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// The terminal belongs to the UI, so logs only ever go to a daily file.
pub fn init() -> Option<LoggingGuard> {
    let log_dir = AppDirs::log_dir()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .or_else(|| {
            let dir = std::env::temp_dir().join("typeblock").join("logs");
            std::fs::create_dir_all(&dir).ok().map(|_| dir)
        })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "typeblock.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typeblock=info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard { _guard: guard })
}
