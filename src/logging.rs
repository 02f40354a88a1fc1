use std::path::Path;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    EnvFilter, Registry,
};

const LOG_FILE_NAME: &str = "judge-watch.log";

pub fn setup_logging(log_dir: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_NAME);

    // stdout carries outbound messages, so the console goes to stderr
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .with_level(true);

    let file_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Logging system initialized in {}", log_dir.display());

    Ok(())
}
