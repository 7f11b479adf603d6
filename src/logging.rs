use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("blog-editor.log")
        .build(log_dir)
}

/// Logs go to a daily rotated file; the terminal belongs to the UI.
/// Honours `RUST_LOG`, defaulting to `info`. Keep the guard alive until exit
/// or buffered lines are lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    let appender = file_appender(log_dir)
        .wrap_err_with(|| format!("cannot open log directory {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_log_dir_is_an_error() {
        let err = init(Path::new("/dev/null/logs")).unwrap_err();
        assert!(err.to_string().contains("/dev/null/logs"));
    }

    #[test]
    fn appender_creates_missing_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        file_appender(&log_dir).unwrap();
        assert!(log_dir.is_dir());
    }
}
