//! Logging Infrastructure
//!
//! Structured logging setup for both development and production:
//! - Console output (pretty in development, JSON in production)
//! - Daily rotating application logs (deleted after 14 days)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Clean up old application log files (older than 14 days)
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    use chrono::{Local, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(14);

    let app_log_dir = log_dir.join("app");
    if app_log_dir.exists() {
        for entry in fs::read_dir(app_log_dir)? {
            let entry = entry?;
            let path = entry.path();

            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                // Match app.YYYY-MM-DD pattern produced by the daily appender
                if let Some(date_part) = name.strip_prefix("app.")
                    && let Ok(naive_date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                    && let Some(local_datetime) = Local
                        .from_local_datetime(&naive_date.and_hms_opt(0, 0, 0).unwrap())
                        .single()
                    && local_datetime < cutoff
                {
                    fs::remove_file(&path)?;
                    tracing::info!(file = %name, "Deleted old log file");
                }
            }
        }
    }

    Ok(())
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Default log level when RUST_LOG is not set (e.g. "info")
/// * `json_format` - JSON output for production, pretty output for development
/// * `log_dir` - Optional directory for daily-rotated file logging
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let app_layer = json_file_layer(dir)?;
            tokio::spawn(periodic_cleanup(PathBuf::from(dir)));
            subscriber.with(console_layer).with(app_layer).init();
        } else {
            subscriber.with(console_layer).init();
        }
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(EnvFilter::new(level));

        if let Some(dir) = log_dir {
            let app_layer = json_file_layer(dir)?;
            tokio::spawn(periodic_cleanup(PathBuf::from(dir)));
            subscriber.with(console_layer).with(app_layer).init();
        } else {
            subscriber.with(console_layer).init();
        }
    }

    Ok(())
}

/// Daily rotating JSON file layer under `<dir>/app/`
fn json_file_layer<S>(dir: &str) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let log_dir = Path::new(dir);
    let app_log_dir = log_dir.join("app");
    fs::create_dir_all(&app_log_dir)?;

    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");

    Ok(fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .boxed())
}

/// Run log cleanup once a day
async fn periodic_cleanup(log_dir: PathBuf) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(24 * 60 * 60));
    loop {
        interval.tick().await;
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::warn!(error = %e, "Log cleanup failed");
        }
    }
}
