use std::{path::Path, sync::LazyLock};

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";
pub const TRACKER_PREFIX: &str = "tracker";

const LOG_DIR: &str = "logs";
const MAX_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "info";

/// Installs the global subscriber. Logs always go to daily rotated files in `<app_dir>/logs`,
/// named after `prefix`. Console output goes to stderr and only when `show_std` is set, stdout
/// is kept for command output.
pub fn enable_logging(
    prefix: &str,
    app_dir: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .build(app_dir.join(LOG_DIR))?;

    let stderr = std::io::stderr.with_filter(move |_| show_std);

    let level = resolve_level(log_level, std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(crate_filter(&level))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stderr.and(appender))
        .pretty()
        .try_init()
        .map_err(|e| anyhow!("Failed to install logging {e}"))?;
    Ok(())
}

/// An explicit level wins over `RUST_LOG`.
fn resolve_level(log_level: Option<LevelFilter>, env_level: Option<String>) -> String {
    log_level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| DEFAULT_LEVEL.into())
}

/// Dependencies stay quiet, only this crate logs at `level`.
fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!(
        "{}={level}",
        env!("CARGO_PKG_NAME").replace("-", "_"),
    ))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .try_init();
});
