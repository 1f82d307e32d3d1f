use crate::config::{LogLevel, MergedConfig};
use anyhow::Result;
use std::sync::OnceLock;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

static INIT_GUARD: OnceLock<()> = OnceLock::new();

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

// --log-level > RUST_LOG > config file.
fn build_filter(config: &MergedConfig, rust_log: Option<&str>) -> EnvFilter {
    let level = level_filter(config.log_level);
    match rust_log {
        Some(directives) if !config.log_level_from_flag => EnvFilter::builder()
            .with_default_directive(level.into())
            .parse_lossy(directives),
        _ => EnvFilter::default().add_directive(level.into()),
    }
}

/// Install the global subscriber. Later calls are no-ops.
///
/// Console output goes to stderr; stdout is reserved for command output and
/// DAP traffic.
pub fn initialize_logging(config: &MergedConfig) -> Result<()> {
    if INIT_GUARD.set(()).is_err() {
        return Ok(());
    }
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file)
                    .with_filter(build_filter(config, rust_log.as_deref())),
            )
        }
        None => None,
    };

    let console_layer = config.log_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(build_filter(config, rust_log.as_deref()))
    });

    // Ignore AlreadyInit: a test harness may have installed its own subscriber.
    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeSelection;

    fn merged(level: LogLevel, from_flag: bool) -> MergedConfig {
        MergedConfig {
            log_level: level,
            log_level_from_flag: from_flag,
            log_file: None,
            log_console: false,
            default_scope: ScopeSelection::All,
        }
    }

    #[test]
    fn test_flag_level_beats_rust_log() {
        let filter = build_filter(&merged(LogLevel::Debug, true), Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_rust_log_beats_config_level() {
        let filter = build_filter(&merged(LogLevel::Debug, false), Some("warn"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_config_level_without_rust_log() {
        let filter = build_filter(&merged(LogLevel::Info, false), None);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
