use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_FILE: &str = "frame-inspector.toml";
const DEFAULT_LOG_FILE: &str = "frame-inspector.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Which variables `inspect` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScopeSelection {
    #[default]
    All,
    Locals,
    Members,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub inspect: InspectConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub log_console: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_file: default_log_file(),
            log_console: false,
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_LOG_FILE))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InspectConfig {
    #[serde(default)]
    pub default_scope: ScopeSelection,
}

impl Config {
    /// Load `explicit` if given, else `./frame-inspector.toml` when present,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!(
                    "Specified configuration file does not exist: {}",
                    path.display()
                );
            }
            return Self::load_from_file(path);
        }

        let local = std::env::current_dir()?.join(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_file(&local);
        }
        debug!("Configuration file not found: {}", local.display());
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file '{}'", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid configuration file '{}'", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Settings after command-line flags have been applied over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub log_level: LogLevel,
    /// `log_level` came from `--log-level`, which outranks `RUST_LOG`.
    pub log_level_from_flag: bool,
    pub log_file: Option<PathBuf>,
    pub log_console: bool,
    pub default_scope: ScopeSelection,
}

/// Command-line overrides; `None` leaves the config file's value in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub no_log_file: bool,
    pub log_console: bool,
    pub scope: Option<ScopeSelection>,
}

impl MergedConfig {
    pub fn new(config: Config, overrides: Overrides) -> Self {
        let log_file = if overrides.no_log_file {
            None
        } else {
            overrides.log_file.or(config.general.log_file)
        };

        Self {
            log_level: overrides.log_level.unwrap_or(config.general.log_level),
            log_level_from_flag: overrides.log_level.is_some(),
            log_file,
            log_console: overrides.log_console || config.general.log_console,
            default_scope: overrides.scope.unwrap_or(config.inspect.default_scope),
        }
    }
}
