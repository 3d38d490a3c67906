use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::prelude::*;

use client::DEFAULT_CONCURRENCY;

const APP_DIR: &str = "bakactl";
const CONFIG_FILE: &str = "config.toml";
const STORAGE_FILE: &str = "storage.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Failed to setup logging: {0}")]
    LoggingSetup(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Daily,
    Hourly,
    Never,
}

impl LogRotation {
    #[must_use]
    pub const fn to_rotation(self) -> Rotation {
        match self {
            Self::Daily => Rotation::DAILY,
            Self::Hourly => Rotation::HOURLY,
            Self::Never => Rotation::NEVER,
        }
    }
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_timeout() -> Duration {
    client::TIMEOUT
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

const fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "warn".to_string()
}

const fn default_max_log_files() -> usize {
    7
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Storage {
    /// Defaults to `$XDG_STATE_HOME/bakactl/storage.toml`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Upload {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub recursive: bool,
    /// Check files against the server upload settings before queueing.
    #[serde(default = "default_true")]
    pub check: bool,
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            recursive: false,
            check: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// When set, logs are also written to rotated files in this directory.
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub rotation: LogRotation,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            dir: None,
            rotation: LogRotation::default(),
            max_log_files: default_max_log_files(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub upload: Upload,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "server.url must start with http:// or https:// (got '{url}')"
            )));
        }
        if self.server.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "server.timeout must be greater than 0".to_string(),
            ));
        }
        if self.upload.concurrency == 0 {
            return Err(ConfigError::Validation(
                "upload.concurrency must be at least 1".to_string(),
            ));
        }
        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::Validation(format!(
                "logging.level is not a valid filter: '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Resolved path of the local storage file.
    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.as_deref().map_or_else(
            || {
                xdg_dir("XDG_STATE_HOME", ".local/state").map_or_else(
                    || PathBuf::from(format!(".{APP_DIR}-{STORAGE_FILE}")),
                    |dir| dir.join(APP_DIR).join(STORAGE_FILE),
                )
            },
            expand_home,
        )
    }

    /// Installs the global tracing subscriber. Logs go to stderr, and to
    /// rotated files when `logging.dir` is set. `RUST_LOG` overrides the
    /// configured level.
    pub fn init_logger(&self, level: Option<&str>) -> Result<Vec<WorkerGuard>, ConfigError> {
        let level = level.unwrap_or(&self.logging.level);
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let mut guards = Vec::with_capacity(2);
        let (stderr_nb, stderr_guard) = tracing_appender::non_blocking(io::stderr());
        guards.push(stderr_guard);

        let file_nb = match &self.logging.dir {
            Some(dir) => {
                let appender = Builder::new()
                    .rotation(self.logging.rotation.to_rotation())
                    .filename_prefix(APP_DIR)
                    .filename_suffix("log")
                    .max_log_files(self.logging.max_log_files)
                    .build(expand_home(dir))
                    .map_err(|e| ConfigError::LoggingSetup(e.to_string()))?;
                let (file_nb, file_guard) = tracing_appender::non_blocking(appender);
                guards.push(file_guard);
                Some(file_nb)
            }
            None => None,
        };

        let registry = tracing_subscriber::registry().with(env_filter);
        let result = match self.logging.format {
            LogFormat::Text => registry
                .with(
                    tracing_fmt::layer()
                        .with_target(false)
                        .with_writer(stderr_nb),
                )
                .with(file_nb.map(|w| tracing_fmt::layer().with_ansi(false).with_writer(w)))
                .try_init(),
            LogFormat::Json => registry
                .with(tracing_fmt::layer().json().with_writer(stderr_nb))
                .with(file_nb.map(|w| tracing_fmt::layer().json().with_writer(w)))
                .try_init(),
        };
        result.map_err(|e| ConfigError::LoggingSetup(e.to_string()))?;

        Ok(guards)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    env::var_os(var)
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback)))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
