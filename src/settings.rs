//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `PORTWATCH_*` environment variables (`PORTWATCH_HOST`, `PORTWATCH_INTERVAL`, ...)
//! 4. command-line flags
//!
//! ```toml
//! host = "db.internal"
//! ports = "5432, 6432"
//! interval = "2s"
//! connect_timeout = "500ms"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;

/// Environment prefix for all settings.
pub const ENV_PREFIX: &str = "PORTWATCH";

/// Resolved settings, before duration strings are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    /// Comma-separated port list.
    pub ports: String,
    pub interval: String,
    pub connect_timeout: String,
    pub stop_timeout: String,
    /// Where `e` (and `--summary`) write the event log.
    pub summary_path: PathBuf,
    /// Where `x` (and `--export`) write the JSON snapshot.
    pub export_path: PathBuf,
    /// Log destination while the terminal UI owns the screen.
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            ports: String::new(),
            interval: "1s".to_string(),
            connect_timeout: "1s".to_string(),
            stop_timeout: "3s".to_string(),
            summary_path: PathBuf::from("port-summary.txt"),
            export_path: PathBuf::from("portwatch-session.json"),
            log_file: PathBuf::from("portwatch.log"),
        }
    }
}

/// Values given on the command line. `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub ports: Option<String>,
    pub interval: Option<String>,
    pub connect_timeout: Option<String>,
    pub stop_timeout: Option<String>,
    pub summary_path: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Probe and shutdown timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub interval: Duration,
    pub connect_timeout: Duration,
    pub stop_timeout: Duration,
}

impl Settings {
    /// Load settings from all layers.
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_env(config_file, overrides, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with_env(
        config_file: Option<&Path>,
        overrides: &Overrides,
        env: Environment,
    ) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        let config = builder
            .add_source(env)
            .set_override_option("host", overrides.host.clone())?
            .set_override_option("ports", overrides.ports.clone())?
            .set_override_option("interval", overrides.interval.clone())?
            .set_override_option("connect_timeout", overrides.connect_timeout.clone())?
            .set_override_option("stop_timeout", overrides.stop_timeout.clone())?
            .set_override_option("summary_path", path_str(&overrides.summary_path))?
            .set_override_option("export_path", path_str(&overrides.export_path))?
            .set_override_option("log_file", path_str(&overrides.log_file))?
            .build()
            .context("failed to load configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Parse and validate the duration settings.
    pub fn timings(&self) -> Result<Timings> {
        let interval = parse_setting("interval", &self.interval)?;
        let connect_timeout = parse_setting("connect_timeout", &self.connect_timeout)?;
        let stop_timeout = parse_setting("stop_timeout", &self.stop_timeout)?;

        if interval.is_zero() {
            bail!("interval must be greater than zero");
        }
        if connect_timeout.is_zero() {
            bail!("connect_timeout must be greater than zero");
        }

        Ok(Timings {
            interval,
            connect_timeout,
            stop_timeout,
        })
    }
}

fn parse_setting(key: &str, value: &str) -> Result<Duration> {
    parse_duration(value).with_context(|| format!("invalid {key}: {value:?}"))
}
