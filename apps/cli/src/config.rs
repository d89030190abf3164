//! Layered CLI configuration.
//!
//! Sources, lowest priority first: built-in defaults, the config file
//! (`~/.config/strato/config.toml` unless `--config` is given), `STRATO_*`
//! environment variables, command-line flags. The logging variables
//! (`STRATO_LOG`, `RUST_LOG`, `STRATO_LOG_FORMAT`) are read by
//! [`strato_log::Config::with_env`].
//!
//! ```toml
//! url = "https://api.example.com"
//! token = "..."
//! timeout = "30s"
//!
//! [retry]
//! limit = 3
//! interval = "500ms"
//!
//! [log]
//! level = "info,strato_client=debug"
//! format = "compact"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use serde::{Deserialize, Serialize};
use strato_client::ConnectionConfig;

/// Everything the CLI reads from files and the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    pub log: strato_log::Config,
}

/// Values given on the command line; unset flags leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip)]
    pub log: LogOverrides,
}

/// Logging flags, applied after the logging environment variables.
#[derive(Debug, Clone, Default)]
pub struct LogOverrides {
    pub level: Option<String>,
    pub format: Option<strato_log::Format>,
}

impl LogOverrides {
    fn apply(&self, config: &mut strato_log::Config) {
        if let Some(level) = &self.level {
            config.level.clone_from(level);
        }
        if let Some(format) = self.format {
            config.set_format(format);
        }
    }
}

/// Default location of the config file.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strato").join("config.toml"))
}

/// Build the figment for the given file and flags, logging aside.
pub fn figment(file: Option<&Path>, overrides: &Overrides) -> Figment {
    let mut figment = Figment::new();
    if let Some(file) = file {
        figment = figment.merge(Toml::file(file));
    }
    figment
        .merge(
            Env::prefixed("STRATO_")
                .split("__")
                .ignore(&["log", "log_format"]),
        )
        .merge(Serialized::defaults(overrides))
}

/// Resolve the configuration from `file`, the environment and the flags.
pub fn resolve(file: Option<&Path>, overrides: &Overrides) -> anyhow::Result<CliConfig> {
    let mut config: CliConfig = figment(file, overrides)
        .extract()
        .context("failed to load configuration")?;
    config.log = config
        .log
        .with_env()
        .context("invalid logging environment")?;
    overrides.log.apply(&mut config.log);
    Ok(config)
}

/// Load the configuration, reading `file` or the default config file.
pub fn load(file: Option<&Path>, overrides: &Overrides) -> anyhow::Result<CliConfig> {
    let path = file.map(Path::to_path_buf).or_else(default_path);
    resolve(path.as_deref(), overrides)
}
