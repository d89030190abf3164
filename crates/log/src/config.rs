//! Logging configuration and presets

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LogError, LogResult};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter directives (e.g., "info", "debug,hyper=warn")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Colored output
    pub ansi: bool,

    /// Include the event target (module path)
    pub target: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, multi-line
    Pretty,
    /// Compact single-line output
    Compact,
    /// Structured JSON output
    Json,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LogError::Format(other.to_string())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            ansi: true,
            target: false,
        }
    }
}

impl Config {
    /// Default configuration overlaid with the environment
    ///
    /// See [`with_env`](Self::with_env).
    pub fn from_env() -> LogResult<Self> {
        Self::default().with_env()
    }

    /// Overlay environment variables on this configuration
    ///
    /// `STRATO_LOG` wins over `RUST_LOG` for the filter; `STRATO_LOG_FORMAT`
    /// selects the format and must name one. JSON output turns colors off.
    pub fn with_env(self) -> LogResult<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> LogResult<Self> {
        if let Some(level) = lookup("STRATO_LOG").or_else(|| lookup("RUST_LOG")) {
            self.level = level;
        }

        if let Some(format) = lookup("STRATO_LOG_FORMAT") {
            self.set_format(format.parse()?);
        }

        Ok(self)
    }

    /// Select the output format; JSON output turns colors off.
    pub fn set_format(&mut self, format: Format) {
        self.format = format;
        if format == Format::Json {
            self.ansi = false;
        }
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            ansi: true,
            target: true,
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            ansi: false,
            target: true,
        }
    }
}
