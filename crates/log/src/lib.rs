//! # Strato Log
//!
//! `tracing-subscriber` setup for Strato binaries.
//!
//! ```rust,no_run
//! use strato_log::Config;
//!
//! fn main() -> strato_log::LogResult<()> {
//!     strato_log::init(&Config::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

mod builder;
mod config;
mod error;

pub use builder::LoggerBuilder;
pub use config::{Config, Format};
pub use error::{LogError, LogResult};

/// Install the global subscriber described by `config`.
///
/// Fails instead of panicking when a subscriber is already installed.
pub fn init(config: &Config) -> LogResult<()> {
    LoggerBuilder::from_config(config.clone()).build()
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{Config, Format, LogError, LogResult};
    pub use tracing::{debug, error, info, trace, warn};
}
