//! # sift-log
//!
//! Logging bootstrap for applications and tests that run the sift engine.
//! The engine itself only emits `tracing` events; this crate installs the
//! subscriber that renders them.
//!
//! ```rust,no_run
//! fn main() -> Result<(), sift_log::LogError> {
//!     sift_log::auto_init()?;
//!     tracing::info!(port = 8080, "server starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod error;

pub use builder::LoggerBuilder;
pub use config::{Config, DisplayConfig, Format, Writer};
pub use error::LogError;

// ============================================================================
// Initialization Functions
// ============================================================================

/// Pick a configuration from the environment and build profile, then install it
///
/// `SIFT_LOG` or `RUST_LOG` select [`Config::from_env`]; otherwise debug
/// builds use [`Config::development`] and release builds
/// [`Config::production`].
pub fn auto_init() -> Result<(), LogError> {
    if std::env::var("SIFT_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> Result<(), LogError> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> Result<(), LogError> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests
///
/// Safe to call from every test: a subscriber installed earlier (by this
/// function or anyone else) is left in place.
pub fn init_test() -> Result<(), LogError> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }
    match init_with(Config::test()) {
        Err(LogError::AlreadyInitialized(_)) => Ok(()),
        other => other,
    }
}
