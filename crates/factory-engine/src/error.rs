//! Error types for the factory binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run loop so
//! that `main` can propagate with `?`.

/// Top-level error for the factory binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: factory_core::config::ConfigError,
    },

    /// Fleet construction failed.
    #[error("fleet error: {source}")]
    Fleet {
        /// The underlying fleet error.
        #[from]
        source: factory_core::fleet::FleetError,
    },

    /// The run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: factory_core::runner::RunnerError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
