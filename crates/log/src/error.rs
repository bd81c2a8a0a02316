//! Error type for logger setup

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Filter directive could not be parsed
    #[error("invalid filter '{filter}': {reason}")]
    Filter {
        /// The offending directive string
        filter: String,
        /// Parser message
        reason: String,
    },

    /// Another global subscriber is already installed
    #[error("global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}
