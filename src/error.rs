//! Error types for pagekit
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Provider failures are recorded in the pager state rather than returned;
//! the error variants a caller can actually receive from `fetch` are the
//! invariant faults.

use thiserror::Error;

/// The main error type for pagekit
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ============================================================================
    // State Machine Errors
    // ============================================================================
    /// An illegal state transition was attempted. This is a programming
    /// fault, not a runtime condition; it exists to make bugs loud in tests.
    #[error("Illegal state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ============================================================================
    // Provider Errors
    // ============================================================================
    /// The fetch provider failed. Surfaced through `PagerState::Error`.
    #[error("Fetch provider error: {0}")]
    Provider(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-transition error
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a provider error from a message
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(anyhow::anyhow!(message.into()))
    }

    /// Check if this error represents a programming fault rather than a
    /// recoverable runtime condition
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

/// Result type alias for pagekit
pub type Result<T> = std::result::Result<T, Error>;
