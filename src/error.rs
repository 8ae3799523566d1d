use thiserror::Error;

/// Errors produced while resolving and executing instructions
#[derive(Debug, Error)]
pub enum CuehandError {
    /// The structured-generation oracle failed (transport, status or malformed output)
    #[error("Oracle failure: {0}")]
    Oracle(String),

    /// The oracle answered, but its output does not fit the requested schema
    #[error("Oracle output does not match schema '{schema}': {reason}")]
    SchemaMismatch { schema: String, reason: String },

    /// A resolved locator matched zero elements
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The driver rejected an interaction (detached, not visible, not fillable, ...)
    #[error("Action '{action}' failed: {reason}")]
    ActionFailed { action: String, reason: String },

    /// JavaScript evaluation in the page failed
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A CSS or XPath selector could not be parsed
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CuehandError {
    /// Whether this error came from the oracle boundary.
    ///
    /// Schema mismatches count as oracle failures: validating the output is the
    /// oracle's responsibility, not the engine's.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, CuehandError::Oracle(_) | CuehandError::SchemaMismatch { .. })
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CuehandError>;
