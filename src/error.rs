// =============================================================================
// Engine errors
// =============================================================================
//
// Every failure the engine can report to a caller. None of these are fatal:
// the dispatcher turns them into a `success: false` envelope. Insufficient
// history is deliberately absent — it yields an all-undefined series instead.
// =============================================================================

use serde::Serialize;

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Machine-readable error category surfaced in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidInput,
    InvalidParameters,
    UnknownIndicator,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "InvalidInput"),
            Self::InvalidParameters => write!(f, "InvalidParameters"),
            Self::UnknownIndicator => write!(f, "UnknownIndicator"),
        }
    }
}

/// Top-level error returned by the normalizer, validator and dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The candle payload is missing, empty, or has an uncoercible field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A parameter failed its indicator-specific rule.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The requested indicator name is not in the registry.
    #[error("unknown indicator: {0}")]
    UnknownIndicator(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidParameters(_) => ErrorKind::InvalidParameters,
            Self::UnknownIndicator(_) => ErrorKind::UnknownIndicator,
        }
    }
}
