use thiserror::Error;

/// Error for Usage parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Unknown verification usage: {0}")]
    Unknown(String),
}

/// Top-level error for verification token operations.
///
/// NotFound, Expired, and Misuse stay distinct on purpose: the caller can
/// tell the user whether to re-request a token or check the link they used.
#[derive(Debug, Clone, Error)]
pub enum VerificationError {
    #[error("Verification token not found")]
    NotFound,

    #[error("Verification token expired")]
    Expired,

    #[error("Verification token used for the wrong purpose")]
    Misuse,

    #[error("Invalid usage: {0}")]
    InvalidUsage(#[from] UsageError),

    #[error("Internal error: {0}")]
    Internal(String),
}
