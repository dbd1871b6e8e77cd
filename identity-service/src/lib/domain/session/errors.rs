use thiserror::Error;

/// Error for CredentialId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for session lifecycle operations.
///
/// Raw storage errors are classified exactly once at the repository boundary
/// (no-rows, unique-constraint violation, opaque failure) and surface here;
/// the session service never branches on `sqlx::Error`.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// Unknown email or password mismatch. Deliberately indistinguishable so
    /// the login path is not an account enumeration oracle.
    #[error("Invalid credentials")]
    AuthenticationFailed,

    /// Token failed signature validation or does not have the expected
    /// claims shape.
    #[error("Malformed token")]
    TokenMalformed,

    /// The session's refresh token is past its expiry; the caller must log
    /// in again.
    #[error("Refresh token expired")]
    TokenExpired,

    /// No credential row matches the presented session id.
    #[error("Session not found")]
    SessionNotFound,

    /// Unique-constraint violation. On the refresh path this means a
    /// concurrent refresh won the access-token-id swap; retriable.
    #[error("Conflicting session state")]
    Conflict,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        SessionError::Internal(err.to_string())
    }
}
