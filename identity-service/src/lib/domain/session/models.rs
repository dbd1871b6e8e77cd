use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::session::errors::CredentialIdError;
use crate::user::models::UserId;

/// Credential unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CredentialId(pub Uuid);

impl CredentialId {
    /// Generate a new random credential ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a credential ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, CredentialIdError> {
        Uuid::parse_str(s)
            .map(CredentialId)
            .map_err(|e| CredentialIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for CredentialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Server-side record of one active login session bound to one device.
///
/// `access_token_id` is globally unique and joins the stateless signed access
/// token to this revocable row. It is swapped on every refresh; the row
/// identity never changes. The stored refresh token bounds the session's
/// total lifetime.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: CredentialId,
    pub user_id: UserId,
    pub device_name: String,
    pub access_token_id: Uuid,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential for a freshly authenticated session.
    pub fn new(
        user_id: UserId,
        device_name: String,
        access_token_id: Uuid,
        refresh_token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CredentialId::new(),
            user_id,
            device_name,
            access_token_id,
            refresh_token,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Signed token pair returned on successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Read model for self-service device management listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: CredentialId,
    pub device_name: String,
}

impl From<&Credential> for SessionSummary {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id,
            device_name: credential.device_name.clone(),
        }
    }
}
