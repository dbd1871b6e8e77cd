use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use sha2::Digest;
use sha2::Sha256;
use uuid::Uuid;

use crate::user::models::UserId;
use crate::verification::errors::UsageError;

/// Workflow a verification token is restricted to.
///
/// A token issued for one usage can never complete another; presenting it to
/// the wrong workflow consumes and invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    ResetPassword,
    VerifyEmail,
}

impl Usage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Usage::ResetPassword => "reset_password",
            Usage::VerifyEmail => "verify_email",
        }
    }
}

impl FromStr for Usage {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset_password" => Ok(Usage::ResetPassword),
            "verify_email" => Ok(Usage::VerifyEmail),
            other => Err(UsageError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-use, purpose-scoped, time-boxed token for out-of-band flows.
///
/// The token string doubles as the storage primary key. At most one row
/// exists per (user, usage); issuing again replaces the outstanding one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub token: String,
    pub user_id: UserId,
    pub usage: Usage,
    pub expires_at: DateTime<Utc>,
}

impl Verification {
    /// Issue a fresh verification token for the given workflow.
    ///
    /// The token is the hex SHA-256 digest of a random UUID: 64 hex
    /// characters, URL-safe, with negligible collision probability.
    pub fn issue(user_id: UserId, usage: Usage, ttl: Duration) -> Self {
        let digest = Sha256::digest(Uuid::new_v4().as_bytes());

        Self {
            token: hex::encode(digest),
            user_id,
            usage,
            expires_at: Utc::now() + ttl,
        }
    }

    /// Check whether the token is expired at the given instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Issued-token payload handed to the caller for out-of-band delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationTicket {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&Verification> for VerificationTicket {
    fn from(verification: &Verification) -> Self {
        Self {
            token: verification.token.clone(),
            expires_at: verification.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_round_trip() {
        for usage in [Usage::ResetPassword, Usage::VerifyEmail] {
            assert_eq!(Usage::from_str(usage.as_str()), Ok(usage));
        }
        assert!(matches!(
            Usage::from_str("mfa"),
            Err(UsageError::Unknown(_))
        ));
    }

    #[test]
    fn test_issue_token_shape() {
        let verification =
            Verification::issue(UserId::new(), Usage::VerifyEmail, Duration::minutes(15));

        assert_eq!(verification.token.len(), 64);
        assert!(verification
            .token
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_issued_tokens_are_unique() {
        let user_id = UserId::new();
        let a = Verification::issue(user_id, Usage::VerifyEmail, Duration::minutes(15));
        let b = Verification::issue(user_id, Usage::VerifyEmail, Duration::minutes(15));

        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_is_expired() {
        let verification =
            Verification::issue(UserId::new(), Usage::ResetPassword, Duration::minutes(15));

        assert!(!verification.is_expired(Utc::now()));
        assert!(verification.is_expired(verification.expires_at + Duration::seconds(1)));
    }
}
