use async_trait::async_trait;

use crate::user::models::UserId;
use crate::verification::errors::VerificationError;
use crate::verification::models::Usage;
use crate::verification::models::Verification;
use crate::verification::models::VerificationTicket;

/// Port for verification token lifecycle operations.
#[async_trait]
pub trait VerificationServicePort: Send + Sync + 'static {
    /// Issue a verification token for the given workflow.
    ///
    /// Replaces any outstanding token for the same (user, usage); delivery
    /// of the returned ticket is the caller's responsibility.
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn request(
        &self,
        user_id: &UserId,
        usage: Usage,
    ) -> Result<VerificationTicket, VerificationError>;

    /// Consume a verification token presented by a workflow.
    ///
    /// Every outcome is terminal: whether the token is accepted, expired, or
    /// presented to the wrong workflow, its row is removed.
    ///
    /// # Returns
    /// The user the token was issued for
    ///
    /// # Errors
    /// * `NotFound` - Unknown or already-consumed token
    /// * `Expired` - Token past its expiry
    /// * `Misuse` - Token issued for a different usage
    /// * `Internal` - Storage operation failed
    async fn consume(&self, token: &str, usage: Usage) -> Result<UserId, VerificationError>;
}

/// Persistence operations for verification tokens.
///
/// Keyed by the token string; at most one row per (user, usage), enforced by
/// the store's upsert-on-conflict.
#[async_trait]
pub trait VerificationRepository: Send + Sync + 'static {
    /// Insert the verification, replacing any outstanding row for the same
    /// (user, usage).
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn upsert(&self, verification: Verification) -> Result<Verification, VerificationError>;

    /// Point lookup by token string.
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn find_by_token(&self, token: &str) -> Result<Option<Verification>, VerificationError>;

    /// Delete the row for this token. Succeeds when it is already gone.
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn remove(&self, token: &str) -> Result<(), VerificationError>;
}
