use async_trait::async_trait;

use crate::user::errors::UserError;
use crate::user::models::User;
use crate::user::models::UserId;

/// Read-only access to the user directory.
///
/// The directory itself (registration, profile updates) is an external
/// collaborator; the identity service only resolves users during login.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Retrieve a user by identifier.
    ///
    /// # Returns
    /// Optional user record (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve a user by email address.
    ///
    /// # Returns
    /// Optional user record (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Storage operation failed
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}
