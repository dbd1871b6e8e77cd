use async_trait::async_trait;
use uuid::Uuid;

use crate::session::errors::SessionError;
use crate::session::models::Credential;
use crate::session::models::CredentialId;
use crate::session::models::SessionSummary;
use crate::session::models::TokenPair;
use crate::user::models::UserId;

/// Port for session lifecycle operations.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Authenticate a user and open a new session for one device.
    ///
    /// # Arguments
    /// * `email` - Login email
    /// * `password` - Plaintext password
    /// * `device_name` - Device the session is bound to
    ///
    /// # Returns
    /// Signed access/refresh token pair
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Unknown email or password mismatch
    /// * `Conflict` - Credential persistence hit a unique constraint
    /// * `Internal` - Storage or signing failure
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        device_name: &str,
    ) -> Result<TokenPair, SessionError>;

    /// Exchange an access token for a freshly rotated one.
    ///
    /// The access token is accepted even past its own expiry; refresh
    /// validity is governed by the stored refresh token. On success the
    /// session's access token id is swapped, so the old token no longer
    /// resolves to a session.
    ///
    /// # Errors
    /// * `TokenMalformed` - Access token or stored refresh token fails
    ///   signature/shape validation
    /// * `SessionNotFound` - No credential for the embedded session id
    /// * `TokenExpired` - Stored refresh token expired (credential removed)
    /// * `Conflict` - A concurrent refresh won the swap; retriable
    async fn refresh_token(&self, access_token: &str) -> Result<String, SessionError>;

    /// Revoke one session by credential id.
    ///
    /// # Errors
    /// * `SessionNotFound` - No such credential for this user
    async fn logout(&self, user_id: &UserId, credential_id: &CredentialId)
        -> Result<(), SessionError>;

    /// Revoke the session behind the presented access token id.
    ///
    /// # Errors
    /// * `SessionNotFound` - No such session for this user
    async fn self_logout(&self, user_id: &UserId, access_token_id: &Uuid)
        -> Result<(), SessionError>;

    /// Revoke every session of the user.
    async fn logout_all_devices(&self, user_id: &UserId) -> Result<(), SessionError>;

    /// List the user's active sessions for device management.
    async fn get_credentials(&self, user_id: &UserId) -> Result<Vec<SessionSummary>, SessionError>;
}

/// Persistence operations for credentials.
///
/// One row per active session/device. Conflicting concurrent mutations are
/// arbitrated by the store's unique constraint on `access_token_id`; this
/// port takes no application-level locks.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Persist a new credential.
    ///
    /// # Errors
    /// * `Conflict` - Duplicate credential id or access token id
    /// * `Internal` - Storage operation failed
    async fn create(&self, credential: Credential) -> Result<Credential, SessionError>;

    /// Point lookup by access token id; hit on every refresh.
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn find_by_access_token_id(
        &self,
        access_token_id: &Uuid,
    ) -> Result<Option<Credential>, SessionError>;

    /// Atomically swap the credential's access token id.
    ///
    /// # Errors
    /// * `Conflict` - The new id is already in use
    /// * `SessionNotFound` - The credential row no longer exists
    /// * `Internal` - Storage operation failed
    async fn update_access_token_id(
        &self,
        credential_id: &CredentialId,
        access_token_id: &Uuid,
    ) -> Result<(), SessionError>;

    /// All credentials belonging to a user.
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn find_user_credentials(&self, user_id: &UserId)
        -> Result<Vec<Credential>, SessionError>;

    /// Delete one credential, guarded by the owning user id.
    ///
    /// # Errors
    /// * `SessionNotFound` - No row matched both identifiers
    /// * `Internal` - Storage operation failed
    async fn remove(
        &self,
        user_id: &UserId,
        credential_id: &CredentialId,
    ) -> Result<(), SessionError>;

    /// Delete one credential by access token id, guarded by the owning user id.
    ///
    /// # Errors
    /// * `SessionNotFound` - No row matched both identifiers
    /// * `Internal` - Storage operation failed
    async fn remove_by_access_token_id(
        &self,
        user_id: &UserId,
        access_token_id: &Uuid,
    ) -> Result<(), SessionError>;

    /// Delete every credential of a user. Succeeds when none exist.
    ///
    /// # Errors
    /// * `Internal` - Storage operation failed
    async fn remove_user_credentials(&self, user_id: &UserId) -> Result<(), SessionError>;
}
