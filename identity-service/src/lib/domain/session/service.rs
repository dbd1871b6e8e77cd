use std::sync::Arc;

use async_trait::async_trait;
use auth::AccessClaims;
use auth::JwtError;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::RefreshClaims;
use chrono::Duration;
use uuid::Uuid;

use crate::session::errors::SessionError;
use crate::session::models::Credential;
use crate::session::models::CredentialId;
use crate::session::models::SessionSummary;
use crate::session::models::TokenPair;
use crate::session::ports::CredentialRepository;
use crate::session::ports::SessionServicePort;
use crate::user::errors::UserError;
use crate::user::models::User;
use crate::user::models::UserId;
use crate::user::ports::UserDirectory;

/// Token issuance parameters, injected at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl From<&crate::config::JwtConfig> for SessionConfig {
    fn from(config: &crate::config::JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }
}

/// Domain service for login, refresh rotation, and revocation.
///
/// Holds no session state of its own; everything revocable lives behind the
/// credential repository.
pub struct SessionService<CR, UD>
where
    CR: CredentialRepository,
    UD: UserDirectory,
{
    credentials: Arc<CR>,
    users: Arc<UD>,
    password_hasher: PasswordHasher,
    jwt: JwtHandler,
    config: SessionConfig,
}

impl<CR, UD> SessionService<CR, UD>
where
    CR: CredentialRepository,
    UD: UserDirectory,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `credentials` - Credential persistence implementation
    /// * `users` - User directory implementation
    /// * `secret` - Token signing secret
    /// * `config` - Issuer and token lifetimes
    pub fn new(credentials: Arc<CR>, users: Arc<UD>, secret: &[u8], config: SessionConfig) -> Self {
        Self {
            credentials,
            users,
            password_hasher: PasswordHasher::new(),
            jwt: JwtHandler::new(secret),
            config,
        }
    }

    fn resolve_user(&self, result: Result<Option<User>, UserError>) -> Result<User, SessionError> {
        result
            .map_err(|e| SessionError::Internal(e.to_string()))?
            .ok_or(SessionError::AuthenticationFailed)
    }
}

#[async_trait]
impl<CR, UD> SessionServicePort for SessionService<CR, UD>
where
    CR: CredentialRepository,
    UD: UserDirectory,
{
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
        device_name: &str,
    ) -> Result<TokenPair, SessionError> {
        let user = self.resolve_user(self.users.find_user_by_email(email).await)?;

        let password_matches = self
            .password_hasher
            .verify(password, &user.password_hash)
            .map_err(|e| SessionError::Internal(e.to_string()))?;
        if !password_matches {
            return Err(SessionError::AuthenticationFailed);
        }

        let refresh_claims = RefreshClaims::with_ttl(self.config.refresh_ttl, &self.config.issuer);
        let refresh_token = self
            .jwt
            .encode(&refresh_claims)
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        let access_claims = AccessClaims::new(
            user.id.0,
            user.username.as_str().to_string(),
            user.role.as_str().to_string(),
            self.config.access_ttl,
            &self.config.issuer,
        );
        let access_token = self
            .jwt
            .encode(&access_claims)
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        let credential = Credential::new(
            user.id,
            device_name.to_string(),
            access_claims.sid,
            refresh_token.clone(),
        );
        let credential = self.credentials.create(credential).await?;

        tracing::info!(
            user_id = %user.id,
            credential_id = %credential.id,
            device = device_name,
            "session opened"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn refresh_token(&self, access_token: &str) -> Result<String, SessionError> {
        // The access token may be past its own expiry here; only its
        // signature and shape are checked.
        let claims: AccessClaims = self
            .jwt
            .decode_ignoring_expiry(access_token)
            .map_err(|_| SessionError::TokenMalformed)?;

        let credential = self
            .credentials
            .find_by_access_token_id(&claims.sid)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        match self.jwt.decode::<RefreshClaims>(&credential.refresh_token) {
            Ok(_) => {}
            Err(JwtError::TokenExpired) => {
                // Best effort: the session is dead either way, the caller
                // must log in again.
                if let Err(e) = self
                    .credentials
                    .remove(&credential.user_id, &credential.id)
                    .await
                {
                    tracing::warn!(
                        credential_id = %credential.id,
                        error = %e,
                        "failed to remove credential with expired refresh token"
                    );
                }
                tracing::info!(
                    user_id = %credential.user_id,
                    credential_id = %credential.id,
                    "refresh token expired, session closed"
                );
                return Err(SessionError::TokenExpired);
            }
            Err(_) => return Err(SessionError::TokenMalformed),
        }

        let rotated = claims.rotated(self.config.access_ttl);
        let new_access_token = self
            .jwt
            .encode(&rotated)
            .map_err(|e| SessionError::Internal(e.to_string()))?;

        self.credentials
            .update_access_token_id(&credential.id, &rotated.sid)
            .await?;

        tracing::debug!(
            user_id = %credential.user_id,
            credential_id = %credential.id,
            "access token rotated"
        );

        Ok(new_access_token)
    }

    async fn logout(
        &self,
        user_id: &UserId,
        credential_id: &CredentialId,
    ) -> Result<(), SessionError> {
        self.credentials.remove(user_id, credential_id).await?;
        tracing::info!(user_id = %user_id, credential_id = %credential_id, "session revoked");
        Ok(())
    }

    async fn self_logout(
        &self,
        user_id: &UserId,
        access_token_id: &Uuid,
    ) -> Result<(), SessionError> {
        self.credentials
            .remove_by_access_token_id(user_id, access_token_id)
            .await?;
        tracing::info!(user_id = %user_id, "session revoked by owner");
        Ok(())
    }

    async fn logout_all_devices(&self, user_id: &UserId) -> Result<(), SessionError> {
        self.credentials.remove_user_credentials(user_id).await?;
        tracing::info!(user_id = %user_id, "all sessions revoked");
        Ok(())
    }

    async fn get_credentials(&self, user_id: &UserId) -> Result<Vec<SessionSummary>, SessionError> {
        let credentials = self.credentials.find_user_credentials(user_id).await?;
        Ok(credentials.iter().map(SessionSummary::from).collect())
    }
}
