use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use chrono::Utc;

use crate::user::models::UserId;
use crate::verification::errors::VerificationError;
use crate::verification::models::Usage;
use crate::verification::models::Verification;
use crate::verification::models::VerificationTicket;
use crate::verification::ports::VerificationRepository;
use crate::verification::ports::VerificationServicePort;

/// Terminal transition of a pending verification.
///
/// Whatever the outcome, the row is removed; only the payload returned to
/// the caller differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Consumed(UserId),
    Expired,
    Misused,
}

impl Outcome {
    fn of(verification: &Verification, requested: Usage) -> Self {
        // Expiry dominates: an expired token reports Expired even when the
        // usage would not have matched either.
        if verification.is_expired(Utc::now()) {
            Outcome::Expired
        } else if verification.usage != requested {
            Outcome::Misused
        } else {
            Outcome::Consumed(verification.user_id)
        }
    }
}

/// Domain service for issuing and consuming verification tokens.
pub struct VerificationService<VR>
where
    VR: VerificationRepository,
{
    repository: Arc<VR>,
    ttl: Duration,
}

impl<VR> VerificationService<VR>
where
    VR: VerificationRepository,
{
    /// Create a new verification service.
    ///
    /// # Arguments
    /// * `repository` - Verification persistence implementation
    /// * `ttl` - Lifetime of issued tokens
    pub fn new(repository: Arc<VR>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }
}

#[async_trait]
impl<VR> VerificationServicePort for VerificationService<VR>
where
    VR: VerificationRepository,
{
    async fn request(
        &self,
        user_id: &UserId,
        usage: Usage,
    ) -> Result<VerificationTicket, VerificationError> {
        let verification = Verification::issue(*user_id, usage, self.ttl);
        let stored = self.repository.upsert(verification).await?;

        tracing::info!(
            user_id = %user_id,
            usage = %usage,
            expires_at = %stored.expires_at,
            "verification token issued"
        );

        Ok(VerificationTicket::from(&stored))
    }

    async fn consume(&self, token: &str, usage: Usage) -> Result<UserId, VerificationError> {
        let verification = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(VerificationError::NotFound)?;

        let outcome = Outcome::of(&verification, usage);

        // Every terminal transition removes the row: consumed, expired, and
        // misused tokens are all single-shot.
        self.repository.remove(token).await?;

        match outcome {
            Outcome::Consumed(user_id) => {
                tracing::info!(user_id = %user_id, usage = %usage, "verification token consumed");
                Ok(user_id)
            }
            Outcome::Expired => {
                tracing::info!(user_id = %verification.user_id, usage = %usage, "expired verification token discarded");
                Err(VerificationError::Expired)
            }
            Outcome::Misused => {
                tracing::warn!(
                    user_id = %verification.user_id,
                    issued_for = %verification.usage,
                    presented_for = %usage,
                    "verification token presented to the wrong workflow"
                );
                Err(VerificationError::Misuse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use mockall::mock;

    use super::*;

    mock! {
        pub TestVerificationRepository {}

        #[async_trait]
        impl VerificationRepository for TestVerificationRepository {
            async fn upsert(&self, verification: Verification) -> Result<Verification, VerificationError>;
            async fn find_by_token(&self, token: &str) -> Result<Option<Verification>, VerificationError>;
            async fn remove(&self, token: &str) -> Result<(), VerificationError>;
        }
    }

    /// In-memory stand-in honoring the store contract: token-keyed rows with
    /// at most one row per (user, usage).
    #[derive(Default)]
    struct InMemoryVerificationRepository {
        rows: Mutex<HashMap<String, Verification>>,
    }

    #[async_trait]
    impl VerificationRepository for InMemoryVerificationRepository {
        async fn upsert(
            &self,
            verification: Verification,
        ) -> Result<Verification, VerificationError> {
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|_, v| {
                !(v.user_id == verification.user_id && v.usage == verification.usage)
            });
            rows.insert(verification.token.clone(), verification.clone());
            Ok(verification)
        }

        async fn find_by_token(
            &self,
            token: &str,
        ) -> Result<Option<Verification>, VerificationError> {
            Ok(self.rows.lock().unwrap().get(token).cloned())
        }

        async fn remove(&self, token: &str) -> Result<(), VerificationError> {
            self.rows.lock().unwrap().remove(token);
            Ok(())
        }
    }

    fn service_with_fake() -> VerificationService<InMemoryVerificationRepository> {
        VerificationService::new(
            Arc::new(InMemoryVerificationRepository::default()),
            Duration::minutes(15),
        )
    }

    #[tokio::test]
    async fn test_request_issues_ticket() {
        let mut repository = MockTestVerificationRepository::new();
        let user_id = UserId::new();

        repository
            .expect_upsert()
            .withf(move |v| v.user_id == user_id && v.usage == Usage::VerifyEmail)
            .times(1)
            .returning(|v| Ok(v));

        let service = VerificationService::new(Arc::new(repository), Duration::minutes(15));

        let ticket = service
            .request(&user_id, Usage::VerifyEmail)
            .await
            .expect("request failed");
        assert_eq!(ticket.token.len(), 64);
        assert!(ticket.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_consume_unknown_token() {
        let mut repository = MockTestVerificationRepository::new();

        repository
            .expect_find_by_token()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_remove().times(0);

        let service = VerificationService::new(Arc::new(repository), Duration::minutes(15));

        let result = service.consume("deadbeef", Usage::VerifyEmail).await;
        assert!(matches!(result, Err(VerificationError::NotFound)));
    }

    #[tokio::test]
    async fn test_consume_expired_token_removes_row() {
        let mut repository = MockTestVerificationRepository::new();

        let mut verification =
            Verification::issue(UserId::new(), Usage::ResetPassword, Duration::minutes(15));
        verification.expires_at = Utc::now() - Duration::minutes(1);
        let token = verification.token.clone();

        let returned = verification.clone();
        repository
            .expect_find_by_token()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        let expected_token = token.clone();
        repository
            .expect_remove()
            .withf(move |t| t == expected_token)
            .times(1)
            .returning(|_| Ok(()));

        let service = VerificationService::new(Arc::new(repository), Duration::minutes(15));

        // Expiry dominates even though the usage does not match either
        let result = service.consume(&token, Usage::VerifyEmail).await;
        assert!(matches!(result, Err(VerificationError::Expired)));
    }

    #[tokio::test]
    async fn test_consume_misused_token_removes_row() {
        let mut repository = MockTestVerificationRepository::new();

        let verification =
            Verification::issue(UserId::new(), Usage::VerifyEmail, Duration::minutes(15));
        let token = verification.token.clone();

        let returned = verification.clone();
        repository
            .expect_find_by_token()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        repository.expect_remove().times(1).returning(|_| Ok(()));

        let service = VerificationService::new(Arc::new(repository), Duration::minutes(15));

        let result = service.consume(&token, Usage::ResetPassword).await;
        assert!(matches!(result, Err(VerificationError::Misuse)));
    }

    #[tokio::test]
    async fn test_single_use_consumption() {
        let service = service_with_fake();
        let user_id = UserId::new();

        let ticket = service
            .request(&user_id, Usage::VerifyEmail)
            .await
            .expect("request failed");

        let consumed = service
            .consume(&ticket.token, Usage::VerifyEmail)
            .await
            .expect("first consume failed");
        assert_eq!(consumed, user_id);

        let again = service.consume(&ticket.token, Usage::VerifyEmail).await;
        assert!(matches!(again, Err(VerificationError::NotFound)));
    }

    #[tokio::test]
    async fn test_usage_scoping_invalidates_token() {
        let service = service_with_fake();
        let user_id = UserId::new();

        let ticket = service
            .request(&user_id, Usage::VerifyEmail)
            .await
            .expect("request failed");

        let misused = service.consume(&ticket.token, Usage::ResetPassword).await;
        assert!(matches!(misused, Err(VerificationError::Misuse)));

        // The misuse consumed the token; the right workflow cannot use it
        // afterwards either
        let retry = service.consume(&ticket.token, Usage::VerifyEmail).await;
        assert!(matches!(retry, Err(VerificationError::NotFound)));
    }

    #[tokio::test]
    async fn test_single_outstanding_token_per_usage() {
        let service = service_with_fake();
        let user_id = UserId::new();

        let first = service
            .request(&user_id, Usage::ResetPassword)
            .await
            .expect("first request failed");
        let second = service
            .request(&user_id, Usage::ResetPassword)
            .await
            .expect("second request failed");
        assert_ne!(first.token, second.token);

        // Reissuing invalidated the first token before its natural expiry
        let stale = service.consume(&first.token, Usage::ResetPassword).await;
        assert!(matches!(stale, Err(VerificationError::NotFound)));

        let fresh = service
            .consume(&second.token, Usage::ResetPassword)
            .await
            .expect("fresh token rejected");
        assert_eq!(fresh, user_id);

        let replay = service.consume(&second.token, Usage::ResetPassword).await;
        assert!(matches!(replay, Err(VerificationError::NotFound)));
    }

    #[tokio::test]
    async fn test_tokens_for_different_usages_coexist() {
        let service = service_with_fake();
        let user_id = UserId::new();

        let reset = service
            .request(&user_id, Usage::ResetPassword)
            .await
            .expect("request failed");
        let verify = service
            .request(&user_id, Usage::VerifyEmail)
            .await
            .expect("request failed");

        // Different usages do not displace each other
        assert_eq!(
            service
                .consume(&reset.token, Usage::ResetPassword)
                .await
                .expect("reset token rejected"),
            user_id
        );
        assert_eq!(
            service
                .consume(&verify.token, Usage::VerifyEmail)
                .await
                .expect("verify token rejected"),
            user_id
        );
    }
}
