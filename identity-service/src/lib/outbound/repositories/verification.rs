use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::bounded;
use crate::user::models::UserId;
use crate::verification::errors::VerificationError;
use crate::verification::models::Usage;
use crate::verification::models::Verification;
use crate::verification::ports::VerificationRepository;

pub struct PostgresVerificationRepository {
    pool: PgPool,
}

impl PostgresVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VerificationRow {
    token: String,
    user_id: Uuid,
    usage: String,
    expires_at: DateTime<Utc>,
}

impl TryFrom<VerificationRow> for Verification {
    type Error = VerificationError;

    fn try_from(row: VerificationRow) -> Result<Self, Self::Error> {
        Ok(Verification {
            token: row.token,
            user_id: UserId(row.user_id),
            usage: Usage::from_str(&row.usage)?,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl VerificationRepository for PostgresVerificationRepository {
    async fn upsert(&self, verification: Verification) -> Result<Verification, VerificationError> {
        // One outstanding token per (user, usage): a reissue replaces the
        // previous row in place, token and expiry included
        bounded(
            sqlx::query(
                r#"
                INSERT INTO verifications (token, user_id, usage, expires_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, usage)
                DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at
                "#,
            )
            .bind(&verification.token)
            .bind(verification.user_id.0)
            .bind(verification.usage.as_str())
            .bind(verification.expires_at)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| VerificationError::Internal(e.to_string()))?;

        Ok(verification)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Verification>, VerificationError> {
        let row = bounded(
            sqlx::query_as::<_, VerificationRow>(
                r#"
                SELECT token, user_id, usage, expires_at
                FROM verifications
                WHERE token = $1
                "#,
            )
            .bind(token)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|e| VerificationError::Internal(e.to_string()))?;

        row.map(Verification::try_from).transpose()
    }

    async fn remove(&self, token: &str) -> Result<(), VerificationError> {
        // Zero affected rows is fine: a concurrent consume already won
        bounded(
            sqlx::query(
                r#"
                DELETE FROM verifications
                WHERE token = $1
                "#,
            )
            .bind(token)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| VerificationError::Internal(e.to_string()))?;

        Ok(())
    }
}
