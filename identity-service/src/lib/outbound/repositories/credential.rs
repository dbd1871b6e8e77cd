use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::bounded;
use super::StoreFailure;
use crate::session::errors::SessionError;
use crate::session::models::Credential;
use crate::session::models::CredentialId;
use crate::session::ports::CredentialRepository;
use crate::user::models::UserId;

pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: Uuid,
    user_id: Uuid,
    device_name: String,
    access_token_id: Uuid,
    refresh_token: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CredentialRow> for Credential {
    fn from(row: CredentialRow) -> Self {
        Credential {
            id: CredentialId(row.id),
            user_id: UserId(row.user_id),
            device_name: row.device_name,
            access_token_id: row.access_token_id,
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn classify(failure: StoreFailure) -> SessionError {
    if failure.is_unique_violation() {
        SessionError::Conflict
    } else {
        SessionError::Internal(failure.to_string())
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn create(&self, credential: Credential) -> Result<Credential, SessionError> {
        bounded(
            sqlx::query(
                r#"
                INSERT INTO credentials
                    (id, user_id, device_name, access_token_id, refresh_token, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(credential.id.0)
            .bind(credential.user_id.0)
            .bind(&credential.device_name)
            .bind(credential.access_token_id)
            .bind(&credential.refresh_token)
            .bind(credential.created_at)
            .bind(credential.updated_at)
            .execute(&self.pool),
        )
        .await
        .map_err(classify)?;

        Ok(credential)
    }

    async fn find_by_access_token_id(
        &self,
        access_token_id: &Uuid,
    ) -> Result<Option<Credential>, SessionError> {
        let row = bounded(
            sqlx::query_as::<_, CredentialRow>(
                r#"
                SELECT id, user_id, device_name, access_token_id, refresh_token,
                       created_at, updated_at
                FROM credentials
                WHERE access_token_id = $1
                "#,
            )
            .bind(access_token_id)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|e| SessionError::Internal(e.to_string()))?;

        Ok(row.map(Credential::from))
    }

    async fn update_access_token_id(
        &self,
        credential_id: &CredentialId,
        access_token_id: &Uuid,
    ) -> Result<(), SessionError> {
        let result = bounded(
            sqlx::query(
                r#"
                UPDATE credentials
                SET access_token_id = $2, updated_at = $3
                WHERE id = $1
                "#,
            )
            .bind(credential_id.0)
            .bind(access_token_id)
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await
        .map_err(classify)?;

        if result.rows_affected() == 0 {
            return Err(SessionError::SessionNotFound);
        }

        Ok(())
    }

    async fn find_user_credentials(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Credential>, SessionError> {
        let rows = bounded(
            sqlx::query_as::<_, CredentialRow>(
                r#"
                SELECT id, user_id, device_name, access_token_id, refresh_token,
                       created_at, updated_at
                FROM credentials
                WHERE user_id = $1
                ORDER BY created_at
                "#,
            )
            .bind(user_id.0)
            .fetch_all(&self.pool),
        )
        .await
        .map_err(|e| SessionError::Internal(e.to_string()))?;

        Ok(rows.into_iter().map(Credential::from).collect())
    }

    async fn remove(
        &self,
        user_id: &UserId,
        credential_id: &CredentialId,
    ) -> Result<(), SessionError> {
        let result = bounded(
            sqlx::query(
                r#"
                DELETE FROM credentials
                WHERE id = $1 AND user_id = $2
                "#,
            )
            .bind(credential_id.0)
            .bind(user_id.0)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| SessionError::Internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::SessionNotFound);
        }

        Ok(())
    }

    async fn remove_by_access_token_id(
        &self,
        user_id: &UserId,
        access_token_id: &Uuid,
    ) -> Result<(), SessionError> {
        let result = bounded(
            sqlx::query(
                r#"
                DELETE FROM credentials
                WHERE access_token_id = $1 AND user_id = $2
                "#,
            )
            .bind(access_token_id)
            .bind(user_id.0)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| SessionError::Internal(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::SessionNotFound);
        }

        Ok(())
    }

    async fn remove_user_credentials(&self, user_id: &UserId) -> Result<(), SessionError> {
        // Zero affected rows is fine: the user simply had no open sessions
        bounded(
            sqlx::query(
                r#"
                DELETE FROM credentials
                WHERE user_id = $1
                "#,
            )
            .bind(user_id.0)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| SessionError::Internal(e.to_string()))?;

        Ok(())
    }
}
