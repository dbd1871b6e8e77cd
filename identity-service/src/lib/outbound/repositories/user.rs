use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::bounded;
use crate::user::errors::UserError;
use crate::user::models::EmailAddress;
use crate::user::models::Role;
use crate::user::models::User;
use crate::user::models::UserId;
use crate::user::models::Username;
use crate::user::ports::UserDirectory;

/// Read-only adapter over the `users` table.
///
/// Registration and profile management live elsewhere; this adapter only
/// resolves identities during login.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = bounded(
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, username, email, password_hash, role, created_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(id.0)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let row = bounded(
            sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, username, email, password_hash, role, created_at
                FROM users
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }
}
