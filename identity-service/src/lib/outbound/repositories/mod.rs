use std::fmt;
use std::future::Future;
use std::time::Duration;

pub mod credential;
pub mod user;
pub mod verification;

pub use credential::PostgresCredentialRepository;
pub use user::PostgresUserDirectory;
pub use verification::PostgresVerificationRepository;

/// Upper bound on any single storage call.
///
/// Every mutation in this store touches a single row, so a timed-out call
/// needs no compensating rollback.
const STATEMENT_DEADLINE: Duration = Duration::from_secs(5);

/// Storage failure before domain classification.
///
/// Repositories classify this exactly once into their domain error type;
/// services never see it.
#[derive(Debug)]
pub(crate) enum StoreFailure {
    Sqlx(sqlx::Error),
    DeadlineExceeded,
}

impl StoreFailure {
    pub(crate) fn is_unique_violation(&self) -> bool {
        match self {
            StoreFailure::Sqlx(e) => e
                .as_database_error()
                .map_or(false, |db_err| db_err.is_unique_violation()),
            StoreFailure::DeadlineExceeded => false,
        }
    }
}

impl fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFailure::Sqlx(e) => e.fmt(f),
            StoreFailure::DeadlineExceeded => f.write_str("statement deadline exceeded"),
        }
    }
}

/// Run a storage call under the statement deadline.
pub(crate) async fn bounded<T>(
    fut: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, StoreFailure> {
    match tokio::time::timeout(STATEMENT_DEADLINE, fut).await {
        Ok(result) => result.map_err(StoreFailure::Sqlx),
        Err(_) => Err(StoreFailure::DeadlineExceeded),
    }
}
