//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for the identity service:
//! - Password hashing (Argon2id)
//! - JWT token generation and validation with strongly-typed claims
//!
//! Claims are plain records per token kind rather than dynamic claim maps, so
//! an unexpected token shape surfaces as a decode error instead of a failed
//! downcast at the call site.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{AccessClaims, JwtHandler};
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = AccessClaims::new(
//!     Uuid::new_v4(),
//!     "alice".to_string(),
//!     "reader".to_string(),
//!     Duration::minutes(15),
//!     "identity-service",
//! );
//! let token = handler.encode(&claims).unwrap();
//! let decoded: AccessClaims = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sid, claims.sid);
//! ```

pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use jwt::RegisteredClaims;
pub use password::PasswordError;
pub use password::PasswordHasher;
