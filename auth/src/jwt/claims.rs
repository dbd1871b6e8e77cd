use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Standard RFC 7519 time and issuer claims shared by every token kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredClaims {
    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl RegisteredClaims {
    /// Build time claims anchored at the current instant.
    ///
    /// # Arguments
    /// * `ttl` - Time until the token expires
    /// * `issuer` - Issuer string embedded in the token
    pub fn with_ttl(ttl: Duration, issuer: &str) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
            iss: issuer.to_string(),
        }
    }
}

/// Claims carried by a short-lived access token.
///
/// `sid` is the session id: a random identifier minted per issuance and
/// stored server-side next to the credential row. It is the only linkage
/// that lets the server revoke an otherwise stateless signed token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,

    /// Random session id, unique per issued access token
    pub sid: Uuid,

    /// Subject (user identifier)
    pub sub: Uuid,

    pub username: String,

    pub role: String,
}

impl AccessClaims {
    /// Mint claims for a new session with a fresh random session id.
    ///
    /// # Arguments
    /// * `user_id` - Authenticated user's identifier
    /// * `username` - Username embedded for display purposes
    /// * `role` - Role string embedded for authorization
    /// * `ttl` - Access token lifetime
    /// * `issuer` - Issuer string
    pub fn new(user_id: Uuid, username: String, role: String, ttl: Duration, issuer: &str) -> Self {
        Self {
            registered: RegisteredClaims::with_ttl(ttl, issuer),
            sid: Uuid::new_v4(),
            sub: user_id,
            username,
            role,
        }
    }

    /// Claims for the same identity under a fresh session id.
    ///
    /// Used on refresh: the identity fields are carried over, the session id
    /// and time claims are reissued.
    pub fn rotated(&self, ttl: Duration) -> Self {
        Self {
            registered: RegisteredClaims::with_ttl(ttl, &self.registered.iss),
            sid: Uuid::new_v4(),
            sub: self.sub,
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// Claims carried by a long-lived refresh token.
///
/// Carries only the registered time claims; its expiry bounds how long the
/// session can keep refreshing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
}

impl RefreshClaims {
    /// Build refresh claims anchored at the current instant.
    pub fn with_ttl(ttl: Duration, issuer: &str) -> Self {
        Self {
            registered: RegisteredClaims::with_ttl(ttl, issuer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_ttl_time_claims() {
        let claims = RegisteredClaims::with_ttl(Duration::minutes(15), "identity-service");

        assert_eq!(claims.iss, "identity-service");
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_access_claims_fresh_session_id() {
        let user_id = Uuid::new_v4();
        let a = AccessClaims::new(
            user_id,
            "alice".to_string(),
            "reader".to_string(),
            Duration::minutes(15),
            "test",
        );
        let b = AccessClaims::new(
            user_id,
            "alice".to_string(),
            "reader".to_string(),
            Duration::minutes(15),
            "test",
        );

        assert_ne!(a.sid, b.sid);
    }

    #[test]
    fn test_rotated_keeps_identity_changes_session() {
        let claims = AccessClaims::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "admin".to_string(),
            Duration::minutes(15),
            "test",
        );

        let rotated = claims.rotated(Duration::minutes(15));

        assert_ne!(rotated.sid, claims.sid);
        assert_eq!(rotated.sub, claims.sub);
        assert_eq!(rotated.username, claims.username);
        assert_eq!(rotated.role, claims.role);
        assert_eq!(rotated.registered.iss, claims.registered.iss);
    }

    #[test]
    fn test_flattened_serialization() {
        let claims = AccessClaims::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "reader".to_string(),
            Duration::minutes(15),
            "test",
        );

        let json = serde_json::to_value(&claims).expect("serialization failed");

        // Registered claims flatten to the top level of the token payload
        assert!(json.get("exp").is_some());
        assert!(json.get("iat").is_some());
        assert!(json.get("sid").is_some());
        assert!(json.get("registered").is_none());
    }
}
