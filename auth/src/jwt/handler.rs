use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type so each token kind keeps its own payload
/// record. Uses HS256 (HMAC with SHA-256).
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// The secret should be at least 256 bits for HS256 and come from
    /// configuration, never from code.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token, enforcing expiry.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its `exp` claim
    /// * `DecodingFailed` - Signature is invalid or the payload does not
    ///   match the expected claims shape
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let validation = Validation::new(self.algorithm);

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::DecodingFailed(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Decode and validate a JWT token without enforcing expiry.
    ///
    /// The signature is still verified. Used on the refresh path, where an
    /// access token is exchanged even past its own expiry: refresh validity
    /// is governed by the refresh token, not the access token.
    ///
    /// # Errors
    /// * `DecodingFailed` - Signature is invalid or the payload does not
    ///   match the expected claims shape
    pub fn decode_ignoring_expiry<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<T>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::DecodingFailed(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::jwt::claims::AccessClaims;
    use crate::jwt::claims::RefreshClaims;

    fn handler() -> JwtHandler {
        JwtHandler::new(b"my_secret_key_at_least_32_bytes_long!")
    }

    fn access_claims(ttl: Duration) -> AccessClaims {
        AccessClaims::new(
            Uuid::new_v4(),
            "alice".to_string(),
            "reader".to_string(),
            ttl,
            "test",
        )
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = handler();
        let claims = access_claims(Duration::minutes(15));

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: AccessClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_invalid_token() {
        let result = handler().decode::<AccessClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .encode(&access_claims(Duration::minutes(15)))
            .expect("Failed to encode token");

        let result = handler2.decode::<AccessClaims>(&token);
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_decode_expired_token() {
        let handler = handler();
        // Past the default validation leeway
        let claims = access_claims(Duration::hours(-2));

        let token = handler.encode(&claims).expect("Failed to encode token");

        let result = handler.decode::<AccessClaims>(&token);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_decode_ignoring_expiry() {
        let handler = handler();
        let claims = access_claims(Duration::hours(-2));

        let token = handler.encode(&claims).expect("Failed to encode token");

        let decoded: AccessClaims = handler
            .decode_ignoring_expiry(&token)
            .expect("Failed to decode expired token");
        assert_eq!(decoded.sid, claims.sid);
    }

    #[test]
    fn test_decode_ignoring_expiry_still_checks_signature() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .encode(&access_claims(Duration::minutes(15)))
            .expect("Failed to encode token");

        let result = handler2.decode_ignoring_expiry::<AccessClaims>(&token);
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_decode_wrong_claims_shape() {
        let handler = handler();
        let refresh = RefreshClaims::with_ttl(Duration::days(7), "test");

        let token = handler.encode(&refresh).expect("Failed to encode token");

        // A refresh token has no sid/sub and must not parse as access claims
        let result = handler.decode::<AccessClaims>(&token);
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }
}
