//! JWT session tokens.
//!
//! Sessions are stateless: a signed token carrying the user id and an
//! expiry, handed to the browser in an HTTP-only cookie. Verification
//! failures are split between client-caused kinds (expired, malformed,
//! bad signature) which become 401s, and server-side kinds (bad key
//! material, crypto failures) which become 500s.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::types::UserId;

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The user id this session belongs to.
    pub sub: UserId,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
}

/// Create a signed session token for a user.
pub fn create_session_token(
    user_id: UserId,
    secret: &str,
    expiry: std::time::Duration,
) -> Result<String> {
    let now = Utc::now();
    let expiry = Duration::from_std(expiry).map_err(|e| Error::Internal {
        operation: format!("converting session expiry: {e}"),
    })?;

    let claims = SessionClaims {
        sub: user_id,
        exp: (now + expiry).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal {
        operation: format!("signing session token: {e}"),
    })
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        use jsonwebtoken::errors::ErrorKind;
        match e.kind() {
            // The client presented a bad token.
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::ExpiredSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Error::Unauthenticated {
                message: Some("Invalid session token".to_string()),
            },
            // Our key material or crypto stack is broken.
            _ => Error::Internal {
                operation: format!("verifying session token: {e}"),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const SECRET: &str = "test-secret-key";

    fn day() -> std::time::Duration {
        std::time::Duration::from_secs(24 * 60 * 60)
    }

    #[test]
    fn roundtrip_preserves_user_id() {
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, SECRET, day()).unwrap();
        let claims = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_unauthenticated() {
        let token = create_session_token(Uuid::new_v4(), SECRET, day()).unwrap();
        let err = verify_session_token(&token, "other-secret").unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: Uuid::new_v4(),
            exp: (now - Duration::hours(2)).timestamp(),
            iat: (now - Duration::hours(3)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify_session_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));
    }

    #[test]
    fn malformed_tokens_are_unauthenticated() {
        for token in ["", "garbage", "a.b", "a.b.c.d"] {
            let err = verify_session_token(token, SECRET).unwrap_err();
            assert!(matches!(err, Error::Unauthenticated { .. }), "{token:?}");
        }
    }
}
