//! Sealed session token
//!
//! The session handed to the browser is a signed, opaque JWT wrapping the
//! whole [`SessionToken`], so the refresh token only ever travels in sealed
//! form. Unsealing validates the signature and issuer; any failure means the
//! request is treated as unauthenticated.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::session::SessionToken;

const ISSUER: &str = "deckgen-gateway";

/// Sealed-session claims: the session token plus standard JWT metadata.
///
/// `exp` bounds the cookie's life, not the access token's; the access token
/// carries its own expiry inside the sealed payload.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    session: SessionToken,
    iat: i64,
    exp: i64,
    iss: String,
}

/// Codec for sealing and unsealing session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionCodec {
    /// Create a new codec with the provided signing secret.
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Seal a session token into its signed, opaque wire form.
    pub fn seal(&self, session: &SessionToken) -> Result<String> {
        let now = Utc::now();
        let expiration = now + Duration::days(30); // session cookie lifetime

        let claims = SessionClaims {
            sub: session.user.id.clone(),
            session: session.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: ISSUER.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to seal session token")
    }

    /// Unseal and verify a sealed session token.
    pub fn unseal(&self, sealed: &str) -> Result<SessionToken> {
        let data = decode::<SessionClaims>(sealed, &self.decoding_key, &self.validation)
            .context("Failed to unseal session token")?;
        Ok(data.claims.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::TokenGrant;
    use crate::auth::session::SessionUser;

    fn test_session() -> SessionToken {
        let grant = TokenGrant {
            access_token: "at".into(),
            expires_in: Some(3600),
            refresh_token: Some("rt".into()),
        };
        let user = SessionUser {
            id: "usr_1".into(),
            name: Some("Test User".into()),
            email: Some("test@example.com".into()),
            image: None,
        };
        SessionToken::established(grant, user, 1_700_000_000_000)
    }

    #[test]
    fn test_seal_unseal_roundtrip() {
        let codec = SessionCodec::new("test_secret");
        let session = test_session();

        let sealed = codec.seal(&session).unwrap();
        let unsealed = codec.unseal(&sealed).unwrap();

        assert_eq!(unsealed.access_token, session.access_token);
        assert_eq!(unsealed.expires_at, session.expires_at);
        assert_eq!(unsealed.user.id, session.user.id);
        assert_eq!(unsealed.refresh_token, session.refresh_token);
        assert!(unsealed.error.is_none());
    }

    #[test]
    fn test_roundtrip_preserves_error_tag() {
        let codec = SessionCodec::new("test_secret");
        let session = test_session().refresh_failed();

        let sealed = codec.seal(&session).unwrap();
        let unsealed = codec.unseal(&sealed).unwrap();

        assert!(unsealed.error.is_some());
    }

    #[test]
    fn test_unseal_rejects_wrong_secret() {
        let sealed = SessionCodec::new("secret_a").seal(&test_session()).unwrap();
        assert!(SessionCodec::new("secret_b").unseal(&sealed).is_err());
    }
}
