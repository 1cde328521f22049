//! HS256 JWT implementation of the session token port.
//!
//! Expiry is checked against the caller-supplied instant rather than the
//! system clock so the domain clock stays authoritative.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{SessionTokenError, SessionTokens};
use crate::domain::{IssuedSession, SessionSubject, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies session tokens with a shared secret.
pub struct JwtSessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
}

impl JwtSessionTokens {
    /// Build from the raw signing secret and token lifetime.
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "exp"]);
        validation
    }
}

impl fmt::Debug for JwtSessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokens for JwtSessionTokens {
    fn issue(
        &self,
        user_id: &UserId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, SessionTokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| SessionTokenError::encode(err.to_string()))?;
        Ok(IssuedSession { token, expires_at })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionSubject, SessionTokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Self::validation()).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => SessionTokenError::expired(),
                _ => SessionTokenError::invalid(err.to_string()),
            }
        })?;
        let claims = data.claims;
        if claims.exp <= now.timestamp() {
            return Err(SessionTokenError::expired());
        }
        let user_id = UserId::new(&claims.sub)
            .map_err(|err| SessionTokenError::invalid(format!("subject: {err}")))?;
        Ok(SessionSubject {
            user_id,
            email: claims.email,
        })
    }
}
