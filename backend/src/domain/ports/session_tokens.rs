//! Port for signed, time-limited session tokens.

use chrono::{DateTime, Utc};

use crate::domain::{IssuedSession, SessionSubject, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while issuing or verifying session tokens.
    pub enum SessionTokenError {
        /// The token could not be signed.
        Encode { message: String } => "session token encoding failed: {message}",
        /// The token is malformed, carries a bad signature, or has an
        /// unusable subject.
        Invalid { message: String } => "session token rejected: {message}",
        /// The token's lifetime has passed.
        Expired => "session token expired",
    }
}

/// Issues and verifies session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait SessionTokens: Send + Sync {
    /// Sign a token for `user_id` valid from `now` for the configured lifetime.
    fn issue(
        &self,
        user_id: &UserId,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, SessionTokenError>;

    /// Verify signature and expiry at `now` and return the embedded identity.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionSubject, SessionTokenError>;
}
