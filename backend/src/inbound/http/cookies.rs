//! Session cookie construction.
//!
//! Issuing and clearing must agree on every attribute, otherwise browsers
//! keep the stale cookie next to the cleared one.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use chrono::TimeDelta;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "auth_token";
/// Value written when the session cookie is cleared.
pub const CLEARED_VALUE: &str = "deleted";

/// Attributes shared by issued and cleared session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookieConfig {
    /// Mark the cookie `Secure`.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// Lifetime, matching the token lifetime.
    pub ttl: TimeDelta,
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Lax,
            ttl: TimeDelta::days(7),
        }
    }
}

impl SessionCookieConfig {
    /// Cookie carrying a freshly issued token.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::inbound::http::cookies::{SESSION_COOKIE, SessionCookieConfig};
    ///
    /// let cookie = SessionCookieConfig::default().issue("token".to_owned());
    /// assert_eq!(cookie.name(), SESSION_COOKIE);
    /// assert_eq!(cookie.http_only(), Some(true));
    /// ```
    #[must_use]
    pub fn issue(&self, token: String) -> Cookie<'static> {
        self.build(token, Duration::seconds(self.ttl.num_seconds()))
    }

    /// Cookie instructing the browser to drop the session.
    #[must_use]
    pub fn clear(&self) -> Cookie<'static> {
        self.build(CLEARED_VALUE.to_owned(), Duration::ZERO)
    }

    fn build(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(max_age)
            .finish()
    }
}
