//! Registration, login and session resolution.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{PasswordHasher, SessionTokens, UserRepository};
use crate::domain::user::DEFAULT_AVATAR;
use crate::domain::{
    Email, Error, IssuedSession, LoginCredentials, Registration, User, UserId,
};

/// Authentication use-cases backed by the user repository and the security
/// adapters.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn SessionTokens>,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Create the service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn SessionTokens>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    /// Create an account and open a session for it.
    pub async fn register(&self, registration: Registration) -> Result<(User, IssuedSession), Error> {
        let password_hash = self.hasher.hash(registration.password()).await?;
        let user = User {
            id: UserId::random(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            avatar: DEFAULT_AVATAR.to_owned(),
            created_at: self.clock.utc(),
        };
        self.users.create(&user, &password_hash).await?;
        debug!(user_id = %user.id, "user registered");
        let session = self.issue(&user)?;
        Ok((user, session))
    }

    /// Check credentials and open a session.
    ///
    /// Unknown addresses and wrong passwords fail identically.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(User, IssuedSession), Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            warn!("login rejected: malformed email");
            return Err(invalid_credentials());
        };
        let Some(stored) = self.users.find_credentials_by_email(&email).await? else {
            warn!("login rejected: unknown email");
            return Err(invalid_credentials());
        };
        if !self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await?
        {
            warn!(user_id = %stored.user.id, "login rejected: wrong password");
            return Err(invalid_credentials());
        }
        let session = self.issue(&stored.user)?;
        Ok((stored.user, session))
    }

    /// Resolve a presented session token to its user. Every failure,
    /// including repository errors, yields `None`.
    pub async fn authenticate(&self, token: &str) -> Option<User> {
        let subject = match self.tokens.verify(token, self.clock.utc()) {
            Ok(subject) => subject,
            Err(error) => {
                debug!(%error, "session token rejected");
                return None;
            }
        };
        match self.users.find_by_id(&subject.user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!(user_id = %subject.user_id, "session token for unknown user");
                None
            }
            Err(error) => {
                warn!(%error, "session user lookup failed");
                None
            }
        }
    }

    fn issue(&self, user: &User) -> Result<IssuedSession, Error> {
        Ok(self
            .tokens
            .issue(&user.id, user.email.as_ref(), self.clock.utc())?)
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}
