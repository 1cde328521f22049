//! User accounts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use super::validation::{char_len, looks_like_email};

/// Avatar assigned to accounts that never uploaded one.
pub const DEFAULT_AVATAR: &str = "/images/default-avatar.png";
/// Minimum length of a display name.
pub const USER_NAME_MIN: usize = 2;
/// Maximum length of a display name.
pub const USER_NAME_MAX: usize = 80;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Name shorter than [`USER_NAME_MIN`] once trimmed.
    #[error("name must be at least {min} characters")]
    NameTooShort {
        /// Lower bound.
        min: usize,
    },
    /// Name longer than [`USER_NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Upper bound.
        max: usize,
    },
    /// Email does not look like `local@host.tld`.
    #[error("email must be a valid address")]
    InvalidEmail,
}

/// Trimmed display name between 2 and 80 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        let length = char_len(trimmed);
        if length < USER_NAME_MIN {
            return Err(UserValidationError::NameTooShort { min: USER_NAME_MIN });
        }
        if length > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trimmed, lowercased email address.
///
/// # Examples
/// ```
/// use blog_backend::domain::Email;
///
/// let email = Email::new("  Ada@Example.COM ").unwrap();
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalise and validate an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if !looks_like_email(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered user as exposed to the rest of the system. The password hash
/// never leaves the repository except through [`StoredCredentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: UserName,
    /// Unique login email.
    pub email: Email,
    /// Avatar URL or path.
    pub avatar: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored password hash, for credential checks.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// The account.
    pub user: User,
    /// bcrypt hash of the password.
    pub password_hash: String,
}

/// Public author information attached to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    /// Author id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar URL or path.
    pub avatar: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            avatar: user.avatar.clone(),
        }
    }
}
