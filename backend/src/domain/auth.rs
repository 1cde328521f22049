//! Authentication primitives: login credentials, registration input, and
//! session token payloads.
//!
//! Inbound adapters build these from raw strings; services only ever see the
//! validated forms.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::validation::{FieldErrors, char_len};
use super::{Email, Error, UserId, UserName};

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the authentication service.
///
/// ## Invariants
/// - `email` is trimmed, lowercased and non-empty. Its shape is not checked:
///   an address that cannot exist simply fails to authenticate.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use blog_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    name: UserName,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate every registration field, reporting all failures together
    /// under the `name`, `email`, `password` and `passwordConfirm` keys.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Self, Error> {
        let mut errors = FieldErrors::new();
        let name = errors.check("name", UserName::new(name));
        let email = errors.check("email", Email::new(email));
        if char_len(password) < PASSWORD_MIN {
            errors.add(
                "password",
                format!("password must be at least {PASSWORD_MIN} characters"),
            );
        }
        if password != password_confirm {
            errors.add("passwordConfirm", "passwords do not match");
        }
        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(Self {
                name,
                email,
                password: Zeroizing::new(password.to_owned()),
            }),
            _ => Err(errors.into_error()),
        }
    }

    /// Validated display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Normalised email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plain-text password, zeroised on drop.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Signed session token handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Encoded token.
    pub token: String,
    /// Expiry instant embedded in the token.
    pub expires_at: DateTime<Utc>,
}

/// Identity claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    /// Authenticated user.
    pub user_id: UserId,
    /// Email at the time the token was issued.
    pub email: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_accepts_valid_input() {
        let registration =
            Registration::try_from_parts(" Ada ", "ADA@example.com", "secret1", "secret1")
                .expect("valid registration");
        assert_eq!(registration.name().as_ref(), "Ada");
        assert_eq!(registration.email().as_ref(), "ada@example.com");
        assert_eq!(registration.password(), "secret1");
    }

    #[rstest]
    fn registration_reports_every_field() {
        let err = Registration::try_from_parts("A", "nope", "123", "456")
            .expect_err("invalid registration");
        let fields = &err.details().expect("details")["fields"];
        for field in ["name", "email", "password", "passwordConfirm"] {
            assert!(fields.get(field).is_some(), "missing {field}");
        }
    }

    #[rstest]
    fn registration_reports_only_mismatch() {
        let err = Registration::try_from_parts("Ada", "ada@example.com", "secret1", "secret2")
            .expect_err("mismatch");
        let fields = err.details().expect("details")["fields"]
            .as_object()
            .expect("fields object")
            .clone();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("passwordConfirm"));
    }
}
