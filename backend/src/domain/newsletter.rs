//! Newsletter subscribers.

use chrono::{DateTime, Utc};

use super::validation::{FieldErrors, char_len, normalise_tags};
use super::{Email, Error, SubscriberId};

/// Maximum subscriber name length.
pub const NAME_MAX: usize = 80;
/// Default number of subscribers listed.
pub const LIST_DEFAULT: u32 = 50;
/// Largest listing size.
pub const LIST_MAX: u32 = 200;

/// A stored subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscriber {
    /// Stable identifier.
    pub id: SubscriberId,
    /// Unique address.
    pub email: Email,
    /// Optional display name.
    pub name: Option<String>,
    /// Interest tags.
    pub tags: Vec<String>,
    /// When the address was confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When the address opted out.
    pub unsubscribed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Subscriber {
    /// Whether the subscription is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.unsubscribed_at.is_none()
    }
}

/// Validated subscribe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Normalised address.
    pub email: Email,
    /// Trimmed name, `None` when blank.
    pub name: Option<String>,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// Whether the caller asserts the address is confirmed.
    pub confirmed: bool,
}

impl Subscription {
    /// Validate raw subscribe fields.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::newsletter::Subscription;
    ///
    /// let sub = Subscription::try_from_parts("Reader@Example.com", None, &["News".into()], false)
    ///     .unwrap();
    /// assert_eq!(sub.email.as_ref(), "reader@example.com");
    /// assert_eq!(sub.tags, vec!["news".to_owned()]);
    /// ```
    pub fn try_from_parts(
        email: &str,
        name: Option<&str>,
        tags: &[String],
        confirmed: bool,
    ) -> Result<Self, Error> {
        let mut errors = FieldErrors::new();
        let email = errors.check("email", Email::new(email));
        let name = name.map(str::trim).filter(|name| !name.is_empty());
        if name.is_some_and(|name| char_len(name) > NAME_MAX) {
            errors.add("name", format!("name must be at most {NAME_MAX} characters"));
        }
        match email {
            Some(email) if errors.is_empty() => Ok(Self {
                email,
                name: name.map(str::to_owned),
                tags: normalise_tags(tags),
                confirmed,
            }),
            _ => Err(errors.into_error()),
        }
    }
}

/// Outcome of a subscribe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// A new subscriber was stored.
    Created(Subscriber),
    /// A previously unsubscribed address was reactivated.
    Reactivated(Subscriber),
}

impl SubscribeOutcome {
    /// The resulting subscriber.
    #[must_use]
    pub fn subscriber(&self) -> &Subscriber {
        match self {
            Self::Created(subscriber) | Self::Reactivated(subscriber) => subscriber,
        }
    }
}
