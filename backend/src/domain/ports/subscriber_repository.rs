//! Port for newsletter subscriber persistence.

use async_trait::async_trait;

use crate::domain::Email;
use crate::domain::newsletter::Subscriber;

use super::define_port_error;

define_port_error! {
    /// Errors raised by subscriber repository adapters.
    pub enum SubscriberPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "subscriber repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "subscriber repository query failed: {message}",
        /// The address is already subscribed.
        DuplicateEmail { email: String } => "subscriber already exists: {email}",
    }
}

/// Storage of newsletter subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Most recently created subscribers, newest first.
    async fn latest(&self, limit: u32) -> Result<Vec<Subscriber>, SubscriberPersistenceError>;

    /// Fetch a subscriber by address.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Subscriber>, SubscriberPersistenceError>;

    /// Store a new subscriber.
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), SubscriberPersistenceError>;

    /// Overwrite an existing subscriber.
    async fn update(&self, subscriber: &Subscriber) -> Result<(), SubscriberPersistenceError>;
}
