//! Newsletter subscription use-cases.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageDefaults, PageRequest};
use tracing::debug;

use crate::domain::newsletter::{
    LIST_DEFAULT, LIST_MAX, SubscribeOutcome, Subscriber, Subscription,
};
use crate::domain::ports::SubscriberRepository;
use crate::domain::validation::field_error;
use crate::domain::{Email, Error, SubscriberId};

/// Newsletter use-cases.
#[derive(Clone)]
pub struct NewsletterService {
    subscribers: Arc<dyn SubscriberRepository>,
    clock: Arc<dyn Clock>,
}

impl NewsletterService {
    /// Create the service.
    pub fn new(subscribers: Arc<dyn SubscriberRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { subscribers, clock }
    }

    /// Most recent subscribers. `limit` defaults to 50 and is capped at 200.
    pub async fn latest(&self, limit: Option<&str>) -> Result<Vec<Subscriber>, Error> {
        let limit = PageRequest::from_raw(
            None,
            limit,
            PageDefaults::with_limits(LIST_DEFAULT, LIST_MAX),
        )
        .limit();
        Ok(self.subscribers.latest(limit).await?)
    }

    /// Subscribe an address, reactivating it when it had unsubscribed.
    pub async fn subscribe(&self, subscription: Subscription) -> Result<SubscribeOutcome, Error> {
        let now = self.clock.utc();
        if let Some(mut existing) = self.subscribers.find_by_email(&subscription.email).await? {
            if existing.is_active() {
                return Err(Error::conflict("email is already subscribed"));
            }
            existing.unsubscribed_at = None;
            existing.confirmed_at = Some(now);
            self.subscribers.update(&existing).await?;
            debug!(subscriber_id = %existing.id, "subscriber reactivated");
            return Ok(SubscribeOutcome::Reactivated(existing));
        }

        let subscriber = Subscriber {
            id: SubscriberId::random(),
            email: subscription.email,
            name: subscription.name,
            tags: subscription.tags,
            confirmed_at: subscription.confirmed.then_some(now),
            unsubscribed_at: None,
            created_at: now,
        };
        self.subscribers.insert(&subscriber).await?;
        debug!(subscriber_id = %subscriber.id, "subscriber created");
        Ok(SubscribeOutcome::Created(subscriber))
    }

    /// Mark an address as unsubscribed.
    pub async fn unsubscribe(&self, email: &str) -> Result<Subscriber, Error> {
        let email = Email::new(email).map_err(|err| field_error("email", err.to_string()))?;
        let mut subscriber = self
            .subscribers
            .find_by_email(&email)
            .await?
            .ok_or_else(|| Error::not_found("subscriber not found"))?;
        if subscriber.unsubscribed_at.is_none() {
            subscriber.unsubscribed_at = Some(self.clock.utc());
            self.subscribers.update(&subscriber).await?;
        }
        Ok(subscriber)
    }
}
