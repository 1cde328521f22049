use async_trait::async_trait;

use crate::domain::Email;
use crate::domain::newsletter::Subscriber;
use crate::domain::ports::{SubscriberPersistenceError, SubscriberRepository};

use super::{MemoryBlogStore, take_page};

#[async_trait]
impl SubscriberRepository for MemoryBlogStore {
    async fn latest(&self, limit: u32) -> Result<Vec<Subscriber>, SubscriberPersistenceError> {
        let state = self.lock().map_err(SubscriberPersistenceError::query)?;
        let mut subscribers: Vec<Subscriber> = state.subscribers.values().cloned().collect();
        subscribers.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(take_page(subscribers, 0, limit))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Subscriber>, SubscriberPersistenceError> {
        let state = self.lock().map_err(SubscriberPersistenceError::query)?;
        Ok(state
            .subscribers
            .values()
            .find(|subscriber| &subscriber.email == email)
            .cloned())
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), SubscriberPersistenceError> {
        let mut state = self.lock().map_err(SubscriberPersistenceError::query)?;
        if state
            .subscribers
            .values()
            .any(|existing| existing.email == subscriber.email)
        {
            return Err(SubscriberPersistenceError::duplicate_email(
                subscriber.email.to_string(),
            ));
        }
        state.subscribers.insert(subscriber.id, subscriber.clone());
        Ok(())
    }

    async fn update(&self, subscriber: &Subscriber) -> Result<(), SubscriberPersistenceError> {
        let mut state = self.lock().map_err(SubscriberPersistenceError::query)?;
        match state.subscribers.get_mut(&subscriber.id) {
            Some(stored) => {
                *stored = subscriber.clone();
                Ok(())
            }
            None => Err(SubscriberPersistenceError::query(format!(
                "subscriber {} does not exist",
                subscriber.id
            ))),
        }
    }
}
