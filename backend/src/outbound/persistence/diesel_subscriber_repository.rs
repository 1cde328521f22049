//! PostgreSQL-backed `SubscriberRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::Email;
use crate::domain::newsletter::Subscriber;
use crate::domain::ports::{SubscriberPersistenceError, SubscriberRepository};

use super::diesel_error_mapping::{basic_error_mapping, classify};
use super::diesel_helpers::limit_to_db;
use super::models::{NewSubscriberRow, SubscriberChanges, SubscriberRow};
use super::pool::DbPool;
use super::schema::subscribers;

const EMAIL_CONSTRAINT: &str = "subscribers_email_key";

basic_error_mapping!(SubscriberPersistenceError);

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> SubscriberPersistenceError {
    map_failure(classify(error, operation))
}

/// Diesel implementation of the subscriber port.
#[derive(Clone)]
pub struct DieselSubscriberRepository {
    pool: DbPool,
}

impl DieselSubscriberRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRepository for DieselSubscriberRepository {
    async fn latest(&self, limit: u32) -> Result<Vec<Subscriber>, SubscriberPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SubscriberRow> = subscribers::table
            .order_by((subscribers::created_at.desc(), subscribers::id.desc()))
            .limit(limit_to_db(limit))
            .select(SubscriberRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list subscribers"))?;
        rows.into_iter()
            .map(Subscriber::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(SubscriberPersistenceError::query)
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Subscriber>, SubscriberPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SubscriberRow> = subscribers::table
            .filter(subscribers::email.eq(email.as_ref()))
            .select(SubscriberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find subscriber"))?;
        row.map(Subscriber::try_from)
            .transpose()
            .map_err(SubscriberPersistenceError::query)
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), SubscriberPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSubscriberRow {
            id: *subscriber.id.as_uuid(),
            created_at: subscriber.created_at,
            changes: SubscriberChanges::from(subscriber),
        };
        diesel::insert_into(subscribers::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                let failure = classify(err, "insert subscriber");
                if failure.is_unique(EMAIL_CONSTRAINT) {
                    SubscriberPersistenceError::duplicate_email(subscriber.email.to_string())
                } else {
                    map_failure(failure)
                }
            })
    }

    async fn update(&self, subscriber: &Subscriber) -> Result<(), SubscriberPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(subscribers::table.find(subscriber.id.as_uuid()))
            .set(&SubscriberChanges::from(subscriber))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "update subscriber"))?;
        if updated == 0 {
            return Err(SubscriberPersistenceError::query(format!(
                "subscriber {} does not exist",
                subscriber.id
            )));
        }
        Ok(())
    }
}
