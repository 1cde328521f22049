use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, StoredCredentials, User, UserId};

use super::{MemoryBlogStore, StoredUser, count};

#[async_trait]
impl UserRepository for MemoryBlogStore {
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError> {
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state.users.values().any(|stored| stored.user.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.to_string()));
        }
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(id).map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|stored| &stored.user.email == email)
            .map(|stored| StoredCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id))
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(count(state.users.len()))
    }
}
