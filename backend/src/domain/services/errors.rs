//! Translation of port errors into domain [`Error`]s.
//!
//! Connection failures become `service_unavailable`, query failures become
//! `internal_error`, and uniqueness violations become `conflict`.

use crate::domain::Error;
use crate::domain::ports::{
    CategoryPersistenceError, CommentPersistenceError, PasswordHashError, PostPersistenceError,
    SessionTokenError, SubscriberPersistenceError, UserPersistenceError,
};

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Self::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => {
                Self::conflict("email is already registered")
            }
        }
    }
}

impl From<PostPersistenceError> for Error {
    fn from(error: PostPersistenceError) -> Self {
        match error {
            PostPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("post repository unavailable: {message}"))
            }
            PostPersistenceError::Query { message } => {
                Self::internal(format!("post repository error: {message}"))
            }
            PostPersistenceError::DuplicateSlug { slug } => {
                Self::conflict(format!("slug {slug} is already in use"))
            }
        }
    }
}

impl From<CategoryPersistenceError> for Error {
    fn from(error: CategoryPersistenceError) -> Self {
        match error {
            CategoryPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("category repository unavailable: {message}"))
            }
            CategoryPersistenceError::Query { message } => {
                Self::internal(format!("category repository error: {message}"))
            }
            CategoryPersistenceError::DuplicateSlug { slug } => {
                Self::conflict(format!("slug {slug} is already in use"))
            }
            CategoryPersistenceError::InUse { .. } => {
                Self::conflict("category cannot be deleted while posts reference it")
            }
        }
    }
}

impl From<CommentPersistenceError> for Error {
    fn from(error: CommentPersistenceError) -> Self {
        match error {
            CommentPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("comment repository unavailable: {message}"))
            }
            CommentPersistenceError::Query { message } => {
                Self::internal(format!("comment repository error: {message}"))
            }
        }
    }
}

impl From<SubscriberPersistenceError> for Error {
    fn from(error: SubscriberPersistenceError) -> Self {
        match error {
            SubscriberPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("subscriber repository unavailable: {message}"))
            }
            SubscriberPersistenceError::Query { message } => {
                Self::internal(format!("subscriber repository error: {message}"))
            }
            SubscriberPersistenceError::DuplicateEmail { .. } => {
                Self::conflict("email is already subscribed")
            }
        }
    }
}

impl From<PasswordHashError> for Error {
    fn from(error: PasswordHashError) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<SessionTokenError> for Error {
    fn from(error: SessionTokenError) -> Self {
        match error {
            SessionTokenError::Encode { message } => {
                Self::internal(format!("session token encoding failed: {message}"))
            }
            SessionTokenError::Invalid { .. } | SessionTokenError::Expired => {
                Self::unauthorized("authentication required")
            }
        }
    }
}
