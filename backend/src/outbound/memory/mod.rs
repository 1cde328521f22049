//! In-process adapters implementing every repository port.
//!
//! Used when no database is configured and by tests. All state lives behind
//! one mutex so cross-entity operations (cascading deletes, like toggles)
//! are atomic, matching the transactional behaviour of the PostgreSQL
//! adapters.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::newsletter::Subscriber;
use crate::domain::post::Post;
use crate::domain::services::BlogRepositories;
use crate::domain::{CategoryId, CommentId, PostId, SubscriberId, User, UserId};

mod categories;
mod comments;
mod posts;
mod subscribers;
mod users;

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, StoredUser>,
    posts: HashMap<PostId, Post>,
    likes: HashSet<(PostId, UserId)>,
    categories: HashMap<CategoryId, Category>,
    comments: HashMap<CommentId, Comment>,
    subscribers: HashMap<SubscriberId, Subscriber>,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Shared in-memory blog store.
#[derive(Debug, Default)]
pub struct MemoryBlogStore {
    state: Mutex<State>,
}

impl MemoryBlogStore {
    /// Expose the store through every repository port.
    pub fn repositories(self: &Arc<Self>) -> BlogRepositories {
        BlogRepositories {
            users: self.clone(),
            posts: self.clone(),
            categories: self.clone(),
            comments: self.clone(),
            subscribers: self.clone(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}

fn take_page<T>(items: Vec<T>, offset: u64, limit: u32) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    items
        .into_iter()
        .skip(skip)
        .take(limit as usize)
        .collect()
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
