//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Only compiled for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::services::BlogRepositories;
use crate::outbound::memory::MemoryBlogStore;

/// Clock whose current time only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used as the starting point of test clocks.
pub fn fixture_instant() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("valid fixture instant"),
    }
}

/// Fresh in-memory store with its repository bundle.
pub fn memory_repositories() -> (Arc<MemoryBlogStore>, BlogRepositories) {
    let store = Arc::new(MemoryBlogStore::default());
    let repos = store.repositories();
    (store, repos)
}
