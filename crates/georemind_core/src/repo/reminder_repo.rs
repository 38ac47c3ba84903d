//! Async reminder repository over a blocking record store.
//!
//! # Responsibility
//! - Run store calls on tokio's blocking pool, away from async callers.
//! - Share one failure vocabulary (`RepoError`) with every consumer.
//!
//! # Invariants
//! - No locking or caching here; the store serializes access itself.
//! - No retries; a failed call is reported once and forgotten.

use crate::model::reminder::ReminderRecord;
use crate::store::reminder_store::{ReminderStore, StoreError, StoreResult};
use async_trait::async_trait;
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Stable message callers branch on for the not-found case.
pub const REMINDER_NOT_FOUND_MESSAGE: &str = "Reminder not found";

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome classification shared by every repository operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// Requested id is absent. Expected, non-fatal.
    NotFound,
    /// Engine failure (I/O, corruption, unusable connection).
    Store(String),
}

impl RepoError {
    /// Returns the user-facing message for this failure.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound => REMINDER_NOT_FOUND_MESSAGE,
            Self::Store(message) => message,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for RepoError {}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value.to_string())
    }
}

/// Async reminder access contract.
#[async_trait]
pub trait ReminderDataSource: Send + Sync {
    /// `Ok(vec![])` when empty; `Err` only on genuine store failure.
    async fn get_reminders(&self) -> RepoResult<Vec<ReminderRecord>>;
    /// Completes only after the write is durable (or failed).
    async fn save_reminder(&self, reminder: ReminderRecord) -> RepoResult<()>;
    async fn get_reminder(&self, id: &str) -> RepoResult<ReminderRecord>;
    async fn delete_all_reminders(&self) -> RepoResult<()>;
}

/// Repository backed by a local record store.
pub struct LocalReminderRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for LocalReminderRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ReminderStore + 'static> LocalReminderRepository<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Runs `op` against the store on the blocking pool.
    async fn run<T, F>(&self, op: &'static str, f: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let joined = tokio::task::spawn_blocking(move || f(store.as_ref())).await;

        let result = match joined {
            Ok(result) => result.map_err(RepoError::from),
            Err(err) => Err(RepoError::Store(format!("store task failed: {err}"))),
        };
        if let Err(err) = &result {
            error!("event={op} module=repo status=error error={err}");
        }
        result
    }
}

#[async_trait]
impl<S: ReminderStore + 'static> ReminderDataSource for LocalReminderRepository<S> {
    async fn get_reminders(&self) -> RepoResult<Vec<ReminderRecord>> {
        let records = self
            .run("reminder_list", |store| store.get_all())
            .await?;
        debug!(
            "event=reminder_list module=repo status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    async fn save_reminder(&self, reminder: ReminderRecord) -> RepoResult<()> {
        let id = reminder.id.clone();
        self.run("reminder_save", move |store| store.save(&reminder))
            .await?;
        debug!("event=reminder_save module=repo status=ok id={id}");
        Ok(())
    }

    async fn get_reminder(&self, id: &str) -> RepoResult<ReminderRecord> {
        let lookup_id = id.to_owned();
        let found = self
            .run("reminder_get", move |store| store.get_by_id(&lookup_id))
            .await?;

        match found {
            Some(record) => Ok(record),
            None => {
                debug!("event=reminder_get module=repo status=not_found id={id}");
                Err(RepoError::NotFound)
            }
        }
    }

    async fn delete_all_reminders(&self) -> RepoResult<()> {
        let removed = self
            .run("reminder_clear", |store| store.delete_all())
            .await?;
        debug!("event=reminder_clear module=repo status=ok removed={removed}");
        Ok(())
    }
}
