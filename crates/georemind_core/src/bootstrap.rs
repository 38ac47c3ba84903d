//! Explicit wiring of store, repository, service and resolver.
//!
//! Hosts build one `ReminderCore` per database and pass it (or clones of its
//! `Arc`s) to whatever needs reminder access. There is no global registry.

use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::geofence::resolver::ArrivalResolver;
use crate::notify::dispatcher::NotificationDispatcher;
use crate::repo::reminder_repo::LocalReminderRepository;
use crate::service::reminder_service::ReminderService;
use crate::store::reminder_store::SqliteReminderStore;
use rusqlite::Connection;
use std::sync::Arc;

pub type SqliteReminderRepository = LocalReminderRepository<SqliteReminderStore>;

/// Fully wired reminder stack over one SQLite database.
#[derive(Clone)]
pub struct ReminderCore {
    repository: Arc<SqliteReminderRepository>,
    max_concurrent_lookups: usize,
}

impl ReminderCore {
    /// Opens `config.db_path` and wires the stack on top of it.
    pub fn open(config: &CoreConfig) -> DbResult<Self> {
        let conn = open_db(&config.db_path)?;
        Ok(Self::from_connection(conn, config.max_concurrent_lookups))
    }

    pub fn open_in_memory(max_concurrent_lookups: usize) -> DbResult<Self> {
        Ok(Self::from_connection(
            open_db_in_memory()?,
            max_concurrent_lookups,
        ))
    }

    /// Wires the stack over an already migrated connection.
    pub fn from_connection(conn: Connection, max_concurrent_lookups: usize) -> Self {
        let store = SqliteReminderStore::new(conn);
        Self {
            repository: Arc::new(LocalReminderRepository::new(store)),
            max_concurrent_lookups,
        }
    }

    pub fn repository(&self) -> Arc<SqliteReminderRepository> {
        Arc::clone(&self.repository)
    }

    pub fn service(&self) -> ReminderService<SqliteReminderRepository> {
        ReminderService::new(self.repository())
    }

    pub fn resolver<N>(&self, dispatcher: Arc<N>) -> ArrivalResolver<SqliteReminderRepository, N>
    where
        N: NotificationDispatcher + 'static,
    {
        ArrivalResolver::new(self.repository(), dispatcher, self.max_concurrent_lookups)
    }
}
