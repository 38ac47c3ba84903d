//! Core of the location reminder app.
//!
//! Stores reminders bound to map locations and turns geofence arrivals into
//! notifications. UI, maps and geofence sensing live in the host.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod geofence;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod store;

pub use bootstrap::{ReminderCore, SqliteReminderRepository};
pub use config::{ConfigError, CoreConfig};
pub use geofence::event::{GeofenceEvent, GeofenceTransition, GEOFENCE_EVENT_ACTION};
pub use geofence::registration::GeofenceRegistration;
pub use geofence::resolver::{ArrivalOutcome, ArrivalResolver, IgnoreReason, ResolutionSummary};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::reminder::{ReminderDraft, ReminderId, ReminderRecord, ReminderValidationError};
pub use notify::dispatcher::{
    CollectingDispatcher, LogDispatcher, NotificationDispatcher, NotificationPayload,
};
pub use repo::reminder_repo::{
    LocalReminderRepository, ReminderDataSource, RepoError, RepoResult,
    REMINDER_NOT_FOUND_MESSAGE,
};
pub use service::reminder_service::{
    ReminderList, ReminderService, SaveReminderError, SavedReminder,
};
pub use store::reminder_store::{ReminderStore, SqliteReminderStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
