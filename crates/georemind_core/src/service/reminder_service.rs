//! Reminder use-case service.
//!
//! # Responsibility
//! - Validate drafts before they reach the repository.
//! - Pair every saved reminder with the geofence request the host registers.
//! - Shape list results for the reminder list screen.
//!
//! # Invariants
//! - Validation happens here; the repository trusts what it receives.
//! - The geofence registration region id equals the saved reminder id.

use crate::geofence::registration::GeofenceRegistration;
use crate::model::reminder::{ReminderDraft, ReminderRecord, ReminderValidationError};
use crate::repo::reminder_repo::{ReminderDataSource, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Failure of the save use-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReminderError {
    Validation(ReminderValidationError),
    Repo(RepoError),
}

impl Display for SaveReminderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SaveReminderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ReminderValidationError> for SaveReminderError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for SaveReminderError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedReminder {
    pub record: ReminderRecord,
    /// `None` when the reminder has no coordinates.
    pub geofence: Option<GeofenceRegistration>,
}

/// List envelope for the reminder list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderList {
    /// Unordered; sorting is a presentation concern.
    pub items: Vec<ReminderRecord>,
    /// `true` when there is nothing to show.
    pub no_data: bool,
}

/// Use-case wrapper around a reminder data source.
pub struct ReminderService<D> {
    source: Arc<D>,
}

impl<D: ReminderDataSource> ReminderService<D> {
    pub fn new(source: Arc<D>) -> Self {
        Self { source }
    }

    /// Validates `draft`, persists it and returns its geofence request.
    ///
    /// # Contract
    /// - Nothing is written when validation fails.
    /// - A draft without id gets a fresh UUID v4.
    pub async fn validate_and_save(
        &self,
        draft: ReminderDraft,
    ) -> Result<SavedReminder, SaveReminderError> {
        let record = draft.into_record()?;
        self.source.save_reminder(record.clone()).await?;
        let geofence = GeofenceRegistration::for_reminder(&record);
        Ok(SavedReminder { record, geofence })
    }

    pub async fn list_reminders(&self) -> RepoResult<ReminderList> {
        let items = self.source.get_reminders().await?;
        let no_data = items.is_empty();
        Ok(ReminderList { items, no_data })
    }

    pub async fn get_reminder(&self, id: &str) -> RepoResult<ReminderRecord> {
        self.source.get_reminder(id).await
    }

    pub async fn clear_reminders(&self) -> RepoResult<()> {
        self.source.delete_all_reminders().await
    }
}
