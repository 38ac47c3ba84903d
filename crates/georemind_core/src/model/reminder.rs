//! Reminder domain model.
//!
//! # Responsibility
//! - Define the canonical `ReminderRecord` persisted by the record store.
//! - Turn user-entered `ReminderDraft` values into records.
//!
//! # Invariants
//! - `id` is assigned once and never changes for the record lifetime.
//! - `latitude` and `longitude` are either both set or both absent on records
//!   built from drafts.
//! - Draft validation reports the first failing field in form order:
//!   title, description, location.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable reminder identifier, also used as the geofence region identifier.
pub type ReminderId = String;

/// Persisted reminder bound (optionally) to a map location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRecord {
    /// Primary key. UUID v4 text for reminders created in this process.
    pub id: ReminderId,
    pub title: String,
    pub description: String,
    /// Human-readable place name picked on the map.
    pub location_label: String,
    /// WGS-84 degrees.
    pub latitude: Option<f64>,
    /// WGS-84 degrees.
    pub longitude: Option<f64>,
}

impl ReminderRecord {
    /// Creates a record with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location_label: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self::with_id(
            new_reminder_id(),
            title,
            description,
            location_label,
            latitude,
            longitude,
        )
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used when the id was already handed to the platform geofencing client.
    pub fn with_id(
        id: impl Into<ReminderId>,
        title: impl Into<String>,
        description: impl Into<String>,
        location_label: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            location_label: location_label.into(),
            latitude,
            longitude,
        }
    }

    /// Returns `(latitude, longitude)` when the record is bound to a location.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some((latitude, longitude)),
            _ => None,
        }
    }
}

/// Generates a new stable reminder id.
pub fn new_reminder_id() -> ReminderId {
    Uuid::new_v4().to_string()
}

/// Draft validation failures, in form field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderValidationError {
    MissingTitle,
    MissingDescription,
    MissingLocation,
    /// Exactly one of latitude/longitude was provided.
    PartialCoordinates,
    /// Non-finite or outside ±90 latitude / ±180 longitude.
    InvalidCoordinates,
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "please enter a title"),
            Self::MissingDescription => write!(f, "please enter a description"),
            Self::MissingLocation => write!(f, "please select a location"),
            Self::PartialCoordinates => {
                write!(f, "latitude and longitude must be provided together")
            }
            Self::InvalidCoordinates => write!(
                f,
                "latitude must be within ±90 and longitude within ±180 degrees"
            ),
        }
    }
}

impl Error for ReminderValidationError {}

/// Unvalidated reminder input as collected by the save form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDraft {
    /// Pre-assigned id; a new one is generated when absent or blank.
    pub id: Option<ReminderId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_label: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ReminderDraft {
    /// Checks required fields without consuming the draft.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if is_blank(self.title.as_deref()) {
            return Err(ReminderValidationError::MissingTitle);
        }
        if is_blank(self.description.as_deref()) {
            return Err(ReminderValidationError::MissingDescription);
        }
        if is_blank(self.location_label.as_deref()) {
            return Err(ReminderValidationError::MissingLocation);
        }
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err(ReminderValidationError::PartialCoordinates);
        }
        if !is_valid_degrees(self.latitude, 90.0) || !is_valid_degrees(self.longitude, 180.0) {
            return Err(ReminderValidationError::InvalidCoordinates);
        }
        Ok(())
    }

    /// Validates and converts into a persistable record.
    pub fn into_record(self) -> Result<ReminderRecord, ReminderValidationError> {
        self.validate()?;

        let id = self
            .id
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(new_reminder_id);

        Ok(ReminderRecord {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            location_label: self.location_label.unwrap_or_default(),
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

fn is_valid_degrees(value: Option<f64>, limit: f64) -> bool {
    value.map_or(true, |degrees| degrees.is_finite() && degrees.abs() <= limit)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |text| text.trim().is_empty())
}
