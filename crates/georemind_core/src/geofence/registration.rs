//! Outbound geofence registration requests.
//!
//! The host hands these to the platform geofencing client right after a
//! reminder is saved.

use super::event::GeofenceTransition;
use crate::model::reminder::{ReminderId, ReminderRecord};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEOFENCE_RADIUS_METERS: f32 = 200.0;
pub const DEFAULT_GEOFENCE_EXPIRATION: Duration = Duration::from_secs(2 * 60 * 60);

/// Circular region the platform should watch for one reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceRegistration {
    /// Equals the reminder id; arrivals are resolved through it.
    pub region_id: ReminderId,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f32,
    pub expiration_ms: u64,
    pub transitions: Vec<GeofenceTransition>,
    /// Fire immediately when the device is already inside on registration.
    pub initial_trigger_on_enter: bool,
}

impl GeofenceRegistration {
    /// Builds the default registration for `record`.
    ///
    /// Returns `None` for records without coordinates.
    pub fn for_reminder(record: &ReminderRecord) -> Option<Self> {
        let (latitude, longitude) = record.coordinates()?;
        Some(Self {
            region_id: record.id.clone(),
            latitude,
            longitude,
            radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
            expiration_ms: u64::try_from(DEFAULT_GEOFENCE_EXPIRATION.as_millis())
                .unwrap_or(u64::MAX),
            transitions: vec![GeofenceTransition::Enter],
            initial_trigger_on_enter: true,
        })
    }
}
