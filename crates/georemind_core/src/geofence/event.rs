//! Inbound geofence transition events.
//!
//! Wire format (JSON, camelCase):
//! `{"action":"GEOFENCE_EVENT","hasError":false,"errorCode":null,
//!   "transitionType":"ENTER","triggeredRegionIds":["r1"]}`

use serde::{Deserialize, Serialize};

/// Action tag carried by geofence transition deliveries.
pub const GEOFENCE_EVENT_ACTION: &str = "GEOFENCE_EVENT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeofenceTransition {
    Enter,
    Exit,
    Dwell,
}

/// One delivery from the platform geofencing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    pub action: String,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub error_code: Option<i32>,
    pub transition_type: GeofenceTransition,
    #[serde(default)]
    pub triggered_region_ids: Vec<String>,
}

impl GeofenceEvent {
    /// Clean "entered" delivery for the given regions.
    pub fn entered<I, T>(region_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::transition(GeofenceTransition::Enter, region_ids)
    }

    pub fn transition<I, T>(transition_type: GeofenceTransition, region_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            action: GEOFENCE_EVENT_ACTION.to_string(),
            has_error: false,
            error_code: None,
            transition_type,
            triggered_region_ids: region_ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Delivery that reports a platform error instead of a transition.
    pub fn failed(error_code: i32) -> Self {
        Self {
            action: GEOFENCE_EVENT_ACTION.to_string(),
            has_error: true,
            error_code: Some(error_code),
            transition_type: GeofenceTransition::Enter,
            triggered_region_ids: Vec::new(),
        }
    }

    pub fn is_geofence_action(&self) -> bool {
        self.action == GEOFENCE_EVENT_ACTION
    }
}

#[cfg(test)]
mod tests {
    use super::{GeofenceEvent, GeofenceTransition};

    #[test]
    fn entered_builds_clean_enter_event() {
        let event = GeofenceEvent::entered(["r1", "r2"]);
        assert!(event.is_geofence_action());
        assert!(!event.has_error);
        assert_eq!(event.transition_type, GeofenceTransition::Enter);
        assert_eq!(event.triggered_region_ids, vec!["r1", "r2"]);
    }

    #[test]
    fn failed_event_carries_error_code() {
        let event = GeofenceEvent::failed(1000);
        assert!(event.has_error);
        assert_eq!(event.error_code, Some(1000));
        assert!(event.triggered_region_ids.is_empty());
    }
}
