//! Notification payload and dispatcher implementations.
//!
//! # Invariants
//! - Dispatch is fire-and-forget: failures stay inside the dispatcher.
//! - Payload fields mirror the resolved record one-to-one.

use crate::model::reminder::{ReminderId, ReminderRecord};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Data needed to render one arrival notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub description: String,
    pub location_label: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub id: ReminderId,
}

impl From<ReminderRecord> for NotificationPayload {
    fn from(record: ReminderRecord) -> Self {
        Self {
            title: record.title,
            description: record.description,
            location_label: record.location_label,
            latitude: record.latitude,
            longitude: record.longitude,
            id: record.id,
        }
    }
}

/// Renders notifications for resolved arrivals.
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, payload: NotificationPayload);
}

/// Writes one log line per notification. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn notify(&self, payload: NotificationPayload) {
        info!(
            "event=notification_dispatch module=notify status=ok id={}",
            payload.id
        );
    }
}

/// Buffers payloads until the host drains and renders them.
#[derive(Debug, Default)]
pub struct CollectingDispatcher {
    pending: Mutex<Vec<NotificationPayload>>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every buffered payload in dispatch order.
    pub fn drain(&self) -> Vec<NotificationPayload> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }

    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationDispatcher for CollectingDispatcher {
    fn notify(&self, payload: NotificationPayload) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectingDispatcher, NotificationDispatcher, NotificationPayload};
    use crate::model::reminder::ReminderRecord;

    #[test]
    fn payload_copies_every_record_field() {
        let record = ReminderRecord::with_id(
            "r1",
            "Buy milk",
            "2% milk",
            "Corner Store",
            Some(40.0),
            Some(-73.0),
        );
        let payload = NotificationPayload::from(record);
        assert_eq!(payload.id, "r1");
        assert_eq!(payload.title, "Buy milk");
        assert_eq!(payload.description, "2% milk");
        assert_eq!(payload.location_label, "Corner Store");
        assert_eq!(payload.latitude, Some(40.0));
        assert_eq!(payload.longitude, Some(-73.0));
    }

    #[test]
    fn collecting_dispatcher_drains_in_order() {
        let dispatcher = CollectingDispatcher::new();
        for id in ["a", "b"] {
            dispatcher.notify(NotificationPayload::from(ReminderRecord::with_id(
                id, "t", "d", "l", None, None,
            )));
        }
        assert_eq!(dispatcher.len(), 2);

        let drained = dispatcher.drain();
        assert_eq!(
            drained.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(dispatcher.is_empty());
    }
}
