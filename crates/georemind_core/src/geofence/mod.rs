//! Geofence boundary: registration requests going out to the platform and
//! arrival events coming back in.
//!
//! # Responsibility
//! - Describe what the platform geofencing client should watch.
//! - Resolve "region entered" events into notifications.
//!
//! # Invariants
//! - A region identifier always equals the id of the reminder it watches.
//! - Geofence geometry and sensing stay on the platform side.

pub mod event;
pub mod registration;
pub mod resolver;
