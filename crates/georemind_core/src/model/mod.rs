//! Domain model for location-bound reminders.
//!
//! # Responsibility
//! - Define the persisted reminder shape shared by store, repository and
//!   arrival resolution.
//! - Define the unvalidated draft shape produced by input forms.
//!
//! # Invariants
//! - Every reminder is identified by a stable `ReminderId`.
//! - A reminder's id doubles as the region identifier of its geofence.

pub mod reminder;
