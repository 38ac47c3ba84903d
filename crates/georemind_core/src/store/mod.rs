//! Durable record storage for reminders.
//!
//! # Responsibility
//! - Keep SQL details behind a narrow CRUD contract.
//! - Report engine failures as errors, never as empty results.
//!
//! # Invariants
//! - Reminder ids are unique across the store at all times.
//! - A missing row is `Ok(None)`, not an error.

pub mod reminder_store;
