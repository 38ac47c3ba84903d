//! Reminder repository: the only data entry point for other layers.
//!
//! # Responsibility
//! - Define the async `ReminderDataSource` contract consumed by services,
//!   the arrival resolver and host bridges.
//! - Normalize every store outcome into `RepoResult<T>`.
//!
//! # Invariants
//! - A missing reminder is `RepoError::NotFound`, displayed as
//!   `Reminder not found`.
//! - Store failures never escape as panics; they become `RepoError::Store`.

pub mod reminder_repo;
