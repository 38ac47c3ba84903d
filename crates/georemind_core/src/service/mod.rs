//! Core use-case services.
//!
//! # Responsibility
//! - Turn form input into repository calls.
//! - Keep host/UI layers decoupled from storage details.

pub mod reminder_service;
