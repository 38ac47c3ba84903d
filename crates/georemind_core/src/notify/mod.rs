//! Notification dispatch boundary.
//!
//! Rendering a user-visible notification belongs to the host platform; core
//! only builds the payload and hands it over.

pub mod dispatcher;
