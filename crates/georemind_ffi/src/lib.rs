//! Flutter-facing bridge over `georemind_core`.

pub mod api;
