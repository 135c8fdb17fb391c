//! Flutter-facing bindings for the devotional tracker core.

pub mod api;
