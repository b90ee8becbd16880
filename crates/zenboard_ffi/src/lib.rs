//! Flutter-facing bindings for the Zenboard widget core.

pub mod api;
