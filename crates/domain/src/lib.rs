//! `lv-domain`: shared types for the liveness gateway.
//!
//! Holds the configuration tree, the error types, the liveness data model
//! (sources, sessions, results) and structured trace events. Everything
//! here is transport-agnostic; HTTP clients live in `lv-providers` and the
//! server in `lv-gateway`.

pub mod config;
pub mod error;
pub mod liveness;
pub mod trace;
