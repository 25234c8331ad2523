//! HTTP facade over the liveness workflow.
//!
//! `main.rs` is a thin shell over this library so the router, bootstrap
//! and coordinator can be driven directly from integration tests.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
pub mod telemetry;
