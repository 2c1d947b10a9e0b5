//! # syncd-api
//!
//! Control-plane HTTP API for the infrastructure sync daemon: task
//! lifecycle endpoints, status aggregation, and health checks. The
//! `Controller` trait is the seam between this crate's
//! transport/validation/status logic and the embedding application's
//! driver registry and event store.

pub mod context;
pub mod controller;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod query;
pub mod routes;
pub mod schema;
pub mod state;
pub mod status;
pub mod transport;
pub mod wire;

pub use controller::{Controller, InMemoryController, InspectPlan, SharedController};
pub use state::ApiState;
