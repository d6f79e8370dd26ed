//! HTTP API handlers for tiraz-api
//!
//! Everything except `/health` is mounted under the configured API prefix.

pub mod catalog;
pub mod health;
pub mod measurements;

pub use catalog::catalog_routes;
pub use health::health_routes;
pub use measurements::measurement_routes;
