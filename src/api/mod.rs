//! HTTP API handlers for cd-catalog

pub mod collection;
pub mod health;
pub mod releases;

pub use collection::collection_routes;
pub use health::health_routes;
pub use releases::release_routes;
