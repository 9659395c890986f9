//! flowshelf API server library.
//!
//! Exposes the building blocks (config, state, settings storage, fetch
//! orchestration, error handling, routes) so integration tests and the
//! binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod settings_store;
pub mod state;
