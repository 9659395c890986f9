//! Domain logic for the flowshelf workflow catalog.
//!
//! Everything in this crate is synchronous and free of I/O except for the
//! [`source::WorkflowSource`] and [`settings::SettingsRepository`] seams,
//! which the host crates implement. The API server and the tests drive the
//! same [`controller::CatalogController`].

pub mod browse;
pub mod controller;
pub mod error;
pub mod record;
pub mod routing;
pub mod settings;
pub mod source;
