//! Shared building blocks for the VetLLM relay and chat client.
//!
//! Holds the JSON configuration, the top-level error type, the static
//! prompt catalog and the wire types exchanged between client, relay and
//! backend.

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::{ActionDescriptor, Catalog, Category, MultiStep, StepField, Substitution};
pub use config::VetConfig;
pub use error::{Result, VetError};
pub use types::*;
