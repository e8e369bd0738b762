//! # Abonar
//!
//! Fertilizer recommendation service over a pre-trained tabular classifier.
//!
//! Abonar (Spanish: "to fertilize") loads a trained model bundle once at
//! startup and serves recommendation requests over HTTP. Each request carries
//! six numeric soil and weather measurements plus soil and crop category IDs;
//! the service rebuilds the one-hot encoded feature row the model was trained
//! on, standardizes it, predicts, and maps the predicted class back to a
//! fertilizer name.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use abonar::api::{create_router, AppState};
//! use abonar::artifact::Artifacts;
//!
//! let artifacts = Arc::new(Artifacts::load(Path::new("artifacts"))?);
//! let app = create_router(AppState::new(artifacts));
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## Architecture
//!
//! - [`artifact`] loads and cross-validates the four serialized model objects
//! - [`mapper`] holds bidirectional category name/code lookups
//! - [`features`] rebuilds schema-aligned feature rows from decoded inputs
//! - [`model`] evaluates the standardization transform and linear classifier
//! - [`service`] composes the above into one recommendation operation
//! - [`api`] exposes the HTTP surface
//! - [`metrics`] counts request outcomes for monitoring

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

pub mod api;
pub mod artifact;
pub mod error;
pub mod features;
pub mod mapper;
pub mod metrics;
pub mod model;
pub mod service;

pub use error::{AbonarError, Result};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.chars().next().unwrap().is_ascii_digit());
    }
}
