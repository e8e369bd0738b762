//! Error types for the abonar recommendation service
//!
//! Startup errors (`ArtifactError`, `InvalidConfiguration`, `IoError`) are
//! fatal: the process refuses to serve with incomplete or inconsistent
//! artifacts. Request errors (`InvalidCategory`, `UnmappablePrediction`) are
//! scoped to a single request and translated to HTTP status codes at the API
//! boundary.

use thiserror::Error;

/// Error type for all abonar operations
#[derive(Debug, Error)]
pub enum AbonarError {
    /// An artifact file is missing or could not be parsed (fatal, startup only)
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactError {
        /// Path of the artifact file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// Loaded artifacts are mutually inconsistent (fatal, startup only)
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What went wrong
        reason: String,
    },

    /// A soil or crop ID has no entry in its reverse mapping
    #[error("Invalid {domain} ID: {id}")]
    InvalidCategory {
        /// Category domain name ("soil" or "crop")
        domain: &'static str,
        /// The ID that failed to resolve
        id: i64,
    },

    /// The model produced a class code with no fertilizer mapping
    #[error("Could not map predicted class {class_code} to a fertilizer name")]
    UnmappablePrediction {
        /// The unmapped class code
        class_code: i64,
    },

    /// Filesystem error while reading artifacts
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AbonarError {
    /// Whether this error is scoped to a single request
    ///
    /// Fatal errors abort startup; request errors never affect other
    /// in-flight requests.
    #[must_use]
    pub fn is_request_scoped(&self) -> bool {
        matches!(
            self,
            Self::InvalidCategory { .. } | Self::UnmappablePrediction { .. }
        )
    }
}

/// Result type alias using `AbonarError`
pub type Result<T> = std::result::Result<T, AbonarError>;
