//! Error types for the tracking and pruning pipeline
//!
//! Invariant violations are returned as errors instead of panicking; data
//! shortages (too few entities to cluster) are reported so callers can skip
//! the round and carry on with the next frame.

use std::fmt;

use crate::types::EntityId;

/// Errors that can occur while tracking or pruning entities
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// An entity with no `1` bit was asked for its active window
    EmptySignal {
        /// Offending entity
        id: EntityId,
    },

    /// Clustering was attempted without enough distinct samples
    InsufficientData {
        /// Distinct samples needed
        required: usize,
        /// Distinct samples available
        available: usize,
    },

    /// An entity's signal length differs from the rest of the collection
    GenerationMismatch {
        /// Offending entity
        id: EntityId,
        /// Length shared by the collection
        expected: usize,
        /// Length of the offending entity
        actual: usize,
    },

    /// Configuration error
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// Scenario file could not be read or parsed
    Scenario {
        /// Description of the failure
        description: String,
    },
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::EmptySignal { id } => {
                write!(f, "Entity {} has no active frame in its signal", id)
            }
            TrackingError::InsufficientData {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient data for clustering: need {} distinct samples, got {}",
                    required, available
                )
            }
            TrackingError::GenerationMismatch {
                id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Signal length mismatch for entity {}: expected {}, got {}",
                    id, expected, actual
                )
            }
            TrackingError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            TrackingError::Scenario { description } => {
                write!(f, "Scenario error: {}", description)
            }
        }
    }
}

impl std::error::Error for TrackingError {}

impl TrackingError {
    /// Whether the pipeline may skip the current round and continue.
    ///
    /// Only data shortages are recoverable; everything else is a bug or
    /// a bad input that should stop the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrackingError::InsufficientData { .. })
    }

    pub(crate) fn configuration(description: impl Into<String>) -> Self {
        TrackingError::Configuration {
            description: description.into(),
        }
    }
}
