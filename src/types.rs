//! Observation and tracked-entity types
//!
//! An [`Observation`] is what the detector reports for one frame. A
//! [`TrackedEntity`] is the persistent hypothesis that a series of
//! observations comes from the same physical light source.

use std::fmt;

use nalgebra::Vector2;

use crate::config::{SimilarityConfig, TrackerConfig};
use crate::errors::TrackingError;
use crate::signal::Signal;

/// 2D image coordinate
pub type Position = Vector2<f64>;

/// Unique entity identifier, assigned in creation order and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw light-blob detection for a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Blob centre
    pub position: Position,
    /// Blob size as reported by the detector
    pub radius: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            position: Position::new(x, y),
            radius,
        }
    }

    /// Convert to a blob estimate, rescaling the detector radius
    pub fn to_estimate(&self, radius_scale: f64) -> BlobEstimate {
        BlobEstimate {
            position: self.position,
            radius: self.radius * radius_scale,
        }
    }
}

/// Position and size of a blob in tracker units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobEstimate {
    pub position: Position,
    pub radius: f64,
}

impl BlobEstimate {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            position: Position::new(x, y),
            radius,
        }
    }
}

/// One physical light source followed across frames
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity {
    /// Unique identifier
    pub id: EntityId,
    /// Smoothed blob centre
    pub position: Position,
    /// Smoothed blob radius
    pub radius: f64,
    /// On/off history, one bit per frame
    pub signal: Signal,
    /// Set once the entity has been classified as signal-bearing
    pub marked_for_plot: bool,
}

impl TrackedEntity {
    /// Create an entity first seen after `prior_frames` frames.
    ///
    /// Its signal is `prior_frames` zeros followed by a single `1`.
    pub fn create(id: EntityId, estimate: BlobEstimate, prior_frames: usize) -> Self {
        Self {
            id,
            position: estimate.position,
            radius: estimate.radius,
            signal: Signal::emerging(prior_frames),
            marked_for_plot: false,
        }
    }

    /// Build an entity around an existing signal
    pub fn with_signal(id: EntityId, estimate: BlobEstimate, signal: Signal) -> Self {
        Self {
            id,
            position: estimate.position,
            radius: estimate.radius,
            signal,
            marked_for_plot: false,
        }
    }

    /// Current position and radius
    pub fn estimate(&self) -> BlobEstimate {
        BlobEstimate {
            position: self.position,
            radius: self.radius,
        }
    }

    /// Index of the frame the entity was first lit
    pub fn first_active(&self) -> Result<usize, TrackingError> {
        self.signal
            .first_active()
            .ok_or(TrackingError::EmptySignal { id: self.id })
    }

    /// Frames elapsed since the entity was last lit (0 if lit in the latest frame)
    pub fn frames_since_active(&self) -> Result<usize, TrackingError> {
        let last = self
            .signal
            .last_active()
            .ok_or(TrackingError::EmptySignal { id: self.id })?;
        Ok(self.signal.len() - 1 - last)
    }

    /// Number of frames from first activation to now
    pub fn active_window(&self) -> Result<usize, TrackingError> {
        Ok(self.signal.len() - self.first_active()?)
    }

    /// Whether `other` is plausibly the same light source in a later frame.
    ///
    /// The movement gate is measured in this entity's radii and widened
    /// logarithmically with the number of frames the entity has been dark,
    /// since an unlit source may have drifted.
    ///
    /// The dark count is [`frames_since_active`](Self::frames_since_active),
    /// which is 0 for an entity lit in the latest frame. This is one frame less
    /// than `len - last_active`, so a just-seen entity gets multiplier
    /// `1 + ln 1 = 1` rather than `1 + ln 2`.
    pub fn similar_to(
        &self,
        other: &BlobEstimate,
        config: &SimilarityConfig,
    ) -> Result<bool, TrackingError> {
        let dark = self.frames_since_active()? as f64;
        let multiplier = 1.0 + (dark + 1.0).ln();

        let distance = (self.position - other.position).norm() / self.radius;
        if distance > config.movement_threshold * multiplier {
            return Ok(false);
        }

        let size_change = (self.radius - other.radius).abs() / self.radius;
        Ok(size_change <= config.size_ratio_threshold)
    }

    /// Blend a matched observation into the position and radius estimate.
    ///
    /// The caller records the hit in the signal.
    pub fn merge_observation(&mut self, other: &BlobEstimate, alpha: f64) {
        self.position = other.position * alpha + self.position * (1.0 - alpha);
        self.radius = alpha * other.radius + (1.0 - alpha) * self.radius;
    }

    /// Record a matched observation for the current frame
    pub fn record_hit(&mut self, other: &BlobEstimate, config: &TrackerConfig) {
        self.merge_observation(other, config.smoothing_alpha);
        self.signal.push(true);
    }

    /// Record that the entity was not seen in the current frame
    pub fn append_miss(&mut self) {
        self.signal.push(false);
    }
}

/// Signal length shared by every entity in `entities` (0 if empty).
///
/// Fails if any entity disagrees with the first one.
pub fn generation_length(entities: &[TrackedEntity]) -> Result<usize, TrackingError> {
    let Some(first) = entities.first() else {
        return Ok(0);
    };
    let expected = first.signal.len();
    if let Some(bad) = entities.iter().find(|e| e.signal.len() != expected) {
        return Err(TrackingError::GenerationMismatch {
            id: bad.id,
            expected,
            actual: bad.signal.len(),
        });
    }
    Ok(expected)
}
