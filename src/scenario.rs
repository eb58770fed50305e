//! Scenario loading and synthetic stream generation.
//!
//! This module provides:
//! - JSON schema for recorded detector output
//! - Conversion to per-frame [`Observation`] lists
//! - A synthetic generator of blinking light sources

use std::fs;
use std::path::Path;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;
use crate::types::{Observation, Position};

// =============================================================================
// JSON Schema for Scenario Files
// =============================================================================

/// Root structure for scenario JSON files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioJson {
    /// Optional human-readable label
    #[serde(default)]
    pub name: Option<String>,
    pub frames: Vec<FrameJson>,
}

/// Detector output for one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameJson {
    #[serde(default)]
    pub observations: Vec<ObservationJson>,
}

/// One detected blob
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObservationJson {
    pub position: [f64; 2],
    pub radius: f64,
}

impl ScenarioJson {
    /// Parse a scenario from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TrackingError> {
        let scenario: Self = serde_json::from_str(json).map_err(|e| TrackingError::Scenario {
            description: format!("invalid scenario JSON: {}", e),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Build a scenario from already generated frames
    pub fn from_frames(frames: &[Vec<Observation>]) -> Self {
        Self {
            name: None,
            frames: frames
                .iter()
                .map(|obs| FrameJson {
                    observations: obs
                        .iter()
                        .map(|o| ObservationJson {
                            position: [o.position.x, o.position.y],
                            radius: o.radius,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Reject non-finite coordinates and non-positive radii
    pub fn validate(&self) -> Result<(), TrackingError> {
        for (t, frame) in self.frames.iter().enumerate() {
            for obs in &frame.observations {
                let finite = obs.position.iter().all(|v| v.is_finite());
                if !finite || !(obs.radius.is_finite() && obs.radius > 0.0) {
                    return Err(TrackingError::Scenario {
                        description: format!(
                            "frame {}: invalid observation {:?} r={}",
                            t, obs.position, obs.radius
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Per-frame observation lists ready for the pipeline
    pub fn observations(&self) -> Vec<Vec<Observation>> {
        self.frames
            .iter()
            .map(|frame| {
                frame
                    .observations
                    .iter()
                    .map(|o| Observation::new(o.position[0], o.position[1], o.radius))
                    .collect()
            })
            .collect()
    }
}

/// Load a scenario from a JSON file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioJson, TrackingError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| TrackingError::Scenario {
        description: format!("cannot read {}: {}", path.display(), e),
    })?;
    ScenarioJson::from_json(&content)
}

// =============================================================================
// Synthetic Sources
// =============================================================================

/// A light that switches on and off with a fixed period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlinkingSource {
    pub position: Position,
    /// Detector radius reported while the light is on
    pub radius: f64,
    /// Frames per on/off cycle
    pub period: usize,
    /// Frames per cycle the light is on
    pub on_frames: usize,
    /// Frames to delay the cycle by
    pub phase: usize,
    /// Standard deviation of per-frame position noise (0 = none)
    pub jitter_std: f64,
}

impl BlinkingSource {
    /// A 50% duty-cycle light
    pub fn square(x: f64, y: f64, radius: f64, period: usize) -> Self {
        Self {
            position: Position::new(x, y),
            radius,
            period,
            on_frames: period / 2,
            phase: 0,
            jitter_std: 0.0,
        }
    }

    /// A lamp that never switches off
    pub fn steady(x: f64, y: f64, radius: f64) -> Self {
        Self {
            position: Position::new(x, y),
            radius,
            period: 1,
            on_frames: 1,
            phase: 0,
            jitter_std: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: usize) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_jitter(mut self, std: f64) -> Self {
        self.jitter_std = std;
        self
    }

    /// Whether the light is on at `frame`
    pub fn is_on(&self, frame: usize) -> bool {
        if self.period == 0 || frame < self.phase {
            return false;
        }
        (frame - self.phase) % self.period < self.on_frames
    }
}

/// Render `num_frames` frames of detector output for `sources`.
///
/// Observations within a frame appear in source order.
pub fn synthesize_frames<R: Rng + ?Sized>(
    sources: &[BlinkingSource],
    num_frames: usize,
    rng: &mut R,
) -> Result<Vec<Vec<Observation>>, TrackingError> {
    let noise = sources
        .iter()
        .map(|s| {
            if s.jitter_std > 0.0 {
                Normal::new(0.0, s.jitter_std)
                    .map(Some)
                    .map_err(|e| TrackingError::Scenario {
                        description: format!("invalid jitter {}: {}", s.jitter_std, e),
                    })
            } else {
                Ok(None)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let frames = (0..num_frames)
        .map(|t| {
            sources
                .iter()
                .zip(&noise)
                .filter(|(s, _)| s.is_on(t))
                .map(|(s, n)| {
                    let (dx, dy) = match n {
                        Some(n) => (n.sample(rng), n.sample(rng)),
                        None => (0.0, 0.0),
                    };
                    Observation::new(s.position.x + dx, s.position.y + dy, s.radius)
                })
                .collect()
        })
        .collect();
    Ok(frames)
}
