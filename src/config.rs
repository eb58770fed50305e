//! Configuration types for tracking and pruning
//!
//! Every threshold here was tuned empirically on real footage; the defaults
//! reproduce those values and everything can be overridden (or loaded from
//! JSON) without touching the algorithms.

use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;

/// Gate deciding whether an observation belongs to an existing entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Maximum movement between frames, in entity radii
    pub movement_threshold: f64,
    /// Maximum relative change in radius
    pub size_ratio_threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            movement_threshold: 1.5,
            size_ratio_threshold: 0.5,
        }
    }
}

/// Tracker parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Association gate
    pub similarity: SimilarityConfig,
    /// Weight of a new observation when smoothing position and radius
    pub smoothing_alpha: f64,
    /// Factor applied to detector radii (detectors report a diameter-like size)
    pub observation_radius_scale: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityConfig::default(),
            smoothing_alpha: 0.3,
            observation_radius_scale: 0.5,
        }
    }
}

/// Noise elimination parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Scale of the periodicity metric `scale * (p * (1 - p))^exponent`
    pub periodicity_scale: f64,
    /// Exponent of the periodicity metric
    pub periodicity_exponent: i32,
    /// Eligible entities needed before an unforced round classifies anything
    pub min_eligible: usize,
    /// Eligible entities needed before a forced round classifies anything
    pub forced_min_eligible: usize,
    /// Iteration cap for two-means clustering
    pub max_iterations: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            periodicity_scale: 32.0,
            periodicity_exponent: 5,
            min_eligible: 10,
            forced_min_eligible: 2,
            max_iterations: 100,
        }
    }
}

/// Duplicate merging parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Pearson correlation above which two suffixes are duplicates
    pub correlation_threshold: f64,
    /// Probability that an unforced merge round runs at all
    pub sampling_probability: f64,
    /// Width of the uniform jitter (centred on zero) added before re-binarising
    pub jitter_width: f64,
    /// Summed value a merged bit must exceed to be on
    pub merge_threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.8,
            sampling_probability: 0.05,
            jitter_width: 1.0,
            merge_threshold: 1.0,
        }
    }
}

/// Pruning parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Active frames an entity needs before it is classified or merged
    pub min_length: usize,
    /// Also try (sampled) merging on unforced rounds
    pub opportunistic_merge: bool,
    pub noise: NoiseConfig,
    pub merge: MergeConfig,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            min_length: 75,
            opportunistic_merge: false,
            noise: NoiseConfig::default(),
            merge: MergeConfig::default(),
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    pub prune: PruneConfig,
    /// Maturity threshold used by the forced prune at end of stream
    pub final_min_length: usize,
}

impl TrackerConfig {
    /// Check that all parameters are usable
    pub fn validate(&self) -> Result<(), TrackingError> {
        let sim = &self.similarity;
        if !(sim.movement_threshold.is_finite() && sim.movement_threshold > 0.0) {
            return Err(TrackingError::configuration(format!(
                "movement_threshold must be positive, got {}",
                sim.movement_threshold
            )));
        }
        if !(sim.size_ratio_threshold.is_finite() && sim.size_ratio_threshold >= 0.0) {
            return Err(TrackingError::configuration(format!(
                "size_ratio_threshold must be non-negative, got {}",
                sim.size_ratio_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_alpha) {
            return Err(TrackingError::configuration(format!(
                "smoothing_alpha must lie in [0, 1], got {}",
                self.smoothing_alpha
            )));
        }
        if !(self.observation_radius_scale.is_finite() && self.observation_radius_scale > 0.0) {
            return Err(TrackingError::configuration(format!(
                "observation_radius_scale must be positive, got {}",
                self.observation_radius_scale
            )));
        }
        Ok(())
    }
}

impl NoiseConfig {
    /// Check that all parameters are usable
    pub fn validate(&self) -> Result<(), TrackingError> {
        if !(self.periodicity_scale.is_finite() && self.periodicity_scale > 0.0) {
            return Err(TrackingError::configuration(format!(
                "periodicity_scale must be positive, got {}",
                self.periodicity_scale
            )));
        }
        if self.periodicity_exponent < 1 {
            return Err(TrackingError::configuration(format!(
                "periodicity_exponent must be at least 1, got {}",
                self.periodicity_exponent
            )));
        }
        if self.forced_min_eligible < 2 || self.min_eligible < 2 {
            return Err(TrackingError::configuration(
                "clustering needs at least 2 eligible entities",
            ));
        }
        if self.max_iterations == 0 {
            return Err(TrackingError::configuration("max_iterations must be non-zero"));
        }
        Ok(())
    }
}

impl MergeConfig {
    /// Check that all parameters are usable
    pub fn validate(&self) -> Result<(), TrackingError> {
        if !(-1.0..=1.0).contains(&self.correlation_threshold) {
            return Err(TrackingError::configuration(format!(
                "correlation_threshold must lie in [-1, 1], got {}",
                self.correlation_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.sampling_probability) {
            return Err(TrackingError::configuration(format!(
                "sampling_probability must lie in [0, 1], got {}",
                self.sampling_probability
            )));
        }
        if !(self.jitter_width.is_finite() && self.jitter_width > 0.0) {
            return Err(TrackingError::configuration(format!(
                "jitter_width must be positive, got {}",
                self.jitter_width
            )));
        }
        if !self.merge_threshold.is_finite() {
            return Err(TrackingError::configuration("merge_threshold must be finite"));
        }
        Ok(())
    }
}

impl PruneConfig {
    /// Check that all parameters are usable
    pub fn validate(&self) -> Result<(), TrackingError> {
        self.noise.validate()?;
        self.merge.validate()
    }
}

impl PipelineConfig {
    /// Check that all parameters are usable
    pub fn validate(&self) -> Result<(), TrackingError> {
        self.tracker.validate()?;
        self.prune.validate()
    }

    /// Parse a (possibly partial) configuration from JSON.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, TrackingError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            TrackingError::configuration(format!("invalid pipeline config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.prune.min_length, 75);
        assert_eq!(cfg.final_min_length, 0);
        assert_eq!(cfg.tracker.similarity.movement_threshold, 1.5);
        assert_eq!(cfg.prune.merge.correlation_threshold, 0.8);
        assert_eq!(cfg.prune.noise.periodicity_exponent, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut cfg = PipelineConfig::default();
        cfg.prune.merge.sampling_probability = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(TrackingError::Configuration { .. })
        ));

        let mut cfg = PipelineConfig::default();
        cfg.tracker.smoothing_alpha = -0.1;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.prune.noise.forced_min_eligible = 1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let cfg = PipelineConfig::from_json(
            r#"{ "prune": { "min_length": 40, "merge": { "correlation_threshold": 0.9 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.prune.min_length, 40);
        assert_eq!(cfg.prune.merge.correlation_threshold, 0.9);
        assert_eq!(cfg.prune.merge.sampling_probability, 0.05);
        assert_eq!(cfg.tracker, TrackerConfig::default());
    }

    #[test]
    fn test_bad_json() {
        assert!(PipelineConfig::from_json("{ not json").is_err());
        assert!(PipelineConfig::from_json(r#"{ "tracker": { "smoothing_alpha": 2.0 } }"#).is_err());
    }
}
