//! Noise elimination by periodicity clustering
//!
//! A data-bearing light blinks, so inside its active window it is on for
//! roughly half the frames. Steady lamps, reflections and detector flicker
//! are almost always on or almost always off. Each mature entity is scored
//! with a periodicity metric that peaks at a 50% duty cycle, the scores are
//! split into two clusters, and the lower cluster is discarded.

use std::collections::BTreeSet;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::common::stats::two_means;
use crate::config::NoiseConfig;
use crate::errors::TrackingError;
use crate::types::{generation_length, EntityId, TrackedEntity};

/// `scale * (p * (1 - p))^exponent` for duty cycle `p`.
///
/// With the default scale of 32 and exponent 5 the maximum (at `p = 0.5`) is
/// `1/32`; a constant signal scores 0.
#[inline]
pub fn periodicity_metric(duty_cycle: f64, config: &NoiseConfig) -> f64 {
    config.periodicity_scale * (duty_cycle * (1.0 - duty_cycle)).powi(config.periodicity_exponent)
}

/// Outcome of one noise-elimination round
#[derive(Debug, Clone, Default)]
pub struct NoiseReport {
    /// Entities mature enough to be classified
    pub eligible: usize,
    /// Periodicity metric of each eligible entity
    pub metrics: Vec<(EntityId, f64)>,
    /// Classification boundary, if a classification happened
    pub cutoff: Option<f64>,
    /// Entities removed as noise
    pub removed: Vec<TrackedEntity>,
    /// Why the classification was skipped despite enough eligible entities
    pub skipped: Option<TrackingError>,
}

impl NoiseReport {
    /// Whether the round actually split the entities into signal and noise
    pub fn classified(&self) -> bool {
        self.cutoff.is_some()
    }
}

/// Removes entities whose signal does not look periodic
#[derive(Debug, Clone, Default)]
pub struct NoiseEliminator {
    config: NoiseConfig,
}

impl NoiseEliminator {
    pub fn new(config: NoiseConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Classify mature entities and delete the noise cluster.
    ///
    /// Entities whose active window is shorter than `min_length` are left
    /// alone. Classification needs `min_eligible` mature entities, or
    /// `forced_min_eligible` when `force` is set. Eligible entities are
    /// flagged with `marked_for_plot`.
    pub fn eliminate_noise(
        &self,
        entities: &mut Vec<TrackedEntity>,
        min_length: usize,
        force: bool,
    ) -> Result<NoiseReport, TrackingError> {
        let n = generation_length(entities)?;
        let mut report = NoiseReport::default();

        let starts = entities
            .iter()
            .map(TrackedEntity::first_active)
            .collect::<Result<Vec<_>, _>>()?;

        let eligible: Vec<usize> = starts
            .iter()
            .enumerate()
            .filter(|&(_, &start)| n - start >= min_length)
            .map(|(idx, _)| idx)
            .collect();

        let metrics = self.compute_metrics(entities, &starts, &eligible);
        for &idx in &eligible {
            entities[idx].marked_for_plot = true;
        }
        report.eligible = eligible.len();
        report.metrics = eligible
            .iter()
            .zip(&metrics)
            .map(|(&idx, &m)| (entities[idx].id, m))
            .collect();

        let threshold = if force {
            self.config.forced_min_eligible
        } else {
            self.config.min_eligible
        };
        if eligible.len() < threshold {
            log::trace!(
                "Noise round skipped: {} eligible of {} (need {})",
                eligible.len(),
                entities.len(),
                threshold
            );
            return Ok(report);
        }

        let split = match two_means(&metrics, self.config.max_iterations) {
            Ok(split) => split,
            Err(e) if e.is_recoverable() => {
                log::warn!("Noise classification skipped: {}", e);
                report.skipped = Some(e);
                return Ok(report);
            }
            Err(e) => return Err(e),
        };
        let cutoff = split.cutoff();
        report.cutoff = Some(cutoff);

        let doomed: BTreeSet<usize> = eligible
            .iter()
            .zip(&metrics)
            .filter(|&(_, &m)| m < cutoff)
            .map(|(&idx, _)| idx)
            .collect();

        // Highest index first keeps the remaining indices valid
        for &idx in doomed.iter().rev() {
            report.removed.push(entities.remove(idx));
        }
        report.removed.reverse();

        log::debug!(
            "Noise round: {} eligible, cutoff {:.5}, removed {}, kept {}",
            report.eligible,
            cutoff,
            report.removed.len(),
            entities.len()
        );
        Ok(report)
    }

    #[cfg(not(feature = "rayon"))]
    fn compute_metrics(
        &self,
        entities: &[TrackedEntity],
        starts: &[usize],
        eligible: &[usize],
    ) -> Vec<f64> {
        eligible
            .iter()
            .map(|&idx| {
                let duty = entities[idx].signal.duty_cycle_from(starts[idx]);
                periodicity_metric(duty, &self.config)
            })
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn compute_metrics(
        &self,
        entities: &[TrackedEntity],
        starts: &[usize],
        eligible: &[usize],
    ) -> Vec<f64> {
        eligible
            .par_iter()
            .map(|&idx| {
                let duty = entities[idx].signal.duty_cycle_from(starts[idx]);
                periodicity_metric(duty, &self.config)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use crate::types::BlobEstimate;

    fn entity(id: u64, bits: Vec<u8>) -> TrackedEntity {
        TrackedEntity::with_signal(
            EntityId(id),
            BlobEstimate::new(id as f64 * 100.0, 0.0, 10.0),
            Signal::from_bits(bits),
        )
    }

    fn periodic(len: usize, half_period: usize) -> Vec<u8> {
        (0..len).map(|t| u8::from((t / half_period) % 2 == 0)).collect()
    }

    fn eliminator() -> NoiseEliminator {
        NoiseEliminator::new(NoiseConfig::default()).unwrap()
    }

    #[test]
    fn test_periodicity_metric() {
        let cfg = NoiseConfig::default();
        assert!((periodicity_metric(0.5, &cfg) - 1.0 / 32.0).abs() < 1e-15);
        assert_eq!(periodicity_metric(0.0, &cfg), 0.0);
        assert_eq!(periodicity_metric(1.0, &cfg), 0.0);
        assert!(periodicity_metric(0.4, &cfg) < periodicity_metric(0.5, &cfg));
    }

    #[test]
    fn test_forced_separation() {
        let mut entities = vec![entity(0, vec![1; 100]), entity(1, periodic(100, 5))];
        let report = eliminator().eliminate_noise(&mut entities, 75, true).unwrap();

        assert_eq!(report.eligible, 2);
        assert!(report.classified());
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, EntityId(1));
        assert!(entities[0].marked_for_plot);
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].id, EntityId(0));
    }

    #[test]
    fn test_unforced_needs_ten_eligible() {
        let mut entities = vec![entity(0, vec![1; 100]), entity(1, periodic(100, 5))];
        let report = eliminator().eliminate_noise(&mut entities, 75, false).unwrap();
        assert_eq!(report.eligible, 2);
        assert!(!report.classified());
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_unforced_with_many_entities() {
        let mut entities = Vec::new();
        for id in 0..6 {
            entities.push(entity(id, periodic(100, 4)));
        }
        for id in 6..10 {
            entities.push(entity(id, vec![1; 100]));
        }
        let report = eliminator().eliminate_noise(&mut entities, 75, false).unwrap();
        assert_eq!(report.eligible, 10);
        assert_eq!(entities.len(), 6);
        assert!(entities.iter().all(|e| e.id.0 < 6));
        let removed: Vec<u64> = report.removed.iter().map(|e| e.id.0).collect();
        assert_eq!(removed, vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_immature_entities_are_exempt() {
        let mut young = vec![0u8; 60];
        young.extend(vec![1u8; 40]);
        let mut entities = vec![
            entity(0, vec![1; 100]),
            entity(1, periodic(100, 5)),
            entity(2, young),
        ];
        let report = eliminator().eliminate_noise(&mut entities, 75, true).unwrap();
        assert_eq!(report.eligible, 2);
        let ids: Vec<u64> = entities.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!entities[1].marked_for_plot);
    }

    #[test]
    fn test_identical_metrics_skip_round() {
        let mut entities = vec![entity(0, periodic(100, 5)), entity(1, periodic(100, 5))];
        let report = eliminator().eliminate_noise(&mut entities, 75, true).unwrap();
        assert!(!report.classified());
        assert!(matches!(
            report.skipped,
            Some(TrackingError::InsufficientData { .. })
        ));
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_single_eligible_forced_is_skipped() {
        let mut entities = vec![entity(0, vec![1; 100])];
        let report = eliminator().eliminate_noise(&mut entities, 75, true).unwrap();
        assert_eq!(report.eligible, 1);
        assert!(!report.classified());
        assert!(report.skipped.is_none());
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn test_empty_signal_is_an_error() {
        let mut entities = vec![entity(0, vec![0; 10])];
        let err = eliminator().eliminate_noise(&mut entities, 0, true).unwrap_err();
        assert_eq!(err, TrackingError::EmptySignal { id: EntityId(0) });
    }
}
