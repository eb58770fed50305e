//! Integration tests for tracking gates and the pruning stages
//!
//! Entities are built directly from hand-made signals so the expected
//! outcome of every round is known exactly.

mod helpers;

use flicker_tracker_rs::{
    AlwaysSample, EntityId, NeverSample, Observation, PruneConfig, Pruner, SimpleRng, Tracker,
    TrackerConfig, TrackingError,
};

use helpers::{entity_with_bits, ids, is_insufficient, square_bits};

#[test]
fn test_periodic_signal_beats_constant_lamp() {
    let pruner = Pruner::new(PruneConfig::default()).unwrap();
    let mut entities = vec![
        entity_with_bits(0, vec![1; 120]),
        entity_with_bits(1, square_bits(120, 6, 0)),
    ];
    let mut rng = SimpleRng::new(11);

    let report = pruner.prune(&mut entities, true, &mut rng).unwrap();

    assert_eq!(ids(&entities), vec![1]);
    let noise = report.noise.unwrap();
    assert_eq!(noise.eligible, 2);
    assert_eq!(noise.removed[0].id, EntityId(0));
    assert!(noise.cutoff.unwrap() > 0.0);
}

#[test]
fn test_exact_duplicates_collapse_to_one() {
    let pruner = Pruner::new(PruneConfig::default()).unwrap();
    let shared = square_bits(100, 4, 2);
    let mut entities = vec![entity_with_bits(0, shared.clone()), entity_with_bits(1, shared.clone())];
    let mut rng = SimpleRng::new(2);

    let report = pruner.prune(&mut entities, true, &mut rng).unwrap();

    assert_eq!(ids(&entities), vec![0]);
    assert_eq!(entities[0].signal.bits(), shared.as_slice());
    assert_eq!(report.merge.unwrap().removed.len(), 1);
    // A lone survivor cannot be clustered
    assert!(!report.noise.unwrap().classified());
}

#[test]
fn test_equal_metrics_are_reported_not_fatal() {
    let pruner = Pruner::new(PruneConfig::default()).unwrap();
    // Same duty cycle, uncorrelated periods: nothing to merge, nothing to split
    let mut entities = vec![
        entity_with_bits(0, square_bits(100, 5, 0)),
        entity_with_bits(1, square_bits(100, 10, 0)),
    ];
    let mut rng = SimpleRng::new(2);
    let report = pruner.prune_with(&mut entities, 90, true, &mut rng).unwrap();
    assert_eq!(entities.len(), 2);
    let noise = report.noise.unwrap();
    assert!(!noise.classified());
    assert!(is_insufficient(&noise.skipped));
}

#[test]
fn test_empty_collection_prunes_to_empty() {
    let pruner = Pruner::new(PruneConfig::default()).unwrap();
    let mut entities = Vec::new();
    let mut rng = SimpleRng::new(1);
    for force in [false, true] {
        let report = pruner.prune(&mut entities, force, &mut rng).unwrap();
        assert_eq!(report.removed(), 0);
        assert!(entities.is_empty());
    }
}

#[test]
fn test_unlit_entity_is_an_error() {
    let pruner = Pruner::new(PruneConfig::default()).unwrap();
    let mut entities = vec![entity_with_bits(0, vec![1; 10]), entity_with_bits(7, vec![0; 10])];
    let mut rng = SimpleRng::new(1);
    let err = pruner.prune(&mut entities, true, &mut rng).unwrap_err();
    assert_eq!(err, TrackingError::EmptySignal { id: EntityId(7) });
}

#[test]
fn test_mismatched_lengths_are_rejected() {
    let pruner = Pruner::new(PruneConfig::default()).unwrap();
    let mut entities = vec![entity_with_bits(0, vec![1; 10]), entity_with_bits(1, vec![1; 9])];
    let mut rng = SimpleRng::new(1);
    let err = pruner.prune(&mut entities, true, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        TrackingError::GenerationMismatch {
            expected: 10,
            actual: 9,
            ..
        }
    ));

    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    assert!(tracker
        .track(&mut entities, &[Observation::new(0.0, 0.0, 20.0)])
        .is_err());
}

#[test]
fn test_opportunistic_merging_follows_sampler() {
    let config = PruneConfig {
        opportunistic_merge: true,
        ..PruneConfig::default()
    };
    let shared = square_bits(100, 8, 0);
    let mut rng = SimpleRng::new(9);

    let never = Pruner::with_sampler(config, NeverSample).unwrap();
    let mut entities = vec![entity_with_bits(0, shared.clone()), entity_with_bits(1, shared.clone())];
    let report = never.prune(&mut entities, false, &mut rng).unwrap();
    assert!(!report.merge.unwrap().executed);
    assert_eq!(entities.len(), 2);

    let always = Pruner::with_sampler(config, AlwaysSample).unwrap();
    let report = always.prune(&mut entities, false, &mut rng).unwrap();
    assert!(report.merge.unwrap().executed);
    assert_eq!(ids(&entities), vec![0]);
}

#[test]
fn test_similarity_gate_scales_with_radius() {
    let config = TrackerConfig::default();
    // Detector radius 20 becomes an entity radius of 10

    let mut tracker = Tracker::new(config).unwrap();
    let mut entities = Vec::new();
    tracker
        .track(&mut entities, &[Observation::new(0.0, 0.0, 20.0)])
        .unwrap();
    // 12 px is 1.2 radii: same source
    let report = tracker
        .track(&mut entities, &[Observation::new(12.0, 0.0, 20.0)])
        .unwrap();
    assert_eq!(report.matched, 1);
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].signal.bits(), &[1, 1]);

    let mut tracker = Tracker::new(config).unwrap();
    let mut entities = Vec::new();
    tracker
        .track(&mut entities, &[Observation::new(0.0, 0.0, 20.0)])
        .unwrap();
    // 20 px is 2.0 radii: a new source
    let report = tracker
        .track(&mut entities, &[Observation::new(20.0, 0.0, 20.0)])
        .unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.missed, 1);
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0].signal.bits(), &[1, 0]);
    assert_eq!(entities[1].signal.bits(), &[0, 1]);
}

#[test]
fn test_dark_entity_gate_widens() {
    let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
    let mut entities = Vec::new();
    tracker
        .track(&mut entities, &[Observation::new(0.0, 0.0, 20.0)])
        .unwrap();
    for _ in 0..9 {
        tracker.track(&mut entities, &[]).unwrap();
    }
    // Dark for 9 frames: gate is 1.5 * (1 + ln 10) = 4.95 radii
    let report = tracker
        .track(&mut entities, &[Observation::new(45.0, 0.0, 20.0)])
        .unwrap();
    assert_eq!(report.matched, 1);
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].signal.activity(), 2);
}
