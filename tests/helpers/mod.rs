//! Shared builders for integration tests
#![allow(dead_code)]

use flicker_tracker_rs::scenario::{synthesize_frames, BlinkingSource};
use flicker_tracker_rs::{
    BlobEstimate, EntityId, Observation, Signal, SimpleRng, TrackedEntity, TrackingError,
};

/// Square wave with `half_period` frames on, `half_period` off, starting at `delay`
pub fn square_bits(len: usize, half_period: usize, delay: usize) -> Vec<u8> {
    (0..len)
        .map(|t| u8::from(t >= delay && ((t - delay) / half_period) % 2 == 0))
        .collect()
}

/// Entity with a hand-made signal, placed far from its neighbours
pub fn entity_with_bits(id: u64, bits: Vec<u8>) -> TrackedEntity {
    TrackedEntity::with_signal(
        EntityId(id),
        BlobEstimate::new(id as f64 * 100.0, 0.0, 10.0),
        Signal::from_bits(bits),
    )
}

/// Deterministic detector output for `sources`
pub fn frames(sources: &[BlinkingSource], num_frames: usize) -> Vec<Vec<Observation>> {
    let mut rng = SimpleRng::new(1234);
    match synthesize_frames(sources, num_frames, &mut rng) {
        Ok(frames) => frames,
        Err(e) => panic!("synthesis failed: {}", e),
    }
}

/// Assert every entity shares `expected` as its signal length
pub fn assert_generation(entities: &[TrackedEntity], expected: usize) {
    for e in entities {
        assert_eq!(
            e.signal.len(),
            expected,
            "entity {} has signal length {}",
            e.id,
            e.signal.len()
        );
    }
}

pub fn ids(entities: &[TrackedEntity]) -> Vec<u64> {
    entities.iter().map(|e| e.id.0).collect()
}

pub fn is_insufficient(err: &Option<TrackingError>) -> bool {
    matches!(err, Some(TrackingError::InsufficientData { .. }))
}
