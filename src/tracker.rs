//! Frame-to-frame tracker
//!
//! Each call to [`Tracker::track`] consumes one frame of detector output and
//! advances every entity's signal by exactly one bit: `1` for entities that
//! absorbed (or were created from) an observation, `0` for the rest.

use std::cmp::Reverse;

use crate::config::TrackerConfig;
use crate::errors::TrackingError;
use crate::traits::{AssignmentPolicy, GreedyFirstMatch};
use crate::types::{generation_length, EntityId, Observation, TrackedEntity};

/// Monotonic entity id source owned by a tracker
#[derive(Debug, Clone, Default)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Continue numbering from `start`
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Id the next call will return
    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

/// Summary of one tracking step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackReport {
    /// Signal length before this frame
    pub generation_len: usize,
    /// Observations absorbed by existing entities
    pub matched: usize,
    /// New entities created
    pub created: usize,
    /// Entities that received a miss
    pub missed: usize,
}

/// Assigns per-frame observations to persistent entities
#[derive(Debug, Clone)]
pub struct Tracker<A: AssignmentPolicy = GreedyFirstMatch> {
    config: TrackerConfig,
    policy: A,
    ids: IdCounter,
}

impl Tracker<GreedyFirstMatch> {
    /// Create a tracker using greedy first-match assignment
    pub fn new(config: TrackerConfig) -> Result<Self, TrackingError> {
        Self::with_policy(config, GreedyFirstMatch)
    }
}

impl<A: AssignmentPolicy> Tracker<A> {
    /// Create a tracker with a custom assignment policy
    pub fn with_policy(config: TrackerConfig, policy: A) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self {
            config,
            policy,
            ids: IdCounter::new(),
        })
    }

    /// Replace the id counter (e.g. to continue numbering from a previous run)
    pub fn with_ids(mut self, ids: IdCounter) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn policy(&self) -> &A {
        &self.policy
    }

    /// Id the next created entity will receive
    pub fn next_id(&self) -> EntityId {
        self.ids.peek()
    }

    /// Process one frame of observations.
    ///
    /// Every entity in `entities` must share one signal length. On return each
    /// of them (and every newly created entity) is exactly one bit longer, and
    /// the list is ordered by descending total activity.
    pub fn track(
        &mut self,
        entities: &mut Vec<TrackedEntity>,
        observations: &[Observation],
    ) -> Result<TrackReport, TrackingError> {
        let generation_len = generation_length(entities)?;
        let mut report = TrackReport {
            generation_len,
            ..TrackReport::default()
        };

        for observation in observations {
            let candidate = observation.to_estimate(self.config.observation_radius_scale);
            match self.policy.assign(
                entities,
                &candidate,
                generation_len,
                &self.config.similarity,
            )? {
                Some(idx) => {
                    entities[idx].record_hit(&candidate, &self.config);
                    report.matched += 1;
                }
                None => {
                    let id = self.ids.next_id();
                    log::trace!(
                        "New entity {} at ({:.1}, {:.1}) r={:.2}",
                        id,
                        candidate.position.x,
                        candidate.position.y,
                        candidate.radius
                    );
                    entities.push(TrackedEntity::create(id, candidate, generation_len));
                    report.created += 1;
                }
            }
        }

        for entity in entities.iter_mut() {
            if entity.signal.len() == generation_len {
                entity.append_miss();
                report.missed += 1;
            }
        }

        // Stable, so equally active entities keep their relative order
        entities.sort_by_key(|e| Reverse(e.signal.activity()));

        log::trace!(
            "Tracked frame {}: {} matched, {} created, {} missed",
            generation_len,
            report.matched,
            report.created,
            report.missed
        );
        Ok(report)
    }
}
