//! Frame-driven tracking pipeline
//!
//! Owns the entity collection and runs, per frame, tracking followed by an
//! unforced prune. When the stream ends a single forced prune collapses
//! duplicates and removes noise before the signals are handed to a decoder.

use rand::Rng;

use crate::config::PipelineConfig;
use crate::errors::TrackingError;
use crate::pruner::{PruneReport, Pruner};
use crate::reporter::{NoOpReporter, PipelineReporter};
use crate::tracker::{TrackReport, Tracker};
use crate::traits::{AssignmentPolicy, BernoulliSampler, GreedyFirstMatch, MergeSampler};
use crate::types::{Observation, TrackedEntity};

/// Result of processing one frame
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    pub track: TrackReport,
    pub prune: PruneReport,
}

/// Tracker + pruner driven one frame at a time
#[derive(Debug)]
pub struct Pipeline<
    A: AssignmentPolicy = GreedyFirstMatch,
    S: MergeSampler = BernoulliSampler,
    Rep: PipelineReporter = NoOpReporter,
> {
    tracker: Tracker<A>,
    pruner: Pruner<S>,
    reporter: Rep,
    entities: Vec<TrackedEntity>,
    frames: usize,
    final_min_length: usize,
}

impl Pipeline {
    /// Create a pipeline with the default policies
    pub fn new(config: PipelineConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self {
            tracker: Tracker::new(config.tracker)?,
            pruner: Pruner::new(config.prune)?,
            reporter: NoOpReporter,
            entities: Vec::new(),
            frames: 0,
            final_min_length: config.final_min_length,
        })
    }
}

impl<A: AssignmentPolicy, S: MergeSampler, Rep: PipelineReporter> Pipeline<A, S, Rep> {
    /// Assemble a pipeline from already-configured parts
    pub fn from_parts(
        tracker: Tracker<A>,
        pruner: Pruner<S>,
        reporter: Rep,
        final_min_length: usize,
    ) -> Self {
        Self {
            tracker,
            pruner,
            reporter,
            entities: Vec::new(),
            frames: 0,
            final_min_length,
        }
    }

    /// Swap the reporter, keeping all other state
    pub fn with_reporter<R2: PipelineReporter>(self, reporter: R2) -> Pipeline<A, S, R2> {
        Pipeline {
            tracker: self.tracker,
            pruner: self.pruner,
            reporter,
            entities: self.entities,
            frames: self.frames,
            final_min_length: self.final_min_length,
        }
    }

    /// Current entities, most active first
    pub fn entities(&self) -> &[TrackedEntity] {
        &self.entities
    }

    /// Frames processed so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn tracker(&self) -> &Tracker<A> {
        &self.tracker
    }

    pub fn pruner(&self) -> &Pruner<S> {
        &self.pruner
    }

    pub fn reporter(&self) -> &Rep {
        &self.reporter
    }

    /// Track one frame of observations and prune.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        observations: &[Observation],
    ) -> Result<StepOutput, TrackingError> {
        let frame = self.frames;
        let track = self.tracker.track(&mut self.entities, observations)?;
        self.frames += 1;
        self.reporter.on_track(frame, &track, &self.entities);

        let prune = self.pruner.prune(&mut self.entities, false, rng)?;
        self.report_prune(frame, &prune);

        Ok(StepOutput { track, prune })
    }

    /// Run the end-of-stream forced prune and return the surviving entities.
    pub fn finish<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
    ) -> Result<(Vec<TrackedEntity>, Rep), TrackingError> {
        let prune = self
            .pruner
            .prune_with(&mut self.entities, self.final_min_length, true, rng)?;
        self.report_prune(self.frames, &prune);
        self.reporter.on_finish(self.frames, &self.entities);
        Ok((self.entities, self.reporter))
    }

    /// Process a whole stream of frames, then finish.
    pub fn run<R, I>(
        mut self,
        rng: &mut R,
        frames: I,
    ) -> Result<(Vec<TrackedEntity>, Rep), TrackingError>
    where
        R: Rng + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<[Observation]>,
    {
        for observations in frames {
            self.step(rng, observations.as_ref())?;
        }
        self.finish(rng)
    }

    fn report_prune(&mut self, frame: usize, prune: &PruneReport) {
        if let Some(merge) = &prune.merge {
            self.reporter.on_merge(frame, merge);
        }
        if let Some(noise) = &prune.noise {
            self.reporter.on_noise(frame, noise);
        }
    }
}
