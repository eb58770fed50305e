//! Observability for pipeline execution.
//!
//! This module provides the [`PipelineReporter`] trait for debugging and
//! research instrumentation. Reporters receive callbacks at key points of
//! every frame without polluting the tracking and pruning logic.
//!
//! # Zero-Cost Abstraction
//!
//! The default [`NoOpReporter`] compiles to zero overhead - all callback
//! methods are empty and will be optimized away by the compiler.
//!
//! # Example
//!
//! ```
//! use flicker_tracker_rs::reporter::{DebugReporter, PipelineReporter};
//! use flicker_tracker_rs::tracker::TrackReport;
//!
//! let mut reporter = DebugReporter::new();
//! reporter.on_track(0, &TrackReport::default(), &[]);
//! assert_eq!(reporter.track_events().len(), 1);
//! ```

use crate::merge::MergeReport;
use crate::noise::NoiseReport;
use crate::tracker::TrackReport;
use crate::types::TrackedEntity;

// ============================================================================
// PipelineReporter Trait
// ============================================================================

/// Observability trait for pipeline execution.
///
/// All methods have default empty implementations, so you only need to
/// override the events you care about.
///
/// Callbacks receive references; clone inside the callback if the data
/// needs to outlive it.
pub trait PipelineReporter {
    /// Called after a frame has been tracked (before pruning).
    fn on_track(&mut self, _frame: usize, _report: &TrackReport, _entities: &[TrackedEntity]) {}

    /// Called after a merge round was attempted.
    fn on_merge(&mut self, _frame: usize, _report: &MergeReport) {}

    /// Called after a noise round was attempted.
    fn on_noise(&mut self, _frame: usize, _report: &NoiseReport) {}

    /// Called once after the end-of-stream forced prune.
    fn on_finish(&mut self, _frames: usize, _entities: &[TrackedEntity]) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl PipelineReporter for NoOpReporter {}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// Stores clones of every report (and, for finish events, every surviving
/// entity), so memory grows with the length of the stream.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    tracks: Vec<(usize, TrackReport, usize)>,
    merges: Vec<(usize, MergeReport)>,
    noise: Vec<(usize, NoiseReport)>,
    finished: Option<(usize, Vec<TrackedEntity>)>,
}

impl DebugReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.merges.clear();
        self.noise.clear();
        self.finished = None;
    }

    /// (frame, report, entity count after tracking)
    pub fn track_events(&self) -> &[(usize, TrackReport, usize)] {
        &self.tracks
    }

    pub fn merge_events(&self) -> &[(usize, MergeReport)] {
        &self.merges
    }

    pub fn noise_events(&self) -> &[(usize, NoiseReport)] {
        &self.noise
    }

    /// Frame count and surviving entities at end of stream
    pub fn finished(&self) -> Option<&(usize, Vec<TrackedEntity>)> {
        self.finished.as_ref()
    }

    /// Entities removed by every merge and noise round so far
    pub fn total_removed(&self) -> usize {
        self.merges.iter().map(|(_, r)| r.removed.len()).sum::<usize>()
            + self.noise.iter().map(|(_, r)| r.removed.len()).sum::<usize>()
    }
}

impl PipelineReporter for DebugReporter {
    fn on_track(&mut self, frame: usize, report: &TrackReport, entities: &[TrackedEntity]) {
        self.tracks.push((frame, *report, entities.len()));
    }

    fn on_merge(&mut self, frame: usize, report: &MergeReport) {
        self.merges.push((frame, report.clone()));
    }

    fn on_noise(&mut self, frame: usize, report: &NoiseReport) {
        self.noise.push((frame, report.clone()));
    }

    fn on_finish(&mut self, frames: usize, entities: &[TrackedEntity]) {
        self.finished = Some((frames, entities.to_vec()));
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that emits events through the `log` crate.
///
/// - `on_finish`: INFO
/// - `on_merge` / `on_noise` with removals: DEBUG
/// - `on_track`: TRACE (DEBUG when verbose)
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    verbose: bool,
}

impl LoggingReporter {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Also log every frame's tracking summary at DEBUG level
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl PipelineReporter for LoggingReporter {
    fn on_track(&mut self, frame: usize, report: &TrackReport, entities: &[TrackedEntity]) {
        let level = if self.verbose {
            log::Level::Debug
        } else {
            log::Level::Trace
        };
        log::log!(
            level,
            "Frame {}: {} entities ({} matched, {} created, {} missed)",
            frame,
            entities.len(),
            report.matched,
            report.created,
            report.missed
        );
    }

    fn on_merge(&mut self, frame: usize, report: &MergeReport) {
        for event in &report.merges {
            log::debug!(
                "Frame {}: {} absorbed {} from frame {}",
                frame,
                event.survivor,
                event.absorbed,
                event.start
            );
        }
    }

    fn on_noise(&mut self, frame: usize, report: &NoiseReport) {
        if !report.removed.is_empty() {
            log::debug!(
                "Frame {}: removed {} noise entities (cutoff {:?})",
                frame,
                report.removed.len(),
                report.cutoff
            );
        }
        if let Some(reason) = &report.skipped {
            log::debug!("Frame {}: noise round skipped: {}", frame, reason);
        }
    }

    fn on_finish(&mut self, frames: usize, entities: &[TrackedEntity]) {
        log::info!(
            "Stream finished after {} frames: {} entities",
            frames,
            entities.len()
        );
        if self.verbose {
            for e in entities {
                log::debug!(
                    "  Entity {}: pos=({:.1}, {:.1}), r={:.2}, active={}",
                    e.id,
                    e.position.x,
                    e.position.y,
                    e.radius,
                    e.signal.activity()
                );
            }
        }
    }
}

// ============================================================================
// CompositeReporter
// ============================================================================

/// Reporter that forwards events to two child reporters.
#[derive(Debug, Clone)]
pub struct CompositeReporter<A: PipelineReporter, B: PipelineReporter> {
    first: A,
    second: B,
}

impl<A: PipelineReporter, B: PipelineReporter> CompositeReporter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }

    /// Consume and return both reporters.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: PipelineReporter, B: PipelineReporter> PipelineReporter for CompositeReporter<A, B> {
    fn on_track(&mut self, frame: usize, report: &TrackReport, entities: &[TrackedEntity]) {
        self.first.on_track(frame, report, entities);
        self.second.on_track(frame, report, entities);
    }

    fn on_merge(&mut self, frame: usize, report: &MergeReport) {
        self.first.on_merge(frame, report);
        self.second.on_merge(frame, report);
    }

    fn on_noise(&mut self, frame: usize, report: &NoiseReport) {
        self.first.on_noise(frame, report);
        self.second.on_noise(frame, report);
    }

    fn on_finish(&mut self, frames: usize, entities: &[TrackedEntity]) {
        self.first.on_finish(frames, entities);
        self.second.on_finish(frames, entities);
    }
}
