//! The timed hold-all-points challenge.
//!
//! `Challenge` couples the point tracker with the countdown and decides the
//! outcome of an attempt. Within one tick the completion check runs before
//! the expiry check and both look at the same elapsed sample, so finishing
//! the last point on the frame the limit is reached counts as a success.

pub mod point;
pub mod timer;
pub mod tracker;

pub use point::{Rgb, TargetPoint};
pub use timer::ChallengeTimer;
pub use tracker::PointProgressTracker;

use crate::config::Config;
use crate::variant::PointId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Outcome {
    Success,
    Failure,
}

/// What happened during a probe event or a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengeEvent {
    Engaged(PointId),
    Released(PointId),
    PointCompleted(PointId),
    SetCompleted,
    TimeExpired,
}

#[derive(Debug)]
pub struct Challenge {
    tracker: PointProgressTracker,
    timer: ChallengeTimer,
    outcome: Option<Outcome>,
}

impl Challenge {
    pub fn new(tracker: PointProgressTracker, timer: ChallengeTimer) -> Self {
        Self {
            tracker,
            timer,
            outcome: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PointProgressTracker::new(
                config.target_points(),
                config.hold_secs,
                config.complete_color,
            ),
            ChallengeTimer::new(config.time_limit_secs),
        )
    }

    /// Points the tracker at a new active set. Any hold in progress is dropped.
    pub fn target(&mut self, points: Vec<PointId>) {
        self.tracker.set_targets(points);
    }

    /// Begins a fresh attempt: completion cleared, clock at zero.
    pub fn start(&mut self) {
        self.tracker.reset();
        self.timer.start();
        self.outcome = None;
        log::info!(
            "challenge started: {} points, {:.1}s limit",
            self.tracker.targets().len(),
            self.timer.time_limit()
        );
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
        self.timer.reset();
        self.outcome = None;
    }

    pub fn on_probe_enter(&mut self, point: PointId) -> Option<ChallengeEvent> {
        if !self.timer.is_running() {
            log::debug!("probe entered {point} while the challenge is idle, ignored");
            return None;
        }
        self.tracker
            .engage(point)
            .then_some(ChallengeEvent::Engaged(point))
    }

    pub fn on_probe_exit(&mut self, point: PointId) -> Option<ChallengeEvent> {
        self.tracker
            .release(point)
            .then_some(ChallengeEvent::Released(point))
    }

    pub fn tick(&mut self, dt: f64) -> Vec<ChallengeEvent> {
        let mut events = Vec::new();
        if !self.timer.is_running() {
            return events;
        }

        let sample = self.timer.advance(dt);

        // Holds only count while the sample is still within the limit.
        if sample <= self.timer.time_limit() {
            if let Some(done) = self.tracker.advance(dt) {
                log::info!(
                    "{done} completed ({}/{})",
                    self.tracker.completed_count(),
                    self.tracker.targets().len()
                );
                events.push(ChallengeEvent::PointCompleted(done));

                if self.tracker.is_set_complete() {
                    self.timer.finish();
                    self.outcome = Some(Outcome::Success);
                    log::info!("all points completed at {sample:.2}s");
                    events.push(ChallengeEvent::SetCompleted);
                    return events;
                }
            }
        }

        if self.timer.has_expired() {
            if let Some(point) = self.tracker.discard_engagement() {
                events.push(ChallengeEvent::Released(point));
            }
            self.timer.finish();
            self.outcome = Some(Outcome::Failure);
            log::info!(
                "time limit reached with {}/{} points",
                self.tracker.completed_count(),
                self.tracker.targets().len()
            );
            events.push(ChallengeEvent::TimeExpired);
        }

        events
    }

    /// Ends the attempt from outside the tick, e.g. when the flow reports a
    /// result on its own. An outcome already decided is kept.
    pub fn finish(&mut self, outcome: Outcome) -> Option<ChallengeEvent> {
        let released = self.tracker.discard_engagement();
        self.timer.finish();
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
        released.map(ChallengeEvent::Released)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn tracker(&self) -> &PointProgressTracker {
        &self.tracker
    }

    pub fn timer(&self) -> &ChallengeTimer {
        &self.timer
    }
}
