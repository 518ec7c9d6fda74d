use itertools::Itertools;
use std::collections::BTreeMap;

use super::point::{Rgb, TargetPoint};
use crate::variant::PointId;

/// Tracks which target point the needle is held over and for how long.
///
/// The tracker owns every `TargetPoint` of every variant; only the ids in
/// `targets` (the selected variant's set) can be engaged.
#[derive(Debug)]
pub struct PointProgressTracker {
    points: BTreeMap<PointId, TargetPoint>,
    targets: Vec<PointId>,
    engaged: Option<PointId>,
    hold_elapsed: f64,
    hold_secs: f64,
    complete_color: Rgb,
}

impl PointProgressTracker {
    pub fn new(
        points: impl IntoIterator<Item = TargetPoint>,
        hold_secs: f64,
        complete_color: Rgb,
    ) -> Self {
        let mut registry = BTreeMap::new();
        for point in points {
            if registry.contains_key(&point.id()) {
                log::warn!("duplicate target point {}, keeping the first", point.id());
                continue;
            }
            registry.insert(point.id(), point);
        }

        Self {
            points: registry,
            targets: Vec::new(),
            engaged: None,
            hold_elapsed: 0.0,
            hold_secs,
            complete_color,
        }
    }

    pub fn set_targets(&mut self, targets: Vec<PointId>) {
        let listed = targets.len();
        let targets = targets.into_iter().unique().collect::<Vec<_>>();
        if targets.len() < listed {
            log::warn!(
                "{} duplicate ids dropped from the active point set",
                listed - targets.len()
            );
        }
        if targets.is_empty() {
            log::warn!("active point set is empty, the challenge can only end by timeout");
        }
        for id in targets.iter().filter(|id| !self.points.contains_key(id)) {
            log::warn!("target {id} has no point, the challenge can only end by timeout");
        }

        self.discard_engagement();
        self.targets = targets;
    }

    pub fn targets(&self) -> &[PointId] {
        &self.targets
    }

    pub fn is_target(&self, id: PointId) -> bool {
        self.targets.contains(&id)
    }

    pub fn point(&self, id: PointId) -> Option<&TargetPoint> {
        self.points.get(&id)
    }

    pub fn points(&self) -> impl Iterator<Item = &TargetPoint> {
        self.points.values()
    }

    pub fn engaged(&self) -> Option<PointId> {
        self.engaged
    }

    pub fn hold_elapsed(&self) -> f64 {
        self.hold_elapsed
    }

    pub fn hold_secs(&self) -> f64 {
        self.hold_secs
    }

    /// Hold progress of the engaged point, 0..=1
    pub fn progress(&self) -> f64 {
        if self.hold_secs <= 0.0 {
            return if self.engaged.is_some() { 1.0 } else { 0.0 };
        }
        (self.hold_elapsed / self.hold_secs).clamp(0.0, 1.0)
    }

    pub fn completed(&self) -> Vec<PointId> {
        self.targets
            .iter()
            .copied()
            .filter(|id| self.points.get(id).is_some_and(TargetPoint::is_completed))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.completed().len()
    }

    /// An empty set never counts as complete.
    pub fn is_set_complete(&self) -> bool {
        !self.targets.is_empty() && self.completed_count() == self.targets.len()
    }

    /// Starts holding `id`. Returns false when the point is not engageable.
    pub fn engage(&mut self, id: PointId) -> bool {
        if self.engaged == Some(id) {
            return false;
        }
        if !self.is_target(id) {
            log::debug!("{id} is not in the active set, ignored");
            return false;
        }
        match self.points.get(&id) {
            Some(point) if point.is_completed() => {
                log::debug!("{id} already completed, ignored");
                false
            }
            Some(_) => {
                self.engaged = Some(id);
                self.hold_elapsed = 0.0;
                true
            }
            None => false,
        }
    }

    /// Stops holding `id`; partial progress is dropped.
    pub fn release(&mut self, id: PointId) -> bool {
        if self.engaged != Some(id) {
            return false;
        }
        self.discard_engagement().is_some()
    }

    pub fn discard_engagement(&mut self) -> Option<PointId> {
        self.hold_elapsed = 0.0;
        self.engaged.take()
    }

    /// Adds a frame of hold time. Returns the point that reached the
    /// threshold on this frame, if any.
    pub fn advance(&mut self, dt: f64) -> Option<PointId> {
        let id = self.engaged?;
        self.hold_elapsed += dt;
        if self.hold_elapsed < self.hold_secs {
            return None;
        }

        if let Some(point) = self.points.get_mut(&id) {
            point.complete(self.complete_color);
        }
        self.discard_engagement();
        Some(id)
    }

    /// Clears completion and restores every point's rest accent.
    pub fn reset(&mut self) {
        self.discard_engagement();
        for point in self.points.values_mut() {
            point.restore();
        }
    }
}
