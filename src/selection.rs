use crate::challenge::Challenge;
use crate::config::Config;
use crate::host::{skip_unwired, Host, SceneObject};
use crate::variant::{PointId, Variant, VARIANT_COUNT};

/// The player's chosen variant and the point sets it maps to
#[derive(Debug, Clone)]
pub struct SelectionState {
    variant: Variant,
    point_sets: [Vec<PointId>; VARIANT_COUNT],
}

impl SelectionState {
    pub fn new(point_sets: [Vec<PointId>; VARIANT_COUNT]) -> Self {
        Self {
            variant: Variant::default(),
            point_sets,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.point_sets())
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn point_set(&self, variant: Variant) -> &[PointId] {
        &self.point_sets[variant.index()]
    }

    pub fn active_points(&self) -> &[PointId] {
        self.point_set(self.variant)
    }

    /// Makes `variant` active: only its marker and point group stay visible
    /// and the challenge targets its points.
    ///
    /// Callers check that no result is being presented first.
    pub fn select<H: Host>(&mut self, variant: Variant, host: &mut H, challenge: &mut Challenge) {
        self.variant = variant;

        for v in Variant::ALL {
            skip_unwired(host.set_active(SceneObject::SelectMarker(v), v == variant));
            skip_unwired(host.set_active(SceneObject::PointSet(v), v == variant));
        }
        challenge.target(self.active_points().to_vec());

        log::info!(
            "variant {variant} selected ({} points)",
            self.active_points().len()
        );
    }

    pub fn reset<H: Host>(&mut self, host: &mut H, challenge: &mut Challenge) {
        self.select(Variant::default(), host, challenge);
    }
}
