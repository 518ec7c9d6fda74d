use serde::{Deserialize, Serialize};

use crate::variant::PointId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

/// One hold-point of a variant's set.
///
/// `rest` is captured once at construction and only ever read back when the
/// accent is restored.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPoint {
    id: PointId,
    rest: Rgb,
    accent: Rgb,
    completed: bool,
}

impl TargetPoint {
    pub fn new(id: PointId, rest: Rgb) -> Self {
        Self {
            id,
            rest,
            accent: rest,
            completed: false,
        }
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn rest(&self) -> Rgb {
        self.rest
    }

    pub fn accent(&self) -> Rgb {
        self.accent
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn complete(&mut self, color: Rgb) {
        self.completed = true;
        self.accent = color;
    }

    pub(crate) fn restore(&mut self) {
        self.completed = false;
        self.accent = self.rest;
    }
}
