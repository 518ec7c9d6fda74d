use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of selectable dalgona shapes
pub const VARIANT_COUNT: usize = 4;

/// Which of the four shape/point-set configurations is in play
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Variant(u8);

impl Variant {
    pub const ALL: [Variant; VARIANT_COUNT] = [Variant(0), Variant(1), Variant(2), Variant(3)];

    /// Builds a variant from a raw button/CLI index. Anything outside 0..=3
    /// falls back to variant 0.
    pub fn new(index: i64) -> Self {
        match usize::try_from(index).ok().and_then(Self::try_new) {
            Some(variant) => variant,
            None => {
                log::warn!("invalid variant index {index}, using 0");
                Variant(0)
            }
        }
    }

    pub fn try_new(index: usize) -> Option<Self> {
        (index < VARIANT_COUNT).then_some(Variant(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a target point, unique across all variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u32);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}
