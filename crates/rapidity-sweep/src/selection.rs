use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::source::Entity;

/// Decides which entities of a trial are filled into the histogram.
pub trait EntitySelector {
    fn accepts(&self, entity: &Entity) -> bool;
}

impl<F> EntitySelector for F
where
    F: Fn(&Entity) -> bool,
{
    fn accepts(&self, entity: &Entity) -> bool {
        self(entity)
    }
}

/// Accepts entities whose status lies in `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusRange {
    pub min: i32,
    pub max: i32,
}

impl StatusRange {
    /// Primary hadrons produced by string fragmentation.
    pub const PRIMARY_HADRONS: Self = Self { min: 81, max: 89 };

    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(self, status: i32) -> bool {
        (self.min..=self.max).contains(&status)
    }
}

impl Default for StatusRange {
    fn default() -> Self {
        Self::PRIMARY_HADRONS
    }
}

impl From<RangeInclusive<i32>> for StatusRange {
    fn from(range: RangeInclusive<i32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

impl EntitySelector for StatusRange {
    fn accepts(&self, entity: &Entity) -> bool {
        self.contains(entity.status)
    }
}
