//! Generation-guarded topic identifiers

use std::fmt;

/// Slab index plus generation of a registered topic
///
/// Releasing a topic bumps the generation of its slab slot, so ids handed out
/// before the release no longer resolve even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicId {
    index: u32,
    generation: u32,
}

impl TopicId {
    /// Id carried by topics created outside a registry
    pub const DETACHED: TopicId = TopicId {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        debug_assert!(generation != 0);
        Self { index, generation }
    }

    /// Slab slot number
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slab slot when the id was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_detached(&self) -> bool {
        self.generation == 0
    }

    /// Pack into a non-zero `u64` (generation in the high half)
    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Unpack a raw handle; 0 and detached ids are rejected
    pub fn from_raw(raw: u64) -> Option<Self> {
        let generation = (raw >> 32) as u32;
        if generation == 0 {
            return None;
        }
        Some(Self {
            index: raw as u32,
            generation,
        })
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            write!(f, "topic#detached")
        } else {
            write!(f, "topic#{}v{}", self.index, self.generation)
        }
    }
}
