//! Identifiers and simple allocators for slots, timers and layout probes.

use serde::{Deserialize, Serialize};

/// Position of a character slot within the counter, counted from the left.
/// Slots are addressed by position, never by the glyph they display.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SlotKey(pub usize);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Handle for a transient off-screen measurement element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ProbeId(pub u32);

/// Monotonic allocator for timer ids and animation cycle generations.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_timer: u64,
    next_cycle: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_timer(&mut self) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer = self.next_timer.wrapping_add(1);
        id
    }

    /// Cycle generations start at 1 so that 0 can mean "no cycle yet".
    #[inline]
    pub fn alloc_cycle(&mut self) -> u64 {
        self.next_cycle = self.next_cycle.wrapping_add(1);
        self.next_cycle
    }
}
