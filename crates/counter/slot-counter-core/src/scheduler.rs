//! Deterministic single-threaded event loop.
//!
//! Models the two suspension points of a slot cycle: "run after the next paint" and
//! "run after N seconds". The host advances it once per frame; nothing runs on its own.

use serde::{Deserialize, Serialize};

use crate::ids::{IdAllocator, SlotKey, TimerId};

/// Deferred work. Tasks are data so staleness can be checked against the owner's
/// current cycle when they are dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    /// Flip the counter-wide active flag for every slot.
    Activate { generation: u64 },
    /// Set the slot's local active flag (one frame after the external flag).
    Arm { slot: SlotKey, cycle: u64 },
    /// Commit the slot's target glyph as its displayed value.
    Commit { slot: SlotKey, cycle: u64 },
}

#[derive(Clone, Debug)]
struct Timer {
    id: TimerId,
    deadline: f64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct EventLoop {
    ids: IdAllocator,
    now: f64,
    frame_queue: Vec<Task>,
    timers: Vec<Timer>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run `task` on the next frame.
    pub fn request_frame(&mut self, task: Task) {
        log::trace!("frame request {task:?}");
        self.frame_queue.push(task);
    }

    /// Run `task` once `delay` seconds have elapsed, but never within the current frame.
    pub fn set_timeout(&mut self, delay: f32, task: Task) -> TimerId {
        let id = self.ids.alloc_timer();
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        let deadline = self.now + f64::from(delay);
        log::trace!("timer {id:?} at {deadline:.3}s for {task:?}");
        self.timers.push(Timer { id, deadline, task });
        id
    }

    /// Cancel a pending timer. Unknown or already-fired ids are ignored.
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        before != self.timers.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_idle(&self) -> bool {
        self.frame_queue.is_empty() && self.timers.is_empty()
    }

    /// Advance the clock by `dt` seconds and return the tasks due in this frame: queued
    /// frame tasks first, then expired timers ordered by deadline and creation order.
    pub fn advance(&mut self, dt: f32) -> Vec<Task> {
        if dt.is_finite() && dt > 0.0 {
            self.now += f64::from(dt);
        }
        let mut due: Vec<Task> = std::mem::take(&mut self.frame_queue);

        let now = self.now;
        let (mut expired, pending): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.deadline <= now);
        self.timers = pending;
        expired.sort_by(|a, b| a.deadline.total_cmp(&b.deadline).then(a.id.cmp(&b.id)));
        due.extend(expired.into_iter().map(|t| t.task));
        due
    }
}
