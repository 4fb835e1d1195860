//! Slot controller: the state machine for one character position.
//!
//! Idle -> Armed on first paint, Armed -> Transitioning one frame after the external
//! active flag rises, Transitioning -> Settled when the commit timer fires. A falling
//! active flag or a new target value re-arms the slot and invalidates pending work.

use serde::{Deserialize, Serialize};

use crate::config::AnimationParams;
use crate::filler::DummySequenceGenerator;
use crate::ids::{SlotKey, TimerId};
use crate::measure::{measure_cell_height, measure_max_digit_width, LayoutHost};
use crate::render::{CellRole, GlyphCell, SlotView, Transform, Transition};
use crate::scheduler::{EventLoop, Task};
use crate::value::Glyph;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotPhase {
    /// Not painted yet.
    Idle,
    /// Painted and waiting for the active flag.
    Armed,
    /// Active; the displayed glyph is still the old one.
    Transitioning,
    /// Active; the target glyph has been committed.
    Settled,
}

/// Inputs pushed down by the orchestrator on every update.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotProps {
    pub value: Glyph,
    pub active: bool,
    pub is_changed: bool,
    pub params: AnimationParams,
    /// Base filler list; the slot derives its own traversal order from it.
    pub filler: Vec<Glyph>,
}

/// Observable per-position state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotState {
    pub displayed: Glyph,
    pub previous: Option<Glyph>,
    pub armed: bool,
    pub active: bool,
    pub filler_sequence: Vec<Glyph>,
    pub measured_height: f32,
    pub measured_width: Option<f32>,
    pub mounted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SlotEvent {
    Mounted { slot: SlotKey },
    TransitionStarted { slot: SlotKey },
    Settled { slot: SlotKey, value: Glyph },
}

#[derive(Clone, Copy, Debug)]
struct PendingCommit {
    timer: TimerId,
    cycle: u64,
}

#[derive(Debug)]
pub struct SlotController {
    key: SlotKey,
    state: SlotState,
    /// Latest value pushed by the orchestrator.
    target: Glyph,
    /// Target seen at the last activation; becomes `previous` on the next one.
    last_seen: Glyph,
    start_override: Option<Glyph>,
    filler_base: Vec<Glyph>,
    params: AnimationParams,
    external_active: bool,
    is_changed: bool,
    cycle: u64,
    awaiting_arm: bool,
    pending: Option<PendingCommit>,
    settled_once: bool,
    width_dirty: bool,
}

impl SlotController {
    pub fn new(
        key: SlotKey,
        initial: Glyph,
        start_override: Option<Glyph>,
        params: AnimationParams,
        filler: Vec<Glyph>,
    ) -> Self {
        let filler_sequence = DummySequenceGenerator::generate(&filler, params.sequential_mode);
        Self {
            key,
            state: SlotState {
                displayed: initial.clone(),
                previous: None,
                armed: false,
                active: false,
                filler_sequence,
                measured_height: 0.0,
                measured_width: None,
                mounted: false,
            },
            target: initial.clone(),
            last_seen: initial,
            start_override,
            filler_base: filler,
            params,
            external_active: false,
            is_changed: false,
            cycle: 0,
            awaiting_arm: false,
            pending: None,
            settled_once: false,
            width_dirty: false,
        }
    }

    #[inline]
    pub fn key(&self) -> SlotKey {
        self.key
    }

    #[inline]
    pub fn state(&self) -> &SlotState {
        &self.state
    }

    #[inline]
    pub fn params(&self) -> &AnimationParams {
        &self.params
    }

    #[inline]
    pub fn target(&self) -> &Glyph {
        &self.target
    }

    #[inline]
    pub fn is_changed(&self) -> bool {
        self.is_changed
    }

    pub fn start_override(&self) -> Option<&Glyph> {
        self.start_override.as_ref()
    }

    pub fn phase(&self) -> SlotPhase {
        if !self.state.mounted {
            SlotPhase::Idle
        } else if !self.state.active {
            SlotPhase::Armed
        } else if self.pending.is_some() {
            SlotPhase::Transitioning
        } else {
            SlotPhase::Settled
        }
    }

    /// True when nothing is scheduled and the displayed glyph matches the target.
    pub fn is_at_rest(&self) -> bool {
        self.pending.is_none() && !self.awaiting_arm && self.state.displayed == self.target
    }

    /// Paint-time hook: mounts on the first call, then refreshes stale width measurements.
    pub fn layout(&mut self, host: &mut dyn LayoutHost) -> Option<SlotEvent> {
        if !self.state.mounted {
            self.state.mounted = true;
            self.state.armed = !self.state.active;
            self.measure(host);
            log::debug!(
                "slot {:?} mounted (height {}, width {:?})",
                self.key,
                self.state.measured_height,
                self.state.measured_width
            );
            return Some(SlotEvent::Mounted { slot: self.key });
        }
        if self.width_dirty {
            self.measure_width(host);
        }
        None
    }

    /// Re-read every measurement, e.g. after a font or layout change.
    pub fn remeasure(&mut self, host: &mut dyn LayoutHost) {
        if self.state.mounted {
            self.measure(host);
        }
    }

    fn measure(&mut self, host: &mut dyn LayoutHost) {
        self.state.measured_height = measure_cell_height(host, self.key, self.state.mounted);
        self.measure_width(host);
    }

    fn measure_width(&mut self, host: &mut dyn LayoutHost) {
        self.width_dirty = false;
        self.state.measured_width = if self.params.monospace_width && self.target.is_numeric() {
            Some(measure_max_digit_width(host, self.key)).filter(|w| *w > 0.0)
        } else {
            None
        };
    }

    /// Apply new props. Mirrors a render pass: diffs against the previous props and
    /// schedules the arm frame when the slot has to start a new cycle.
    pub fn update(&mut self, props: SlotProps, sched: &mut EventLoop) {
        let value_changed = props.value != self.target;
        let regenerate = value_changed
            || props.filler != self.filler_base
            || props.params.sequential_mode != self.params.sequential_mode;
        if props.params.monospace_width != self.params.monospace_width
            || (value_changed && props.value.is_numeric() != self.target.is_numeric())
        {
            self.width_dirty = true;
        }

        let was_active = self.external_active;
        self.external_active = props.active;
        self.is_changed = props.is_changed;
        self.params = props.params;
        self.filler_base = props.filler;
        if value_changed {
            self.target = props.value;
        }
        if regenerate {
            self.state.filler_sequence =
                DummySequenceGenerator::generate(&self.filler_base, self.params.sequential_mode);
        }

        if !props.active {
            if was_active || self.state.active || self.awaiting_arm || self.pending.is_some() {
                self.rearm(sched);
            }
            return;
        }

        if !was_active || value_changed {
            self.rearm(sched);
            self.awaiting_arm = true;
            sched.request_frame(Task::Arm {
                slot: self.key,
                cycle: self.cycle,
            });
        }
    }

    /// Drop any in-flight cycle and go back to waiting for the active flag.
    fn rearm(&mut self, sched: &mut EventLoop) {
        if let Some(pending) = self.pending.take() {
            sched.clear_timeout(pending.timer);
            log::trace!("slot {:?} discarded commit of cycle {}", self.key, pending.cycle);
        }
        if self.settled_once {
            self.start_override = None;
        }
        self.cycle = self.cycle.wrapping_add(1);
        self.awaiting_arm = false;
        self.state.active = false;
        self.state.armed = self.state.mounted;
        log::debug!("slot {:?} re-armed (cycle {})", self.key, self.cycle);
    }

    /// Dispatch a task addressed to this slot. Tasks from superseded cycles are ignored.
    pub fn handle(&mut self, task: &Task, sched: &mut EventLoop) -> Option<SlotEvent> {
        match *task {
            Task::Arm { cycle, .. } => self.on_arm(cycle, sched),
            Task::Commit { cycle, .. } => self.on_commit(cycle),
            Task::Activate { .. } => None,
        }
    }

    fn on_arm(&mut self, cycle: u64, sched: &mut EventLoop) -> Option<SlotEvent> {
        if cycle != self.cycle || !self.awaiting_arm || !self.external_active {
            log::trace!("slot {:?} ignored stale arm of cycle {cycle}", self.key);
            return None;
        }
        if !self.state.mounted {
            sched.request_frame(Task::Arm {
                slot: self.key,
                cycle,
            });
            return None;
        }

        self.awaiting_arm = false;
        self.state.active = true;
        self.state.armed = false;
        let previous = std::mem::replace(&mut self.last_seen, self.target.clone());
        self.state.previous = Some(previous);

        let timer = sched.set_timeout(
            self.params.commit_delay(self.state.filler_sequence.len()),
            Task::Commit {
                slot: self.key,
                cycle,
            },
        );
        self.pending = Some(PendingCommit { timer, cycle });
        log::debug!(
            "slot {:?} transition started ({} -> {})",
            self.key,
            self.state.displayed,
            self.target
        );
        Some(SlotEvent::TransitionStarted { slot: self.key })
    }

    fn on_commit(&mut self, cycle: u64) -> Option<SlotEvent> {
        match self.pending {
            Some(p) if p.cycle == cycle && self.external_active => {}
            _ => {
                log::trace!("slot {:?} ignored stale commit of cycle {cycle}", self.key);
                return None;
            }
        }
        self.pending = None;
        self.state.displayed = self.target.clone();
        self.settled_once = true;
        log::debug!("slot {:?} settled on {}", self.key, self.state.displayed);
        Some(SlotEvent::Settled {
            slot: self.key,
            value: self.state.displayed.clone(),
        })
    }

    /// Cancel pending timers before the slot is dropped.
    pub fn dispose(&mut self, sched: &mut EventLoop) {
        if let Some(pending) = self.pending.take() {
            sched.clear_timeout(pending.timer);
        }
        self.cycle = self.cycle.wrapping_add(1);
        self.awaiting_arm = false;
    }

    /// Glyph at the top of the stack, visible before the commit in the default direction.
    pub fn top_boundary(&self) -> &Glyph {
        let displayed = &self.state.displayed;
        match (self.params.reverse_direction, self.params.sequential_mode) {
            (false, false) => self.start_override.as_ref().unwrap_or(displayed),
            (false, true) => self
                .start_override
                .as_ref()
                .or(self.state.previous.as_ref())
                .unwrap_or(displayed),
            (true, _) => displayed,
        }
    }

    /// Glyph at the bottom of the stack, visible after the commit in the default direction.
    pub fn bottom_boundary(&self) -> &Glyph {
        let displayed = &self.state.displayed;
        match (self.params.reverse_direction, self.params.sequential_mode) {
            (false, _) => displayed,
            (true, false) => self.start_override.as_ref().unwrap_or(displayed),
            (true, true) => self
                .start_override
                .as_ref()
                .or(self.state.previous.as_ref())
                .unwrap_or(displayed),
        }
    }

    /// Full travel of the glyph stack: one cell per filler glyph plus the boundary.
    #[inline]
    pub fn travel_distance(&self) -> f32 {
        self.state.measured_height * (self.state.filler_sequence.len() as f32 + 1.0)
    }

    pub fn transform(&self) -> Transform {
        if !self.state.mounted {
            return Transform::REST;
        }
        let distance = self.travel_distance();
        let (rest, travelled) = if self.params.reverse_direction {
            (-distance, 0.0)
        } else {
            (0.0, -distance)
        };
        if self.state.active && self.is_changed {
            Transform {
                offset_y: travelled,
                transition: Some(Transition {
                    duration: self.params.duration,
                    delay: self.params.delay_before_start,
                }),
            }
        } else {
            Transform {
                offset_y: rest,
                transition: None,
            }
        }
    }

    pub fn view(&self, char_class: Option<&str>, value_class: Option<&str>) -> SlotView {
        let class_name = char_class.map(str::to_string);
        if !self.state.mounted {
            let glyph = self
                .start_override
                .clone()
                .unwrap_or_else(|| self.state.displayed.clone());
            return SlotView {
                key: self.key,
                value: self.state.displayed.clone(),
                width: None,
                height: None,
                transform: Transform::REST,
                cells: vec![GlyphCell::decorative(glyph, CellRole::Value)],
                class_name,
            };
        }

        let filler = &self.state.filler_sequence;
        let trailing = if self.params.infinite_filler_loop {
            filler.len()
        } else {
            0
        };
        let mut cells = Vec::with_capacity(filler.len() + trailing + 2);
        cells.push(GlyphCell::decorative(self.top_boundary().clone(), CellRole::Top));
        cells.extend(
            filler
                .iter()
                .map(|g| GlyphCell::decorative(g.clone(), CellRole::Filler)),
        );
        cells.push(GlyphCell {
            glyph: self.bottom_boundary().clone(),
            role: CellRole::Value,
            decorative: false,
            class_name: value_class.map(str::to_string),
        });
        if self.params.infinite_filler_loop {
            cells.extend(
                filler
                    .iter()
                    .map(|g| GlyphCell::decorative(g.clone(), CellRole::TrailingFiller)),
            );
        }

        let height = Some(self.state.measured_height).filter(|h| *h > 0.0);
        let width = if self.params.monospace_width {
            self.state.measured_width.filter(|w| *w > 0.0)
        } else {
            None
        };
        SlotView {
            key: self.key,
            value: self.state.displayed.clone(),
            width,
            height,
            transform: self.transform(),
            cells,
            class_name,
        }
    }
}
