//! Counter orchestrator: owns the character sequence of a value and drives one slot
//! controller per position.

use serde::{Deserialize, Serialize};

use crate::config::{Config, Stagger};
use crate::filler::base_filler;
use crate::ids::{IdAllocator, SlotKey};
use crate::measure::LayoutHost;
use crate::render::CounterView;
use crate::scheduler::{EventLoop, Task};
use crate::slot::{SlotController, SlotEvent, SlotProps};
use crate::value::{glyphs_from_str, Glyph};

/// Discrete signals emitted while ticking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CounterEvent {
    SlotMounted { slot: SlotKey },
    TransitionStarted { slot: SlotKey },
    SlotSettled { slot: SlotKey, value: Glyph },
    SlotDisposed { slot: SlotKey },
    /// Every position has committed the value of the latest transition.
    CounterSettled { value: String },
}

impl From<SlotEvent> for CounterEvent {
    fn from(e: SlotEvent) -> Self {
        match e {
            SlotEvent::Mounted { slot } => CounterEvent::SlotMounted { slot },
            SlotEvent::TransitionStarted { slot } => CounterEvent::TransitionStarted { slot },
            SlotEvent::Settled { slot, value } => CounterEvent::SlotSettled { slot, value },
        }
    }
}

/// Output of one `tick`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Virtual time at the end of the frame, in seconds.
    pub time: f64,
    #[serde(default)]
    pub events: Vec<CounterEvent>,
}

impl Frame {
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: CounterEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug)]
pub struct CounterOrchestrator {
    cfg: Config,
    ids: IdAllocator,
    stagger: Box<dyn Stagger>,
    filler: Vec<Glyph>,
    /// Slot arena indexed by position.
    slots: Vec<SlotController>,
    previous: Vec<Glyph>,
    current: Vec<Glyph>,
    /// Start glyphs still on screen, until the first transition begins.
    start: Option<Vec<Glyph>>,
    active: bool,
    generation: u64,
    animate_all: bool,
    start_pending: bool,
    settle_pending: bool,
    ev: EventLoop,
    frame: Frame,
    /// Events raised between ticks, delivered with the next frame.
    backlog: Vec<CounterEvent>,
}

impl CounterOrchestrator {
    pub fn new(cfg: Config, value: &str) -> Self {
        Self::with_glyphs(cfg, glyphs_from_str(value))
    }

    /// Build a counter holding `value`. With a configured start value the slots paint the
    /// start glyphs and, if `auto_animation_start` is set, travel to `value` right after
    /// the first paint. Otherwise the start glyphs stay up until the next `set_value`.
    pub fn with_glyphs(cfg: Config, value: Vec<Glyph>) -> Self {
        let start = cfg.start_value.as_deref().map(glyphs_from_str);
        let filler = base_filler(&cfg);
        let stagger: Box<dyn Stagger> = Box::new(cfg.stagger);
        let len = value.len();

        let slots = (0..len)
            .map(|i| {
                let start_glyph = start.as_ref().and_then(|s| s.get(i)).cloned();
                SlotController::new(
                    SlotKey(i),
                    value[i].clone(),
                    start_glyph,
                    cfg.params_for(stagger.delay(i, len)),
                    filler.clone(),
                )
            })
            .collect();

        let start_pending = start.is_some() && cfg.auto_animation_start;
        let previous = start.clone().unwrap_or_else(|| value.clone());
        Self {
            cfg,
            ids: IdAllocator::new(),
            stagger,
            filler,
            slots,
            previous,
            current: value,
            start,
            active: false,
            generation: 0,
            animate_all: false,
            start_pending,
            settle_pending: false,
            ev: EventLoop::new(),
            frame: Frame::default(),
            backlog: Vec::new(),
        }
    }

    /// Replace the stagger policy (delay per position).
    pub fn with_stagger(mut self, stagger: Box<dyn Stagger>) -> Self {
        self.stagger = stagger;
        self.push_props();
        self
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Swap the configuration; the new parameters apply from the next transition on.
    pub fn set_config(&mut self, cfg: Config) {
        self.filler = base_filler(&cfg);
        self.stagger = Box::new(cfg.stagger);
        self.cfg = cfg;
        self.push_props();
    }

    pub fn slots(&self) -> &[SlotController] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&SlotController> {
        self.slots.get(index)
    }

    /// Target value of the counter.
    pub fn value(&self) -> &[Glyph] {
        &self.current
    }

    pub fn previous_value(&self) -> &[Glyph] {
        &self.previous
    }

    /// Glyphs currently committed by the slots.
    pub fn displayed(&self) -> Vec<Glyph> {
        self.slots.iter().map(|s| s.state().displayed.clone()).collect()
    }

    pub fn displayed_text(&self) -> String {
        self.slots
            .iter()
            .map(|s| s.state().displayed.to_string())
            .collect()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// No scheduled work left and every slot shows its target glyph.
    pub fn is_settled(&self) -> bool {
        self.start.is_none() && self.ev.is_idle() && self.slots.iter().all(|s| s.is_at_rest())
    }

    pub fn now(&self) -> f64 {
        self.ev.now()
    }

    pub fn set_value(&mut self, value: &str) {
        self.set_glyphs(glyphs_from_str(value));
    }

    /// Start a transition from what is on screen to `value`. Every slot is re-armed in
    /// this call and the active flag rises for all positions together on the next frame.
    ///
    /// While the start glyphs are still up, `value` is compared against them, so passing
    /// the initial value again plays the deferred start animation.
    pub fn set_glyphs(&mut self, value: Vec<Glyph>) {
        if value == self.current && self.start.is_none() {
            return;
        }
        let old = std::mem::replace(&mut self.current, value);
        self.previous = self.start.take().unwrap_or(old);
        log::debug!(
            "counter value {} -> {}",
            render_glyphs(&self.previous),
            render_glyphs(&self.current)
        );
        self.animate_all = false;
        self.start_pending = false;
        self.resize();
        self.begin_transition();
    }

    /// Replay the transition into the current value, spinning every position.
    pub fn start_animation(&mut self) {
        self.animate_all = true;
        self.start_pending = false;
        self.begin_transition();
    }

    /// Drive the counter-wide active flag directly. All slots see the change together.
    pub fn set_active(&mut self, active: bool) {
        if self.active == active {
            return;
        }
        // invalidates a queued activation
        self.generation = self.ids.alloc_cycle();
        self.active = active;
        if active {
            self.settle_pending = true;
        }
        self.push_props();
    }

    fn begin_transition(&mut self) {
        self.start = None;
        self.generation = self.ids.alloc_cycle();
        self.active = false;
        self.settle_pending = true;
        self.push_props();
        self.ev.request_frame(Task::Activate {
            generation: self.generation,
        });
    }

    fn is_changed(&self, index: usize) -> bool {
        self.animate_all || self.previous.get(index) != self.current.get(index)
    }

    fn push_props(&mut self) {
        let len = self.current.len();
        for i in 0..len {
            let props = SlotProps {
                value: self.current[i].clone(),
                active: self.active,
                is_changed: self.is_changed(i),
                params: self.cfg.params_for(self.stagger.delay(i, len)),
                filler: self.filler.clone(),
            };
            if let Some(slot) = self.slots.get_mut(i) {
                slot.update(props, &mut self.ev);
            }
        }
    }

    /// Match the slot arena to the current value length. Surviving positions keep their
    /// controllers so their previous-glyph capture carries over.
    fn resize(&mut self) {
        let len = self.current.len();
        if self.slots.len() > len {
            for mut slot in self.slots.drain(len..) {
                slot.dispose(&mut self.ev);
                log::debug!("slot {:?} disposed", slot.key());
                self.backlog.push(CounterEvent::SlotDisposed { slot: slot.key() });
            }
        }
        for i in self.slots.len()..len {
            log::debug!("slot {:?} created", SlotKey(i));
            self.slots.push(SlotController::new(
                SlotKey(i),
                self.current[i].clone(),
                None,
                self.cfg.params_for(self.stagger.delay(i, len)),
                self.filler.clone(),
            ));
        }
    }

    /// Re-read all measurements, e.g. after a font change.
    pub fn remeasure(&mut self, host: &mut dyn LayoutHost) {
        for slot in &mut self.slots {
            slot.remeasure(host);
        }
    }

    /// Run one paint frame of `dt` seconds: mount new slots, then dispatch due tasks.
    pub fn tick(&mut self, dt: f32, host: &mut dyn LayoutHost) -> &Frame {
        self.frame.clear();
        self.frame.events.append(&mut self.backlog);

        for slot in &mut self.slots {
            if let Some(e) = slot.layout(host) {
                self.frame.push_event(e.into());
            }
        }
        if self.start_pending && self.slots.iter().all(|s| s.state().mounted) {
            self.start_pending = false;
            self.begin_transition();
        }

        for task in self.ev.advance(dt) {
            self.dispatch(task);
        }

        if self.settle_pending
            && self.active
            && self
                .slots
                .iter()
                .all(|s| s.is_at_rest() && s.state().active)
        {
            self.settle_pending = false;
            let value = render_glyphs(&self.current);
            log::debug!("counter settled on {value}");
            self.frame.push_event(CounterEvent::CounterSettled { value });
        }

        self.frame.time = self.ev.now();
        &self.frame
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::Activate { generation } => {
                if generation != self.generation {
                    log::trace!("ignored stale activation {generation}");
                    return;
                }
                self.active = true;
                self.push_props();
            }
            Task::Arm { slot, .. } | Task::Commit { slot, .. } => {
                let Some(controller) = self.slots.get_mut(slot.0) else {
                    log::trace!("task for disposed slot {slot:?} dropped");
                    return;
                };
                if let Some(e) = controller.handle(&task, &mut self.ev) {
                    self.frame.push_event(e.into());
                }
            }
        }
    }

    pub fn view(&self) -> CounterView {
        let char_class = self.cfg.char_class_name.as_deref();
        let value_class = self.cfg.value_class_name.as_deref();
        CounterView {
            slots: self
                .slots
                .iter()
                .map(|s| s.view(char_class, value_class))
                .collect(),
        }
    }
}

fn render_glyphs(glyphs: &[Glyph]) -> String {
    glyphs.iter().map(ToString::to_string).collect()
}
