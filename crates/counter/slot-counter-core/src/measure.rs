//! Layout measurement seam.
//!
//! The engine never touches a DOM. Hosts implement `LayoutHost`; the helpers here turn raw
//! readings into cell sizes, where 0 means "not measurable yet, render at auto size".

use std::collections::HashMap;

use crate::ids::{ProbeId, SlotKey};

/// Layout queries against the rendered cell of one slot.
/// Adapters (wasm, native renderers) implement this and pass it into `CounterOrchestrator::tick`.
pub trait LayoutHost {
    /// Rendered height of the slot's value cell. 0 before the cell is painted.
    fn cell_height(&mut self, slot: SlotKey) -> f32;

    /// Attach a hidden, off-screen element containing `text` to the slot's cell.
    fn insert_probe(&mut self, slot: SlotKey, text: &str) -> ProbeId;

    fn probe_width(&mut self, probe: ProbeId) -> f32;

    fn remove_probe(&mut self, probe: ProbeId);
}

#[inline]
fn sanitize(reading: f32) -> f32 {
    if reading.is_finite() && reading > 0.0 {
        reading
    } else {
        0.0
    }
}

/// Height of one glyph cell; always 0 before the first paint.
pub fn measure_cell_height(host: &mut dyn LayoutHost, slot: SlotKey, mounted: bool) -> f32 {
    if !mounted {
        return 0.0;
    }
    sanitize(host.cell_height(slot))
}

/// Widest rendering among the digits 0-9. Every probe is removed before returning.
pub fn measure_max_digit_width(host: &mut dyn LayoutHost, slot: SlotKey) -> f32 {
    (0..10u32)
        .map(|d| {
            let probe = host.insert_probe(slot, &d.to_string());
            let width = sanitize(host.probe_width(probe));
            host.remove_probe(probe);
            width
        })
        .fold(0.0, f32::max)
}

/// In-memory layout with a fixed cell height and per-character advance widths.
/// Used for headless hosts (terminals, snapshot tests) and to audit probe cleanup.
#[derive(Debug, Clone)]
pub struct HeadlessLayout {
    pub cell_height: f32,
    pub default_width: f32,
    pub widths: HashMap<char, f32>,
    probes: HashMap<ProbeId, (SlotKey, String)>,
    next_probe: u32,
    inserted: usize,
}

impl HeadlessLayout {
    pub fn new(cell_height: f32, default_width: f32) -> Self {
        Self {
            cell_height,
            default_width,
            widths: HashMap::new(),
            probes: HashMap::new(),
            next_probe: 0,
            inserted: 0,
        }
    }

    pub fn with_width(mut self, c: char, width: f32) -> Self {
        self.widths.insert(c, width);
        self
    }

    /// Probes currently attached (should be 0 between measurements).
    pub fn live_probes(&self) -> usize {
        self.probes.len()
    }

    /// Total probes ever inserted.
    pub fn probes_inserted(&self) -> usize {
        self.inserted
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.widths.get(&c).copied().unwrap_or(self.default_width))
            .sum()
    }
}

impl LayoutHost for HeadlessLayout {
    fn cell_height(&mut self, _slot: SlotKey) -> f32 {
        self.cell_height
    }

    fn insert_probe(&mut self, slot: SlotKey, text: &str) -> ProbeId {
        let id = ProbeId(self.next_probe);
        self.next_probe = self.next_probe.wrapping_add(1);
        self.inserted += 1;
        self.probes.insert(id, (slot, text.to_string()));
        id
    }

    fn probe_width(&mut self, probe: ProbeId) -> f32 {
        self.probes
            .get(&probe)
            .map(|(_, text)| self.text_width(text))
            .unwrap_or(0.0)
    }

    fn remove_probe(&mut self, probe: ProbeId) {
        self.probes.remove(&probe);
    }
}

/// A host that never renders: every reading is 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnrenderedLayout;

impl LayoutHost for UnrenderedLayout {
    fn cell_height(&mut self, _slot: SlotKey) -> f32 {
        0.0
    }

    fn insert_probe(&mut self, _slot: SlotKey, _text: &str) -> ProbeId {
        ProbeId(0)
    }

    fn probe_width(&mut self, _probe: ProbeId) -> f32 {
        0.0
    }

    fn remove_probe(&mut self, _probe: ProbeId) {}
}
