//! Slot Counter Core (host-agnostic)
//!
//! Animation engine for slot-machine style counters: every character position owns a
//! small state machine that spins through filler glyphs before settling on its new value.
//! The crate defines glyph values, configuration, a deterministic event loop, the layout
//! measurement seam, filler generation, the per-slot controller, the counter-level
//! orchestrator and a serializable render tree. Hosts (wasm, native) drive it by calling
//! `CounterOrchestrator::tick` once per paint frame.

pub mod config;
pub mod error;
pub mod filler;
pub mod ids;
pub mod measure;
pub mod orchestrator;
pub mod render;
pub mod scheduler;
pub mod slot;
pub mod value;

// Re-exports for consumers (adapters)
pub use config::{AnimationParams, Config, Stagger, StaggerPolicy, DEFAULT_COMMIT_COEFFICIENT};
pub use error::CounterError;
pub use filler::{base_filler, DummySequenceGenerator};
pub use ids::{ProbeId, SlotKey, TimerId};
pub use measure::{
    measure_cell_height, measure_max_digit_width, HeadlessLayout, LayoutHost, UnrenderedLayout,
};
pub use orchestrator::{CounterEvent, CounterOrchestrator, Frame};
pub use render::{CellRole, CounterView, GlyphCell, SlotView, Transform, Transition};
pub use scheduler::{EventLoop, Task};
pub use slot::{SlotController, SlotEvent, SlotPhase, SlotProps, SlotState};
pub use value::{glyphs_from_str, pad_start, Glyph};
