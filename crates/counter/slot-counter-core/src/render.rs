//! Render tree handed to the host. Every slot is a fixed-size viewport over a vertically
//! offset stack of glyph cells; the host animates `transform` with a CSS-style transition.

use serde::{Deserialize, Serialize};

use crate::ids::SlotKey;
use crate::value::Glyph;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellRole {
    /// Boundary glyph shown before the commit (top of the stack).
    Top,
    Filler,
    /// Boundary glyph shown after the commit; carries the value class name.
    Value,
    /// Repeated filler after the value for the infinite-scroll illusion.
    TrailingFiller,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlyphCell {
    pub glyph: Glyph,
    pub role: CellRole,
    /// Decorative cells are hidden from assistive technology.
    pub decorative: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl GlyphCell {
    pub(crate) fn decorative(glyph: Glyph, role: CellRole) -> Self {
        Self {
            glyph,
            role,
            decorative: true,
            class_name: None,
        }
    }
}

/// Eased transition applied to the transform (`ease-in-out`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub duration: f32,
    pub delay: f32,
}

impl Transition {
    pub fn css(&self) -> String {
        format!("transform {}s {}s ease-in-out", self.duration, self.delay)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Vertical offset of the glyph stack in pixels (0 or negative).
    pub offset_y: f32,
    /// `None` means the offset applies instantly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

impl Transform {
    pub const REST: Transform = Transform {
        offset_y: 0.0,
        transition: None,
    };

    pub fn css(&self) -> String {
        if self.offset_y == 0.0 {
            "translateY(0px)".to_string()
        } else {
            format!("translateY({}px)", self.offset_y)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotView {
    pub key: SlotKey,
    /// Committed glyph, independent of where the stack currently sits.
    pub value: Glyph,
    /// Fixed cell width; `None` renders at natural width.
    pub width: Option<f32>,
    /// Fixed cell height; `None` before the first measurement.
    pub height: Option<f32>,
    pub transform: Transform,
    pub cells: Vec<GlyphCell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterView {
    pub slots: Vec<SlotView>,
}

impl CounterView {
    /// Concatenated committed glyphs, usable as a plain-text fallback.
    pub fn text(&self) -> String {
        self.slots.iter().map(|s| s.value.to_string()).collect()
    }
}
