//! Glyph: the displayed content of one character slot.

use serde::{Deserialize, Serialize};

/// A single character or an opaque renderable node supplied by the host.
/// Glyphs are immutable; a slot replaces its glyph on change, it never edits it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", content = "data")]
pub enum Glyph {
    /// Plain character
    Char(char),

    /// Host node (markup, component id); rendered verbatim and never numeric
    Node(String),
}

impl Glyph {
    /// True for ASCII digits only. Monospace width probing is skipped for anything else.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_ascii_digit())
    }

    #[inline]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Glyph::Char(c) => Some(*c),
            Glyph::Node(_) => None,
        }
    }

    pub fn digit(d: u32) -> Self {
        Glyph::Char(char::from_digit(d % 10, 10).unwrap_or('0'))
    }
}

impl From<char> for Glyph {
    fn from(c: char) -> Self {
        Glyph::Char(c)
    }
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Glyph::Char(c) => write!(f, "{c}"),
            Glyph::Node(n) => f.write_str(n),
        }
    }
}

/// Split a string into one glyph per character.
pub fn glyphs_from_str(s: &str) -> Vec<Glyph> {
    s.chars().map(Glyph::Char).collect()
}

/// Left-pad `glyphs` with `fill` up to `len`. Longer inputs are returned unchanged.
pub fn pad_start(glyphs: &[Glyph], len: usize, fill: &Glyph) -> Vec<Glyph> {
    let missing = len.saturating_sub(glyphs.len());
    std::iter::repeat(fill.clone())
        .take(missing)
        .chain(glyphs.iter().cloned())
        .collect()
}
