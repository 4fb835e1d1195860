//! Filler ("dummy") glyphs shown while a slot spins.

use crate::config::Config;
use crate::value::Glyph;

/// Base filler list for a counter: `dummy_character_count` glyphs cycling through the
/// configured charset, or through the digits 0-9.
pub fn base_filler(cfg: &Config) -> Vec<Glyph> {
    match cfg.dummy_characters.as_deref() {
        Some(chars) if !chars.is_empty() => chars
            .iter()
            .cycle()
            .take(cfg.dummy_character_count)
            .map(|c| Glyph::Char(*c))
            .collect(),
        _ => (0..cfg.dummy_character_count)
            .map(|i| Glyph::digit((i % 10) as u32))
            .collect(),
    }
}

/// Produces the traversal order of filler glyphs for one slot cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummySequenceGenerator;

impl DummySequenceGenerator {
    /// Identity in sequential mode, otherwise a fresh uniform permutation.
    /// The input is never modified.
    pub fn generate(base: &[Glyph], sequential: bool) -> Vec<Glyph> {
        if sequential {
            return base.to_vec();
        }
        let mut out = base.to_vec();
        fastrand::shuffle(&mut out);
        out
    }

    /// Same as `generate`, drawing from a caller-owned generator.
    pub fn generate_with(rng: &mut fastrand::Rng, base: &[Glyph], sequential: bool) -> Vec<Glyph> {
        let mut out = base.to_vec();
        if !sequential {
            rng.shuffle(&mut out);
        }
        out
    }
}
