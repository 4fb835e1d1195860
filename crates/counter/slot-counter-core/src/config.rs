//! Counter configuration and per-slot animation parameters.

use serde::{Deserialize, Serialize};

use crate::error::CounterError;

/// Empirical tuning constant: non-sequential slots swap their displayed glyph after
/// `duration * DEFAULT_COMMIT_COEFFICIENT + delay` seconds.
pub const DEFAULT_COMMIT_COEFFICIENT: f32 = 1.3;

/// Counter-wide configuration. Missing JSON fields fall back to `Default`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Visual travel time of one slot, in seconds.
    pub duration: f32,
    /// Multiplier applied to `duration` before it reaches the slots.
    pub duration_scale: f32,
    pub stagger: StaggerPolicy,
    pub reverse: bool,
    pub sequential_mode: bool,
    pub use_monospace_width: bool,
    pub has_infinite_list: bool,
    pub commit_coefficient: f32,

    /// Charset for filler glyphs; digits 0-9 when absent.
    pub dummy_characters: Option<Vec<char>>,
    pub dummy_character_count: usize,

    /// Value shown before the first real transition.
    pub start_value: Option<String>,
    /// Animate from `start_value` into the initial value right after mount.
    pub auto_animation_start: bool,

    pub char_class_name: Option<String>,
    pub value_class_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: 0.7,
            duration_scale: 1.0,
            stagger: StaggerPolicy::default(),
            reverse: false,
            sequential_mode: false,
            use_monospace_width: false,
            has_infinite_list: false,
            commit_coefficient: DEFAULT_COMMIT_COEFFICIENT,
            dummy_characters: None,
            dummy_character_count: 6,
            start_value: None,
            auto_animation_start: true,
            char_class_name: None,
            value_class_name: None,
        }
    }
}

impl Config {
    /// Parse and validate a JSON config object.
    pub fn from_json(json: &str) -> Result<Self, CounterError> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), CounterError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(CounterError::invalid(format!(
                "duration must be a finite, non-negative number of seconds (got {})",
                self.duration
            )));
        }
        if !self.duration_scale.is_finite() || self.duration_scale <= 0.0 {
            return Err(CounterError::invalid(format!(
                "duration_scale must be positive (got {})",
                self.duration_scale
            )));
        }
        if !self.commit_coefficient.is_finite() || self.commit_coefficient <= 0.0 {
            return Err(CounterError::invalid(format!(
                "commit_coefficient must be positive (got {})",
                self.commit_coefficient
            )));
        }
        if let Some(step) = self.stagger.step() {
            if !step.is_finite() || step < 0.0 {
                return Err(CounterError::invalid(format!(
                    "stagger step must be non-negative (got {step})"
                )));
            }
        }
        if matches!(&self.dummy_characters, Some(chars) if chars.is_empty()) {
            return Err(CounterError::invalid("dummy_characters must not be empty"));
        }
        Ok(())
    }

    #[inline]
    pub fn effective_duration(&self) -> f32 {
        self.duration * self.duration_scale
    }

    /// Parameters handed to the slot at `delay` seconds of stagger.
    pub fn params_for(&self, delay: f32) -> AnimationParams {
        AnimationParams {
            duration: self.effective_duration(),
            delay_before_start: delay,
            reverse_direction: self.reverse,
            sequential_mode: self.sequential_mode,
            monospace_width: self.use_monospace_width,
            infinite_filler_loop: self.has_infinite_list,
            commit_coefficient: self.commit_coefficient,
        }
    }
}

/// Animation parameters for one slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationParams {
    pub duration: f32,
    pub delay_before_start: f32,
    pub reverse_direction: bool,
    pub sequential_mode: bool,
    pub monospace_width: bool,
    pub infinite_filler_loop: bool,
    pub commit_coefficient: f32,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Config::default().params_for(0.0)
    }
}

impl AnimationParams {
    /// Seconds between the transition start and the swap of the displayed glyph.
    ///
    /// The duration term is spread over the filler strip so the new glyph is in
    /// place before the strip reaches its final cell.
    pub fn commit_delay(&self, filler_len: usize) -> f32 {
        if self.sequential_mode {
            0.0
        } else {
            self.duration * self.commit_coefficient / filler_len.max(1) as f32
                + self.delay_before_start
        }
    }
}

/// Per-position delay policy. Implement it to plug a custom cascade into the orchestrator.
pub trait Stagger: std::fmt::Debug {
    /// Delay in seconds for the slot at `index` of a counter with `len` positions.
    fn delay(&self, index: usize, len: usize) -> f32;
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StaggerPolicy {
    /// Every slot starts together.
    None,
    /// Left-to-right cascade: `index * step`.
    Linear { step: f32 },
    /// Right-to-left cascade: `(len - 1 - index) * step`.
    ReverseLinear { step: f32 },
}

impl Default for StaggerPolicy {
    fn default() -> Self {
        StaggerPolicy::Linear { step: 0.1 }
    }
}

impl StaggerPolicy {
    fn step(&self) -> Option<f32> {
        match self {
            StaggerPolicy::None => None,
            StaggerPolicy::Linear { step } | StaggerPolicy::ReverseLinear { step } => Some(*step),
        }
    }
}

impl Stagger for StaggerPolicy {
    fn delay(&self, index: usize, len: usize) -> f32 {
        match *self {
            StaggerPolicy::None => 0.0,
            StaggerPolicy::Linear { step } => index as f32 * step,
            StaggerPolicy::ReverseLinear { step } => {
                len.saturating_sub(index + 1) as f32 * step
            }
        }
    }
}
