//! Error types. Only configuration loading can fail; the animation engine degrades
//! to a static render instead of returning errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CounterError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
