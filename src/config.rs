use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PAGING_STEP_DAYS, EDGE_THRESHOLD_PX, MAX_PAGING_STEP_DAYS, RESET_INSET_PX};
use crate::types::ViewMode;

/// Behaviour knobs for one timeline view.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub view_mode: ViewMode,
    /// Days the window moves per edge trigger; 0 disables paging
    pub paging_step_days: i64,
    pub drag_enabled: bool,
    pub wheel_enabled: bool,
    pub edge_threshold_px: f64,
    pub reset_inset_px: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            paging_step_days: DEFAULT_PAGING_STEP_DAYS,
            drag_enabled: true,
            wheel_enabled: true,
            edge_threshold_px: EDGE_THRESHOLD_PX,
            reset_inset_px: RESET_INSET_PX,
        }
    }
}

/// Error type for timeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid timeline config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Paging step must not be negative, got {0}")]
    NegativePagingStep(i64),

    #[error("Paging step must be at most {max} days, got {step}")]
    PagingStepTooLarge { step: i64, max: i64 },

    #[error("Edge threshold must be a finite, non-negative distance, got {0}")]
    InvalidThreshold(f64),

    #[error("Reset inset ({inset}px) must lie beyond the edge threshold ({threshold}px)")]
    InsetWithinThreshold { inset: f64, threshold: f64 },
}

impl TimelineConfig {
    /// Parses and validates a JSON configuration object.
    ///
    /// # Errors
    /// Returns `ConfigError::Json` for malformed JSON and the matching
    /// validation variant for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the pan controller relies on.
    ///
    /// The reset inset must sit outside the threshold, otherwise resetting
    /// the scroll position would immediately trigger paging again.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paging_step_days < 0 {
            return Err(ConfigError::NegativePagingStep(self.paging_step_days));
        }
        if self.paging_step_days > MAX_PAGING_STEP_DAYS {
            return Err(ConfigError::PagingStepTooLarge {
                step: self.paging_step_days,
                max: MAX_PAGING_STEP_DAYS,
            });
        }
        if !self.edge_threshold_px.is_finite() || self.edge_threshold_px < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.edge_threshold_px));
        }
        if !self.reset_inset_px.is_finite() || self.reset_inset_px <= self.edge_threshold_px {
            return Err(ConfigError::InsetWithinThreshold {
                inset: self.reset_inset_px,
                threshold: self.edge_threshold_px,
            });
        }
        Ok(())
    }

    pub const fn paging_enabled(&self) -> bool {
        self.paging_step_days > 0
    }
}
