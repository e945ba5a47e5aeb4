//! # Session Policy
//!
//! The two knobs of the decision rules. [`SegmenterConfig`] is the raw,
//! deserializable form (TOML file, CLI flags); [`SessionPolicy`] is the
//! validated form the rules consume.

use serde::Deserialize;

use crate::error::ConfigError;

/// Queries closer together than this are treated as one search.
pub const DEFAULT_TIME_WINDOW_MS: i64 = 200;

/// Queries further apart than this many edits start a new search.
pub const DEFAULT_EDIT_DISTANCE_THRESHOLD: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SegmenterConfig {
    #[serde(default = "default_time_window_ms")]
    pub time_window_ms: i64,
    #[serde(default = "default_edit_distance_threshold")]
    pub edit_distance_threshold: i64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            time_window_ms: DEFAULT_TIME_WINDOW_MS,
            edit_distance_threshold: DEFAULT_EDIT_DISTANCE_THRESHOLD,
        }
    }
}

fn default_time_window_ms() -> i64 {
    DEFAULT_TIME_WINDOW_MS
}
fn default_edit_distance_threshold() -> i64 {
    DEFAULT_EDIT_DISTANCE_THRESHOLD
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<SessionPolicy, ConfigError> {
        if self.time_window_ms < 0 {
            return Err(ConfigError::NegativeTimeWindow(self.time_window_ms));
        }
        let threshold = usize::try_from(self.edit_distance_threshold)
            .map_err(|_| ConfigError::NegativeThreshold(self.edit_distance_threshold))?;
        Ok(SessionPolicy {
            time_window_ms: self.time_window_ms,
            edit_distance_threshold: threshold,
        })
    }
}

/// Validated thresholds. Only constructible through [`SegmenterConfig::validate`]
/// or [`Default`], so the window is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    time_window_ms: i64,
    edit_distance_threshold: usize,
}

impl SessionPolicy {
    #[inline]
    pub fn time_window_ms(&self) -> i64 {
        self.time_window_ms
    }

    #[inline]
    pub fn edit_distance_threshold(&self) -> usize {
        self.edit_distance_threshold
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            time_window_ms: DEFAULT_TIME_WINDOW_MS,
            edit_distance_threshold: DEFAULT_EDIT_DISTANCE_THRESHOLD as usize,
        }
    }
}
