// ⚙️ Presence Config - per-run settings
// Loaded from an optional JSON file; CLI flags override individual fields.

use crate::error::{PresenceError, PresenceResult};
use crate::lateness::{LatenessEvaluator, DEFAULT_LATE_AFTER_MINUTES};
use crate::matcher::DEFAULT_SIMILARITY_THRESHOLD;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Scheduled meeting start, e.g. "09:00 AM"
    pub meeting_start: String,

    /// Minutes after start at which a join counts as late
    pub late_after_minutes: i64,

    /// Minimum cosine similarity for a roster match
    pub similarity_threshold: f64,

    /// Skip rows with unparseable timestamps instead of aborting the run
    pub skip_unparseable: bool,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        PresenceConfig {
            meeting_start: "09:00 AM".to_string(),
            late_after_minutes: DEFAULT_LATE_AFTER_MINUTES,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            skip_unparseable: false,
        }
    }
}

impl PresenceConfig {
    /// Load config from JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: PresenceConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        Ok(config)
    }

    /// Lateness evaluator for this run; rejects an invalid meeting start
    pub fn lateness(&self) -> PresenceResult<LatenessEvaluator> {
        Ok(LatenessEvaluator::from_start_str(&self.meeting_start)?
            .with_late_after_minutes(self.late_after_minutes))
    }

    /// Match threshold for this run; must lie in [0, 1] (NaN rejected)
    pub fn checked_similarity_threshold(&self) -> PresenceResult<f64> {
        let threshold = self.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PresenceError::Config(format!(
                "similarity_threshold must be within 0.0..=1.0, got {}",
                threshold
            )));
        }
        Ok(threshold)
    }
}

// ============================================================================
// TESTS
// ============================================================================
