//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Changing `threshold_degrees` or `meters_per_degree` changes which nodes
//! auto-connect; treat it as a versioned behavior change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::spatial::{DEFAULT_METERS_PER_DEGREE, DEFAULT_THRESHOLD_DEGREES};
use crate::Result;

/// Top-level configuration for a [`crate::Navigator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Maximum planar distance at which two same-floor nodes auto-connect.
    pub threshold_degrees: f64,
    pub meters_per_degree: f64,
    pub search: SearchLimits,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            threshold_degrees: DEFAULT_THRESHOLD_DEGREES,
            meters_per_degree: DEFAULT_METERS_PER_DEGREE,
            search: SearchLimits::default(),
        }
    }
}

/// Bounds applied to every search started without explicit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Maximum nodes to settle before giving up.
    pub max_expansions: usize,
    /// Wall-clock budget per search; `None` disables the deadline.
    pub timeout_ms: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_expansions: 100_000,
            timeout_ms: Some(2_000),
        }
    }
}

impl SearchLimits {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl NavConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold_degrees.is_finite() && self.threshold_degrees > 0.0) {
            return Err(crate::Error::InvalidInput(format!(
                "threshold_degrees must be positive, got {}",
                self.threshold_degrees
            )));
        }
        if !(self.meters_per_degree.is_finite() && self.meters_per_degree > 0.0) {
            return Err(crate::Error::InvalidInput(format!(
                "meters_per_degree must be positive, got {}",
                self.meters_per_degree
            )));
        }
        if self.search.max_expansions == 0 {
            return Err(crate::Error::InvalidInput("search.max_expansions must be at least 1".into()));
        }
        Ok(())
    }
}
