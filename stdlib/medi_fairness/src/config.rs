//! Aggregation settings.

use serde::{Deserialize, Serialize};

use crate::error::{FairnessError, Result};

/// Default substitute for an exact-zero rate in epsilon aggregation.
pub const DEFAULT_ZERO_RATE_FLOOR: f64 = 1e-10;

/// How whole-population disparity measures treat subgroups whose rate is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySubgroupPolicy {
    /// Any undefined subgroup rate makes the aggregate undefined.
    #[default]
    Propagate,
    /// Undefined subgroup rates are dropped before aggregating.
    Ignore,
}

/// Settings for disparity aggregation.
///
/// `zero_rate_floor` is only consulted by the epsilon (max log-ratio)
/// aggregation: an exact-zero subgroup rate is replaced by the floor so the
/// logarithm stays finite. This makes a zero-vs-nonzero comparison report a
/// large finite disparity instead of an undefined one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    pub zero_rate_floor: f64,
    pub empty_subgroups: EmptySubgroupPolicy,
    /// Upper bound on the number of enumerated subgroups, if any.
    pub max_subgroups: Option<usize>,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            zero_rate_floor: DEFAULT_ZERO_RATE_FLOOR,
            empty_subgroups: EmptySubgroupPolicy::Propagate,
            max_subgroups: None,
        }
    }
}

impl FairnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_rate_floor(mut self, floor: f64) -> Self {
        self.zero_rate_floor = floor;
        self
    }

    pub fn with_empty_subgroups(mut self, policy: EmptySubgroupPolicy) -> Self {
        self.empty_subgroups = policy;
        self
    }

    pub fn with_max_subgroups(mut self, limit: usize) -> Self {
        self.max_subgroups = Some(limit);
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: FairnessConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.zero_rate_floor.is_finite() || self.zero_rate_floor <= 0.0 {
            return Err(FairnessError::InvalidConfig(format!(
                "zero_rate_floor must be finite and positive, got {}",
                self.zero_rate_floor
            )));
        }
        if self.zero_rate_floor > 1.0 {
            return Err(FairnessError::InvalidConfig(format!(
                "zero_rate_floor must not exceed 1.0, got {}",
                self.zero_rate_floor
            )));
        }
        if self.max_subgroups == Some(0) {
            return Err(FairnessError::InvalidConfig(
                "max_subgroups must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
