//! SRS policy configuration
//!
//! Bundles the interval table with the regression parameters. The default
//! is the canonical policy; custom policies load from JSON:
//!
//! ```json
//! {
//!   "intervals": [0, 14400000, 28800000, 86400000],
//!   "matureStage": 3,
//!   "maturePenalty": 2
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{Result, SrsError};
use super::interval::IntervalTable;
use super::transition::{DEFAULT_MATURE_PENALTY, DEFAULT_MATURE_STAGE};

/// Environment variable naming a policy JSON file
pub const POLICY_ENV_VAR: &str = "KANJI_SRS_POLICY";

/// Scheduling policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SrsPolicy {
    /// Stage -> delay table (milliseconds on the wire)
    #[serde(default)]
    pub intervals: IntervalTable,
    /// Stage at which misses start costing `mature_penalty` per step
    #[serde(default = "default_mature_stage")]
    pub mature_stage: u32,
    /// Regression multiplier for mature items (>= 1)
    #[serde(default = "default_mature_penalty")]
    pub mature_penalty: u32,
}

fn default_mature_stage() -> u32 {
    DEFAULT_MATURE_STAGE
}

fn default_mature_penalty() -> u32 {
    DEFAULT_MATURE_PENALTY
}

impl Default for SrsPolicy {
    fn default() -> Self {
        Self::canonical()
    }
}

impl SrsPolicy {
    /// The canonical policy: nine-stage table, mature at 5, double penalty
    pub fn canonical() -> Self {
        Self {
            intervals: IntervalTable::canonical(),
            mature_stage: DEFAULT_MATURE_STAGE,
            mature_penalty: DEFAULT_MATURE_PENALTY,
        }
    }

    /// Check parameters the interval table does not cover itself
    pub fn validate(&self) -> Result<()> {
        if self.mature_penalty == 0 {
            return Err(SrsError::InvalidPolicy(
                "maturePenalty must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a policy from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let policy: SrsPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let policy = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            stages = policy.intervals.len(),
            mature_stage = policy.mature_stage,
            "Loaded SRS policy"
        );
        Ok(policy)
    }

    /// Resolve the active policy: explicit path, then `KANJI_SRS_POLICY`,
    /// then the canonical default.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        Self::resolve_with(path, std::env::var(POLICY_ENV_VAR).ok().as_deref())
    }

    /// [`SrsPolicy::resolve`] with the environment value passed in.
    /// A blank `env_path` counts as unset.
    pub fn resolve_with(path: Option<&Path>, env_path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match env_path.map(str::trim) {
            Some(p) if !p.is_empty() => Self::from_file(Path::new(p)),
            _ => Ok(Self::canonical()),
        }
    }
}
