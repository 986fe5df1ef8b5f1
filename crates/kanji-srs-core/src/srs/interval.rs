//! Interval Table
//!
//! Maps a review stage to the delay before the item is due again.
//! Lookups past the last entry saturate: the cadence stops growing once
//! an item is beyond the final stage.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::error::SrsError;

// ============================================================================
// CONSTANTS
// ============================================================================

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Canonical delays in milliseconds, indexed by stage
///
/// | Stage | Delay     |
/// |-------|-----------|
/// | 0     | immediate |
/// | 1     | 4 hours   |
/// | 2     | 8 hours   |
/// | 3     | 1 day     |
/// | 4     | 2 days    |
/// | 5     | 1 week    |
/// | 6     | 2 weeks   |
/// | 7     | 30 days   |
/// | 8     | 120 days  |
pub const CANONICAL_INTERVALS_MS: [i64; 9] = [
    0,
    4 * HOUR_MS,
    8 * HOUR_MS,
    DAY_MS,
    2 * DAY_MS,
    7 * DAY_MS,
    14 * DAY_MS,
    30 * DAY_MS,
    120 * DAY_MS,
];

// ============================================================================
// INTERVAL TABLE
// ============================================================================

/// Ordered, non-decreasing sequence of review delays.
///
/// Serialized as an array of integer milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct IntervalTable {
    intervals: Vec<Duration>,
}

impl IntervalTable {
    /// Build a table from explicit durations.
    ///
    /// Rejects an empty table, negative delays, and any entry shorter than
    /// the one before it.
    pub fn new(intervals: Vec<Duration>) -> Result<Self, SrsError> {
        if intervals.is_empty() {
            return Err(SrsError::InvalidPolicy(
                "interval table must have at least one entry".to_string(),
            ));
        }

        for (stage, interval) in intervals.iter().enumerate() {
            if *interval < Duration::zero() {
                return Err(SrsError::InvalidPolicy(format!(
                    "interval for stage {} is negative ({} ms)",
                    stage,
                    interval.num_milliseconds()
                )));
            }
        }

        if let Some(stage) = intervals.windows(2).position(|w| w[1] < w[0]) {
            return Err(SrsError::InvalidPolicy(format!(
                "interval for stage {} is shorter than stage {}",
                stage + 1,
                stage
            )));
        }

        Ok(Self { intervals })
    }

    /// Build a table from millisecond counts
    pub fn from_millis(millis: &[i64]) -> Result<Self, SrsError> {
        let intervals = millis
            .iter()
            .map(|&ms| {
                Duration::try_milliseconds(ms).ok_or_else(|| {
                    SrsError::InvalidPolicy(format!("interval {} ms is out of range", ms))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(intervals)
    }

    /// The canonical nine-stage table
    pub fn canonical() -> Self {
        Self {
            intervals: CANONICAL_INTERVALS_MS
                .iter()
                .map(|&ms| Duration::milliseconds(ms))
                .collect(),
        }
    }

    /// Delay for the given stage, saturating at the last entry
    #[inline]
    pub fn interval(&self, stage: u32) -> Duration {
        let last = self.intervals.len() - 1;
        let index = usize::try_from(stage).map_or(last, |s| s.min(last));
        self.intervals[index]
    }

    /// Highest stage with its own entry
    pub fn max_stage(&self) -> u32 {
        u32::try_from(self.intervals.len() - 1).unwrap_or(u32::MAX)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the table has no entries (never true for a validated table)
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Iterate `(stage, delay)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (u32, Duration)> + '_ {
        self.intervals
            .iter()
            .enumerate()
            .map(|(stage, d)| (stage as u32, *d))
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self::canonical()
    }
}

impl TryFrom<Vec<i64>> for IntervalTable {
    type Error = SrsError;

    fn try_from(millis: Vec<i64>) -> Result<Self, Self::Error> {
        Self::from_millis(&millis)
    }
}

impl From<IntervalTable> for Vec<i64> {
    fn from(table: IntervalTable) -> Self {
        table
            .intervals
            .iter()
            .map(|d| d.num_milliseconds())
            .collect()
    }
}

/// Format a delay the way the CLI and logs show it ("4h", "7d", "now")
pub fn format_interval(interval: Duration) -> String {
    let ms = interval.num_milliseconds();
    if ms == 0 {
        "now".to_string()
    } else if ms % DAY_MS == 0 {
        format!("{}d", ms / DAY_MS)
    } else if ms % HOUR_MS == 0 {
        format!("{}h", ms / HOUR_MS)
    } else if ms % 60_000 == 0 {
        format!("{}m", ms / 60_000)
    } else {
        format!("{}ms", ms)
    }
}

// ============================================================================
// TESTS
// ============================================================================
