use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::collector::{
    DEFAULT_WINDOW_END_UNIX, MAX_WINDOW_DAYS, MIN_WINDOW_DAYS, RECORDS_PER_DAY,
};

/// Half-open time span `[start, end)` that synthetic timestamps fall into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl SyntheticWindow {
    /// Window of `days` days ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: end - Duration::days(days.max(1)),
            end,
        }
    }

    /// Window sized to a job's volume: `ceil(volume / RECORDS_PER_DAY)` days,
    /// clamped to `[MIN_WINDOW_DAYS, MAX_WINDOW_DAYS]`.
    pub fn for_volume(end: DateTime<Utc>, volume: u64) -> Self {
        Self::ending_at(end, Self::days_for_volume(volume))
    }

    /// Number of days covered for a given volume.
    pub fn days_for_volume(volume: u64) -> i64 {
        let wanted = volume.div_ceil(RECORDS_PER_DAY);
        i64::try_from(wanted)
            .unwrap_or(MAX_WINDOW_DAYS)
            .clamp(MIN_WINDOW_DAYS, MAX_WINDOW_DAYS)
    }

    /// Anchor used when no explicit window end is configured.
    pub fn default_end() -> DateTime<Utc> {
        Utc.timestamp_opt(DEFAULT_WINDOW_END_UNIX, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `at` lies in `[start, end)`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// Smallest window covering both `self` and `at`.
    pub fn cover(self, at: DateTime<Utc>) -> Self {
        Self {
            start: self.start.min(at),
            end: if at >= self.end {
                at + Duration::nanoseconds(1)
            } else {
                self.end
            },
        }
    }
}

impl Default for SyntheticWindow {
    /// The widest synthetic window ending at the default anchor.
    fn default() -> Self {
        Self::ending_at(Self::default_end(), MAX_WINDOW_DAYS)
    }
}
