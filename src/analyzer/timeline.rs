use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::constants::analyzer::MAX_TIMELINE_BUCKETS;
use crate::errors::SimError;
use crate::window::SyntheticWindow;

use super::distribution::SeriesPoint;

/// One fixed-width histogram bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    /// Inclusive start; a multiple of the bucket width since the Unix epoch.
    pub start: DateTime<Utc>,
    pub count: usize,
}

/// Contiguous, zero-filled record counts over time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineHistogram {
    /// Width of every bucket, in milliseconds.
    pub bucket_width_ms: i64,
    /// Buckets in ascending order with no gaps.
    pub buckets: Vec<TimelineBucket>,
}

impl TimelineHistogram {
    /// Sum of every bucket count.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.count).sum()
    }

    /// Bucket width as a duration.
    pub fn bucket_width(&self) -> Duration {
        Duration::milliseconds(self.bucket_width_ms)
    }

    /// Span covered by the buckets, or `None` when there are none.
    pub fn span(&self) -> Option<SyntheticWindow> {
        let first = self.buckets.first()?;
        let last = self.buckets.last()?;
        Some(SyntheticWindow {
            start: first.start,
            end: last.start + self.bucket_width(),
        })
    }

    /// Bucket-start→count series; daily or coarser widths render as dates.
    pub fn series(&self) -> Vec<SeriesPoint> {
        let daily = self.bucket_width_ms % Duration::days(1).num_milliseconds() == 0;
        self.buckets
            .iter()
            .map(|bucket| SeriesPoint {
                label: if daily {
                    bucket.start.format("%Y-%m-%d").to_string()
                } else {
                    bucket.start.format("%Y-%m-%dT%H:%M").to_string()
                },
                value: bucket.count as f64,
            })
            .collect()
    }
}

/// Bucket width in milliseconds; rejects anything below one millisecond.
pub(crate) fn width_millis(width: Duration) -> Result<i64, SimError> {
    let millis = width.num_milliseconds();
    if millis <= 0 {
        return Err(SimError::InvalidBucketWidth(millis));
    }
    Ok(millis)
}

/// Index of the bucket containing `at`.
pub(crate) fn bucket_index(at: DateTime<Utc>, width_ms: i64) -> i64 {
    at.timestamp_millis().div_euclid(width_ms)
}

/// Lay out zero-filled buckets spanning `window` plus every counted bucket.
pub(crate) fn build_histogram(
    window: SyntheticWindow,
    width_ms: i64,
    counts: &BTreeMap<i64, usize>,
) -> Result<TimelineHistogram, SimError> {
    let mut first = bucket_index(window.start, width_ms);
    let last_instant = if window.end > window.start {
        window.end - Duration::milliseconds(1)
    } else {
        window.start
    };
    let mut last = bucket_index(last_instant, width_ms);
    if let Some((min_key, _)) = counts.first_key_value() {
        first = first.min(*min_key);
    }
    if let Some((max_key, _)) = counts.last_key_value() {
        last = last.max(*max_key);
    }
    let requested = u64::try_from(last - first + 1).unwrap_or(u64::MAX);
    if requested > MAX_TIMELINE_BUCKETS {
        return Err(SimError::TooManyBuckets {
            requested,
            limit: MAX_TIMELINE_BUCKETS,
        });
    }
    let mut buckets = Vec::with_capacity(requested as usize);
    for idx in first..=last {
        let start = DateTime::<Utc>::from_timestamp_millis(idx * width_ms).ok_or_else(|| {
            SimError::Configuration(format!("bucket {idx} falls outside the supported time range"))
        })?;
        buckets.push(TimelineBucket {
            start,
            count: counts.get(&idx).copied().unwrap_or(0),
        });
    }
    Ok(TimelineHistogram {
        bucket_width_ms: width_ms,
        buckets,
    })
}
