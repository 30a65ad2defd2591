use chrono::{DateTime, Duration, Utc};

use crate::constants::analyzer::{DEFAULT_BUCKET_SECONDS, DEFAULT_TOP_N};
use crate::constants::collector::DEFAULT_BATCH_SIZE;
use crate::random::TimestampSkew;
use crate::window::SyntheticWindow;

/// Controls how the collector lays records out in time and chunks them.
#[derive(Clone, Debug)]
pub struct CollectorConfig {
    /// Exclusive end of every job's synthetic window.
    ///
    /// Fixed by default so corpora are reproducible offline; a coordinator
    /// may anchor it at job creation time instead.
    pub window_end: DateTime<Utc>,
    /// Spread of timestamps inside the window.
    pub timestamp_skew: TimestampSkew,
    /// Records per chunk when streaming a corpus to a store.
    pub batch_size: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            window_end: SyntheticWindow::default_end(),
            timestamp_skew: TimestampSkew::Uniform,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Controls histogram windows and rankings.
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Window the timeline must span; `None` derives it from the records.
    pub window: Option<SyntheticWindow>,
    /// Bucket width used by full analyses.
    pub bucket_width: Duration,
    /// Entries kept by top-N rankings.
    pub top_n: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window: None,
            bucket_width: Duration::seconds(DEFAULT_BUCKET_SECONDS),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Top-level job coordinator configuration.
#[derive(Clone, Debug, Default)]
pub struct CoordinatorConfig {
    /// Collector settings shared by every job.
    pub collector: CollectorConfig,
    /// Analyzer settings; a `None` window is replaced by each job's own window.
    pub analyzer: AnalyzerConfig,
}
