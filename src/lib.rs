#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Aggregate statistics over record collections.
pub mod analyzer;
/// Deterministic synthetic corpus generation.
pub mod collector;
/// Collector, analyzer, and coordinator configuration types.
pub mod config;
/// Centralized constants: label sets, profile weights, and defaults.
pub mod constants;
/// Job spec, record, and label enumeration types.
pub mod data;
/// Reusable demo runners shared by downstream crates.
pub mod demo_apps;
/// CSV, chart, and report exports.
pub mod export;
mod hash;
/// Job lifecycle and coordination.
pub mod job;
/// Seeded random streams and weight tables.
pub mod random;
/// Record persistence backends.
pub mod store;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;
/// Synthetic time windows.
pub mod window;

mod errors;

pub use analyzer::{
    Analysis, AnalysisAccumulator, AnalysisSummary, Analyzer, Distribution, RegionShare,
    SentimentMix, SourceBreakdown, TimelineHistogram, region_share, sentiment_mix,
    source_breakdown, summary, timeline_histogram,
};
pub use collector::{Collector, Corpus, generate};
pub use config::{AnalyzerConfig, CollectorConfig, CoordinatorConfig};
pub use constants::labels::{LABEL_SET_VERSION, REGION_LABELS, SENTIMENT_LABELS, SOURCE_LABELS};
pub use data::{Category, JobSpec, Record, Region, Sentiment, Source};
pub use errors::SimError;
pub use export::{ChartKind, ChartSeries, InsightReport, chart_series, write_records_csv};
pub use job::{CancellationToken, Job, JobCoordinator, JobStatus, LogNotifier, Notifier};
pub use random::{RandomStream, TimestampSkew, WeightTable};
pub use store::{InMemoryRecordStore, RecordStore};
pub use types::{JobId, Label, RecordSeq};
pub use window::SyntheticWindow;
