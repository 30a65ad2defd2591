//! Aggregate statistics over finite record collections.
//!
//! Every artifact is computed from counts and fixed-point sums, so results do
//! not depend on the order records arrive in. The free functions cover the
//! one-shot cases; [`AnalysisAccumulator`] builds every artifact in a single
//! pass over batches that never need to be held at once.

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::constants::analyzer::SCORE_SCALE;
use crate::constants::labels::NONE_LABEL;
use crate::data::{Category, JobId, Label, Record, Region, Sentiment, Source};
use crate::errors::SimError;
use crate::window::SyntheticWindow;

/// Per-category counts and shares.
pub mod distribution;
/// Fixed-width record histograms.
pub mod timeline;

pub use distribution::{
    CategoryShare, Distribution, RegionShare, SentimentMix, SeriesPoint, SourceBreakdown,
};
pub use timeline::{TimelineBucket, TimelineHistogram};

use distribution::Tally;

/// Count records per sentiment label.
pub fn sentiment_mix<'a, I>(records: I) -> SentimentMix
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut tally = Tally::new();
    for record in records {
        tally.add(record.sentiment);
    }
    Distribution::from_tally(&tally)
}

/// Count records per region code.
pub fn region_share<'a, I>(records: I) -> RegionShare
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut tally = Tally::new();
    for record in records {
        tally.add(record.region);
    }
    Distribution::from_tally(&tally)
}

/// Count records per source channel.
pub fn source_breakdown<'a, I>(records: I) -> SourceBreakdown
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut tally = Tally::new();
    for record in records {
        tally.add(record.source);
    }
    Distribution::from_tally(&tally)
}

/// Histogram of records over their synthetic window, zero-filled.
///
/// Records inside the default-anchored window for their volume get that whole
/// window; records outside it get their own extent. An empty input spans the
/// default synthetic window.
pub fn timeline_histogram<'a, I>(
    records: I,
    bucket_width: Duration,
) -> Result<TimelineHistogram, SimError>
where
    I: IntoIterator<Item = &'a Record>,
{
    Analyzer::default().timeline_histogram(records, bucket_width)
}

/// Headline figures for `records`, stamped with the current time.
pub fn summary<'a, I>(records: I) -> AnalysisSummary
where
    I: IntoIterator<Item = &'a Record>,
{
    summary_at(records, Utc::now())
}

/// Headline figures for `records`, stamped with `generated_at`.
pub fn summary_at<'a, I>(records: I, generated_at: DateTime<Utc>) -> AnalysisSummary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut acc = AnalysisAccumulator::counts_only();
    acc.ingest(records);
    acc.summary_at(generated_at)
}

/// Headline figures of one analysis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisSummary {
    /// Smallest job id among the records, `None` for an empty input.
    pub job_id: Option<JobId>,
    pub total_records: usize,
    #[serde(serialize_with = "label_or_none")]
    pub dominant_sentiment: Option<Sentiment>,
    #[serde(serialize_with = "label_or_none")]
    pub dominant_region: Option<Region>,
    #[serde(serialize_with = "label_or_none")]
    pub dominant_source: Option<Source>,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Mean sentiment score, `0.0` for an empty input.
    pub average_score: f64,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisSummary {
    /// Dominant sentiment label or `"none"`.
    pub fn dominant_sentiment_label(&self) -> Label {
        self.dominant_sentiment.map_or(NONE_LABEL, Category::label)
    }

    /// Dominant region label or `"none"`.
    pub fn dominant_region_label(&self) -> Label {
        self.dominant_region.map_or(NONE_LABEL, Category::label)
    }

    /// Dominant source label or `"none"`.
    pub fn dominant_source_label(&self) -> Label {
        self.dominant_source.map_or(NONE_LABEL, Category::label)
    }
}

fn label_or_none<C, S>(value: &Option<C>, serializer: S) -> Result<S::Ok, S::Error>
where
    C: Category,
    S: Serializer,
{
    serializer.serialize_str(value.map_or(NONE_LABEL, Category::label))
}

/// Every artifact of one analysis, produced in a single pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis {
    pub summary: AnalysisSummary,
    pub sentiment: SentimentMix,
    pub regions: RegionShare,
    pub sources: SourceBreakdown,
    pub timeline: TimelineHistogram,
    /// Highest-ranked regions with at least one record.
    pub top_regions: Vec<CategoryShare<Region>>,
    /// Highest-ranked sources with at least one record.
    pub top_sources: Vec<CategoryShare<Source>>,
}

/// Incremental, order-independent analysis state.
///
/// Holds only counts, a fixed-point score sum, and one counter per occupied
/// histogram bucket; batches can be dropped once ingested.
#[derive(Clone, Debug)]
pub struct AnalysisAccumulator {
    width_ms: i64,
    total: usize,
    sentiments: Tally<Sentiment>,
    regions: Tally<Region>,
    sources: Tally<Source>,
    buckets: BTreeMap<i64, usize>,
    score_units: i128,
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
    job_id: Option<JobId>,
}

impl AnalysisAccumulator {
    /// Empty accumulator bucketing timestamps by `bucket_width`.
    ///
    /// Fails with `InvalidBucketWidth` when the width is under one millisecond.
    pub fn new(bucket_width: Duration) -> Result<Self, SimError> {
        let width_ms = timeline::width_millis(bucket_width)?;
        Ok(Self::with_width_ms(width_ms))
    }

    // Summaries never read the buckets, so any valid width works.
    fn counts_only() -> Self {
        Self::with_width_ms(Duration::days(1).num_milliseconds())
    }

    fn with_width_ms(width_ms: i64) -> Self {
        Self {
            width_ms,
            total: 0,
            sentiments: Tally::new(),
            regions: Tally::new(),
            sources: Tally::new(),
            buckets: BTreeMap::new(),
            score_units: 0,
            earliest: None,
            latest: None,
            job_id: None,
        }
    }

    /// Number of records ingested so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Bucket width in milliseconds.
    pub fn bucket_width_ms(&self) -> i64 {
        self.width_ms
    }

    /// Earliest and latest timestamps seen, as a half-open window.
    pub fn extent(&self) -> Option<SyntheticWindow> {
        let start = self.earliest?;
        let latest = self.latest?;
        Some(SyntheticWindow { start, end: start }.cover(latest))
    }

    /// Add one record.
    pub fn push(&mut self, record: &Record) {
        self.total += 1;
        self.sentiments.add(record.sentiment);
        self.regions.add(record.region);
        self.sources.add(record.source);
        *self
            .buckets
            .entry(timeline::bucket_index(record.timestamp, self.width_ms))
            .or_insert(0) += 1;
        self.score_units += (record.sentiment_score * SCORE_SCALE).round() as i128;
        self.earliest = Some(self.earliest.map_or(record.timestamp, |t| t.min(record.timestamp)));
        self.latest = Some(self.latest.map_or(record.timestamp, |t| t.max(record.timestamp)));
        self.job_id = Some(self.job_id.map_or(record.job_id, |id| id.min(record.job_id)));
    }

    /// Add every record of a batch.
    pub fn ingest<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.push(record);
        }
    }

    /// Fold another accumulator with the same bucket width into this one.
    pub fn merge(&mut self, other: Self) -> Result<(), SimError> {
        if other.width_ms != self.width_ms {
            return Err(SimError::Configuration(format!(
                "cannot merge accumulators with bucket widths {}ms and {}ms",
                self.width_ms, other.width_ms
            )));
        }
        self.total += other.total;
        self.sentiments.merge(&other.sentiments);
        self.regions.merge(&other.regions);
        self.sources.merge(&other.sources);
        for (idx, count) in other.buckets {
            *self.buckets.entry(idx).or_insert(0) += count;
        }
        self.score_units += other.score_units;
        self.earliest = match (self.earliest, other.earliest) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.latest = match (self.latest, other.latest) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.job_id = match (self.job_id, other.job_id) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Ok(())
    }

    /// Headline figures for everything ingested so far.
    pub fn summary_at(&self, generated_at: DateTime<Utc>) -> AnalysisSummary {
        let sentiment = Distribution::from_tally(&self.sentiments);
        let average_score = if self.total == 0 {
            0.0
        } else {
            self.score_units as f64 / SCORE_SCALE / self.total as f64
        };
        AnalysisSummary {
            job_id: self.job_id,
            total_records: self.total,
            dominant_sentiment: sentiment.dominant(),
            dominant_region: Distribution::from_tally(&self.regions).dominant(),
            dominant_source: Distribution::from_tally(&self.sources).dominant(),
            positive: sentiment.count(Sentiment::Positive),
            neutral: sentiment.count(Sentiment::Neutral),
            negative: sentiment.count(Sentiment::Negative),
            average_score,
            generated_at,
        }
    }

    /// Histogram over the default-anchored window, the record extent, or the
    /// default window when empty.
    pub fn timeline(&self) -> Result<TimelineHistogram, SimError> {
        self.timeline_within(None)
    }

    fn timeline_within(
        &self,
        window: Option<SyntheticWindow>,
    ) -> Result<TimelineHistogram, SimError> {
        let window = self.resolve_window(window);
        timeline::build_histogram(window, self.width_ms, &self.buckets)
    }

    /// Configured window grown over every record; else the synthetic window
    /// for this volume at the default anchor when it holds every record; else
    /// the record extent; else the default window.
    fn resolve_window(&self, configured: Option<SyntheticWindow>) -> SyntheticWindow {
        match (configured, self.earliest, self.latest) {
            (Some(window), Some(earliest), Some(latest)) => window.cover(earliest).cover(latest),
            (Some(window), _, _) => window,
            (None, Some(earliest), Some(latest)) => {
                let anchored =
                    SyntheticWindow::for_volume(SyntheticWindow::default_end(), self.total as u64);
                if anchored.contains(earliest) && anchored.contains(latest) {
                    anchored
                } else {
                    self.extent().unwrap_or(anchored)
                }
            }
            (None, _, _) => SyntheticWindow::default(),
        }
    }

    /// Every artifact, with the timeline resolved as in [`Self::timeline`].
    pub fn finish(self) -> Result<Analysis, SimError> {
        Analyzer::default().finish(self)
    }
}

/// Analyzer with a configurable histogram window and ranking depth.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer with explicit settings.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Use `window` as the span every timeline must cover.
    pub fn with_window(mut self, window: SyntheticWindow) -> Self {
        self.config.window = Some(window);
        self
    }

    /// Active settings.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Fresh accumulator using the configured bucket width.
    pub fn accumulator(&self) -> Result<AnalysisAccumulator, SimError> {
        AnalysisAccumulator::new(self.config.bucket_width)
    }

    /// Histogram of `records` with an explicit bucket width.
    pub fn timeline_histogram<'a, I>(
        &self,
        records: I,
        bucket_width: Duration,
    ) -> Result<TimelineHistogram, SimError>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut acc = AnalysisAccumulator::new(bucket_width)?;
        acc.ingest(records);
        acc.timeline_within(self.config.window)
    }

    /// Every artifact for `records`, stamped with the current time.
    pub fn analyze<'a, I>(&self, records: I) -> Result<Analysis, SimError>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        self.analyze_at(records, Utc::now())
    }

    /// Every artifact for `records`, stamped with `generated_at`.
    pub fn analyze_at<'a, I>(
        &self,
        records: I,
        generated_at: DateTime<Utc>,
    ) -> Result<Analysis, SimError>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut acc = self.accumulator()?;
        acc.ingest(records);
        self.finish_at(acc, generated_at)
    }

    /// Turn an accumulator into every artifact, stamped with the current time.
    pub fn finish(&self, acc: AnalysisAccumulator) -> Result<Analysis, SimError> {
        self.finish_at(acc, Utc::now())
    }

    /// Turn an accumulator into every artifact, stamped with `generated_at`.
    pub fn finish_at(
        &self,
        acc: AnalysisAccumulator,
        generated_at: DateTime<Utc>,
    ) -> Result<Analysis, SimError> {
        let timeline = acc.timeline_within(self.config.window)?;
        let summary = acc.summary_at(generated_at);
        let sentiment = Distribution::from_tally(&acc.sentiments);
        let regions = Distribution::from_tally(&acc.regions);
        let sources = Distribution::from_tally(&acc.sources);
        let top_regions = regions
            .top(self.config.top_n)
            .into_iter()
            .cloned()
            .collect();
        let top_sources = sources
            .top(self.config.top_n)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            job_id = ?summary.job_id,
            records = summary.total_records,
            buckets = timeline.buckets.len(),
            dominant_sentiment = summary.dominant_sentiment_label(),
            "[insight_sim:analyzer] analysis finished"
        );
        Ok(Analysis {
            summary,
            sentiment,
            regions,
            sources,
            timeline,
            top_regions,
            top_sources,
        })
    }
}
