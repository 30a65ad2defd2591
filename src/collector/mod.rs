//! Deterministic synthetic corpus generation.
//!
//! Ownership model:
//! - `Collector` validates a `JobSpec` and resolves its sampling profile and window.
//! - `Corpus` is the restartable producer: record `i` is a pure function of
//!   `(spec, i)`, so the corpus can be iterated, re-iterated, resumed from any
//!   index, or chunked into batches without holding more than one batch.

use std::sync::Arc;

use tracing::debug;

use crate::config::CollectorConfig;
use crate::data::{JobId, JobSpec, Record, RecordSeq, Sentiment};
use crate::errors::SimError;
use crate::random::{RandomStream, TimestampSkew};
use crate::window::SyntheticWindow;

/// Fixed weighted profiles and the phrase polarity nudge.
pub mod profiles;
mod snippet;

pub use profiles::{SamplingProfile, TopicPolarity};

/// Generate the corpus for `spec` with default collector settings.
pub fn generate(spec: &JobSpec) -> Result<Corpus, SimError> {
    Collector::default().generate(spec)
}

/// Builds corpora from job specs.
#[derive(Clone, Debug, Default)]
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    /// Create a collector with explicit settings.
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// Active settings.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Validate `spec` and return its lazy corpus.
    ///
    /// Fails with `InvalidSpec` for an empty phrase or zero volume.
    pub fn generate(&self, spec: &JobSpec) -> Result<Corpus, SimError> {
        spec.validate()?;
        let profile = SamplingProfile::for_phrase(&spec.phrase)?;
        let window = SyntheticWindow::for_volume(self.config.window_end, spec.volume);
        debug!(
            phrase = %spec.phrase,
            volume = spec.volume,
            seed = spec.seed,
            polarity = ?profile.polarity,
            window_days = (window.end - window.start).num_days(),
            "[insight_sim:collector] corpus ready"
        );
        Ok(Corpus {
            spec: spec.clone(),
            job_id: 0,
            window,
            skew: self.config.timestamp_skew,
            profile: Arc::new(profile),
        })
    }
}

/// Finite, restartable sequence of exactly `spec.volume` synthetic records.
#[derive(Clone, Debug)]
pub struct Corpus {
    spec: JobSpec,
    job_id: JobId,
    window: SyntheticWindow,
    skew: TimestampSkew,
    profile: Arc<SamplingProfile>,
}

impl Corpus {
    /// Tag every produced record with `job_id`.
    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = job_id;
        self
    }

    /// Spec the corpus was built from.
    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// Job the records belong to.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Window every timestamp falls into.
    pub fn window(&self) -> SyntheticWindow {
        self.window
    }

    /// Weight tables used for this corpus.
    pub fn profile(&self) -> &SamplingProfile {
        &self.profile
    }

    /// Number of records (`spec.volume`).
    pub fn len(&self) -> u64 {
        self.spec.volume
    }

    /// Always `false` for a validated spec.
    pub fn is_empty(&self) -> bool {
        self.spec.volume == 0
    }

    /// Record at sequence position `idx`, or `None` past the end.
    pub fn record_at(&self, idx: RecordSeq) -> Option<Record> {
        if idx >= self.spec.volume {
            return None;
        }
        let mut stream = RandomStream::derive_indexed(self.spec.seed, idx);
        let source = stream.choose(&self.profile.sources);
        let region = stream.choose(&self.profile.regions);
        let sentiment = stream.choose(&self.profile.sentiments);
        let sentiment_score = draw_score(sentiment, &mut stream);
        let timestamp = stream.next_timestamp(self.window.start, self.window.end, self.skew);
        let text_snippet = snippet::compose(&self.spec.phrase, source, sentiment, &mut stream);
        Some(Record {
            id: idx,
            job_id: self.job_id,
            source,
            region,
            sentiment,
            sentiment_score,
            timestamp,
            text_snippet,
        })
    }

    /// Lazy iterator over every record in sequence order.
    pub fn iter(&self) -> CorpusIter<'_> {
        self.iter_from(0)
    }

    /// Lazy iterator resuming at sequence position `start`.
    pub fn iter_from(&self, start: RecordSeq) -> CorpusIter<'_> {
        CorpusIter {
            corpus: self,
            next: start.min(self.spec.volume),
        }
    }

    /// Lazy iterator of chunks holding at most `size` records each.
    pub fn batches(&self, size: usize) -> CorpusBatches<'_> {
        self.batches_from(0, size)
    }

    /// Chunked iterator resuming at sequence position `start`.
    pub fn batches_from(&self, start: RecordSeq, size: usize) -> CorpusBatches<'_> {
        CorpusBatches {
            records: self.iter_from(start),
            size: size.max(1),
        }
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = Record;
    type IntoIter = CorpusIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Score consistent with the label: negative below `-0.05`, neutral within
/// `[-0.05, 0.05]`, positive above `0.05`. Rounded to four decimals.
fn draw_score(sentiment: Sentiment, stream: &mut RandomStream) -> f64 {
    let raw = match sentiment {
        Sentiment::Positive => stream.next_in_range(0.06, 1.0),
        Sentiment::Negative => -stream.next_in_range(0.06, 1.0),
        Sentiment::Neutral => stream.next_in_range(-0.05, 0.05),
    };
    (raw * 10_000.0).round() / 10_000.0
}

/// Iterator over a corpus; see [`Corpus::iter`].
#[derive(Clone, Debug)]
pub struct CorpusIter<'a> {
    corpus: &'a Corpus,
    next: RecordSeq,
}

impl CorpusIter<'_> {
    /// Sequence position of the next record; a checkpoint for `iter_from`.
    pub fn position(&self) -> RecordSeq {
        self.next
    }
}

impl Iterator for CorpusIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let record = self.corpus.record_at(self.next)?;
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.corpus.spec.volume.saturating_sub(self.next);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Record> {
        let skip = u64::try_from(n).unwrap_or(u64::MAX);
        self.next = self.next.saturating_add(skip).min(self.corpus.spec.volume);
        self.next()
    }
}

impl ExactSizeIterator for CorpusIter<'_> {}

/// Chunked iterator over a corpus; see [`Corpus::batches`].
#[derive(Clone, Debug)]
pub struct CorpusBatches<'a> {
    records: CorpusIter<'a>,
    size: usize,
}

impl CorpusBatches<'_> {
    /// Sequence position of the first record of the next batch.
    pub fn position(&self) -> RecordSeq {
        self.records.position()
    }
}

impl Iterator for CorpusBatches<'_> {
    type Item = Vec<Record>;

    fn next(&mut self) -> Option<Vec<Record>> {
        let batch: Vec<Record> = self.records.by_ref().take(self.size).collect();
        if batch.is_empty() {
            return None;
        }
        debug!(
            job_id = self.records.corpus.job_id,
            emitted = self.records.position(),
            total = self.records.corpus.spec.volume,
            "[insight_sim:collector] batch produced"
        );
        Some(batch)
    }
}
