/// Stable, versioned label sets shared by records, stores, and exports.
///
/// Stored records and exported artifacts depend on these exact strings; bump
/// `LABEL_SET_VERSION` whenever a label is added, removed, or renamed.
pub mod labels {
    /// Version of the label sets below.
    pub const LABEL_SET_VERSION: u32 = 1;
    /// Source channel labels, in canonical order.
    pub const SOURCE_LABELS: [&str; 3] = ["news", "social", "video"];
    /// Region code labels, in canonical order.
    pub const REGION_LABELS: [&str; 6] = [
        "africa",
        "asia_pacific",
        "europe",
        "latin_america",
        "middle_east",
        "north_america",
    ];
    /// Sentiment labels, in canonical order.
    pub const SENTIMENT_LABELS: [&str; 3] = ["negative", "neutral", "positive"];
    /// Sentinel label reported when no category dominates (empty input).
    pub const NONE_LABEL: &str = "none";
}

/// Constants used by job specs and the synthetic collector.
pub mod collector {
    /// Default number of records per job.
    pub const DEFAULT_VOLUME: u64 = 50_000;
    /// Default persistence chunk size when streaming a corpus.
    pub const DEFAULT_BATCH_SIZE: usize = 2_000;
    /// Offset mixed into derived job seeds so phrase-only seeds differ from raw hashes.
    pub const SPEC_SEED_OFFSET: u64 = 0x1D5E_ED00_C0FF_EE11;

    /// Source weights: news, social, video.
    pub const SOURCE_WEIGHTS: [f64; 3] = [0.3, 0.5, 0.2];
    /// Region weights in `REGION_LABELS` order.
    pub const REGION_WEIGHTS: [f64; 6] = [0.08, 0.24, 0.22, 0.12, 0.07, 0.27];
    /// Base sentiment weights: negative, neutral, positive.
    pub const BASE_SENTIMENT_WEIGHTS: [f64; 3] = [0.25, 0.40, 0.35];
    /// Weight moved between negative and positive for a polarized phrase.
    pub const POLARITY_SHIFT: f64 = 0.15;
    /// Maximum absolute hash jitter moved between negative and positive.
    pub const HASH_JITTER: f64 = 0.02;
    /// Lower bound kept on every sentiment weight after nudging.
    pub const MIN_SENTIMENT_WEIGHT: f64 = 0.05;
    /// Normalized lexicon score above which a phrase reads positive.
    pub const POLARITY_THRESHOLD: f64 = 0.05;

    /// Tokens that push a phrase toward positive polarity.
    pub const POSITIVE_WORDS: [&str; 8] = [
        "good",
        "great",
        "excellent",
        "love",
        "amazing",
        "excited",
        "celebrate",
        "growth",
    ];
    /// Tokens that push a phrase toward negative polarity.
    pub const NEGATIVE_WORDS: [&str; 8] = [
        "bad", "terrible", "awful", "hate", "concern", "worried", "decline", "risk",
    ];

    /// Target records per synthetic day when sizing the window.
    pub const RECORDS_PER_DAY: u64 = 200;
    /// Smallest synthetic window, in days.
    pub const MIN_WINDOW_DAYS: i64 = 7;
    /// Largest synthetic window, in days.
    pub const MAX_WINDOW_DAYS: i64 = 30;
    /// Default window anchor (exclusive end) as a Unix timestamp: 2025-01-01T00:00:00Z.
    pub const DEFAULT_WINDOW_END_UNIX: i64 = 1_735_689_600;
}

/// Constants used by the analyzer.
pub mod analyzer {
    /// Default histogram bucket width in seconds (one day).
    pub const DEFAULT_BUCKET_SECONDS: i64 = 86_400;
    /// Number of entries kept by top-N rankings.
    pub const DEFAULT_TOP_N: usize = 5;
    /// Tolerance used when checking that shares sum to one.
    pub const SHARE_TOLERANCE: f64 = 1e-9;
    /// Upper bound on histogram buckets for one timeline.
    pub const MAX_TIMELINE_BUCKETS: u64 = 100_000;
    /// Fixed-point scale used to sum sentiment scores order-independently.
    pub const SCORE_SCALE: f64 = 1_000_000.0;
}

/// Constants used by CSV and report exports.
pub mod export {
    /// Column header written before CSV record rows.
    pub const CSV_HEADER: [&str; 7] = [
        "id",
        "source",
        "region",
        "sentiment",
        "score",
        "timestamp",
        "snippet",
    ];
    /// Report title used by the composite report.
    pub const REPORT_TITLE: &str = "Insight Report";
}

/// Constants used by job bookkeeping.
pub mod job {
    /// Message recorded on jobs stopped through their cancellation token.
    pub const CANCELLED_MESSAGE: &str = "cancelled";
    /// Notification destination used by the log notifier.
    pub const DEFAULT_DESTINATION: &str = "user";
}

/// FNV-1a 64-bit parameters used for stable hashing.
pub mod hash {
    /// FNV-1a 64-bit offset basis.
    pub const FNV1A64_OFFSET: u64 = 0xcbf29ce484222325;
    /// FNV-1a 64-bit prime.
    pub const FNV1A64_PRIME: u64 = 0x100000001b3;
}
