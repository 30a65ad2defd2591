use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::constants::collector::{DEFAULT_VOLUME, SPEC_SEED_OFFSET};
use crate::constants::labels::{REGION_LABELS, SENTIMENT_LABELS, SOURCE_LABELS};
use crate::errors::SimError;
use crate::hash::stable_hash_str;
use crate::utils::normalize_inline_whitespace;

pub use crate::types::{JobId, Label, Phrase, RecordSeq, Snippet};

/// A member of one of the fixed, versioned label enumerations.
///
/// `ALL` lists every member in canonical order; `label` returns the stable
/// exported string. Labels within one enumeration are unique.
pub trait Category: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every member, in canonical order.
    const ALL: &'static [Self];

    /// Stable exported label.
    fn label(self) -> Label;

    /// Position of this member in `ALL`.
    fn index(self) -> usize;

    /// Parse a stable label back into a member.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|member| member.label() == label)
    }
}

macro_rules! label_enum {
    ($name:ident, $labels:expr, [$($variant:ident),+ $(,)?]) => {
        impl Category for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> Label {
                $labels[self.index()]
            }

            fn index(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

/// Channel a synthetic record claims to come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// News articles.
    News,
    /// Social posts.
    Social,
    /// Video descriptions and comments.
    Video,
}

label_enum!(Source, SOURCE_LABELS, [News, Social, Video]);

/// Coarse region code attached to a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Africa,
    AsiaPacific,
    Europe,
    LatinAmerica,
    MiddleEast,
    NorthAmerica,
}

label_enum!(
    Region,
    REGION_LABELS,
    [
        Africa,
        AsiaPacific,
        Europe,
        LatinAmerica,
        MiddleEast,
        NorthAmerica
    ]
);

/// Sentiment label attached to a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

label_enum!(Sentiment, SENTIMENT_LABELS, [Negative, Neutral, Positive]);

/// Input of one research job. Immutable once the job starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Topic phrase, whitespace-normalized.
    pub phrase: Phrase,
    /// Number of records to synthesize.
    pub volume: u64,
    /// Seed for every random stream of the job.
    pub seed: u64,
}

impl JobSpec {
    /// Build a spec whose seed is derived from `(phrase, volume)`.
    pub fn new(phrase: impl AsRef<str>, volume: u64) -> Self {
        let phrase = normalize_inline_whitespace(phrase);
        let seed = Self::derive_seed(&phrase, volume);
        Self {
            phrase,
            volume,
            seed,
        }
    }

    /// Build a spec with an explicit seed.
    pub fn with_seed(phrase: impl AsRef<str>, volume: u64, seed: u64) -> Self {
        Self {
            phrase: normalize_inline_whitespace(phrase),
            volume,
            seed,
        }
    }

    /// Build a spec from optional form inputs, applying the defaults.
    pub fn from_parts(phrase: impl AsRef<str>, volume: Option<u64>, seed: Option<u64>) -> Self {
        let volume = volume.unwrap_or(DEFAULT_VOLUME);
        match seed {
            Some(seed) => Self::with_seed(phrase, volume, seed),
            None => Self::new(phrase, volume),
        }
    }

    /// Seed used when none is supplied. Pure function of the inputs.
    pub fn derive_seed(phrase: &str, volume: u64) -> u64 {
        stable_hash_str(volume ^ SPEC_SEED_OFFSET, phrase)
    }

    /// Reject specs that cannot start a job.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.phrase.trim().is_empty() {
            return Err(SimError::InvalidSpec("phrase must not be empty".into()));
        }
        if self.volume == 0 {
            return Err(SimError::InvalidSpec("volume must be positive".into()));
        }
        Ok(())
    }
}

/// One synthetic data point. Immutable once generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sequence number within the job (`0..volume`).
    pub id: RecordSeq,
    /// Job that generated the record.
    pub job_id: JobId,
    pub source: Source,
    pub region: Region,
    pub sentiment: Sentiment,
    /// Score in `[-1, 1]` consistent with `sentiment`.
    pub sentiment_score: f64,
    /// Point in time inside the job's synthetic window.
    pub timestamp: DateTime<Utc>,
    /// Display-only text.
    pub text_snippet: Snippet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_canonical_order() {
        let sources: Vec<_> = Source::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(sources, SOURCE_LABELS);
        let regions: Vec<_> = Region::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(regions, REGION_LABELS);
        let sentiments: Vec<_> = Sentiment::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(sentiments, SENTIMENT_LABELS);
    }

    #[test]
    fn from_label_round_trips_every_member() {
        for region in Region::ALL {
            assert_eq!(Region::from_label(region.label()), Some(*region));
        }
        assert_eq!(Sentiment::from_label("ecstatic"), None);
    }

    #[test]
    fn serde_uses_stable_labels() {
        let json = serde_json::to_string(&Region::AsiaPacific).unwrap();
        assert_eq!(json, "\"asia_pacific\"");
        let parsed: Source = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(parsed, Source::Video);
    }

    #[test]
    fn derived_seed_is_stable_and_input_sensitive() {
        let a = JobSpec::new("battery tech", 100);
        let b = JobSpec::new("  battery   tech ", 100);
        assert_eq!(a, b);
        assert_ne!(a.seed, JobSpec::new("battery tech", 101).seed);
        assert_ne!(a.seed, JobSpec::new("battery tech!", 100).seed);
    }

    #[test]
    fn from_parts_applies_defaults() {
        let spec = JobSpec::from_parts("ai", None, None);
        assert_eq!(spec.volume, DEFAULT_VOLUME);
        assert_eq!(spec.seed, JobSpec::derive_seed("ai", DEFAULT_VOLUME));
        let seeded = JobSpec::from_parts("ai", Some(10), Some(7));
        assert_eq!(seeded.seed, 7);
    }

    #[test]
    fn validate_rejects_empty_phrase_and_zero_volume() {
        assert!(matches!(
            JobSpec::with_seed("", 10, 1).validate(),
            Err(SimError::InvalidSpec(_))
        ));
        assert!(matches!(
            JobSpec::with_seed("   ", 10, 1).validate(),
            Err(SimError::InvalidSpec(_))
        ));
        assert!(matches!(
            JobSpec::with_seed("x", 0, 1).validate(),
            Err(SimError::InvalidSpec(_))
        ));
        assert!(JobSpec::with_seed("x", 1, 1).validate().is_ok());
    }
}
