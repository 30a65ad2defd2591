//! Fixed weighted profiles and the phrase polarity nudge.
//!
//! The nudge is a pure function of the phrase:
//! 1. Tokenize into lower-cased `[A-Za-z']+` words.
//! 2. Score `+1` per positive-lexicon token and `-1` per negative-lexicon
//!    token, divided by the token count.
//! 3. Above `POLARITY_THRESHOLD` the phrase is positive, below its negation
//!    negative, otherwise neutral.
//! 4. A polarized phrase moves `POLARITY_SHIFT` of weight from the opposite
//!    sentiment to its own; then an FNV-1a jitter in `[-HASH_JITTER,
//!    HASH_JITTER]` moves weight between positive and negative.
//! 5. Every weight is floored at `MIN_SENTIMENT_WEIGHT`.

use serde::{Deserialize, Serialize};

use crate::constants::collector::{
    BASE_SENTIMENT_WEIGHTS, HASH_JITTER, MIN_SENTIMENT_WEIGHT, NEGATIVE_WORDS, POLARITY_SHIFT,
    POLARITY_THRESHOLD, POSITIVE_WORDS, REGION_WEIGHTS, SOURCE_WEIGHTS,
};
use crate::data::{Category, Region, Sentiment, Source};
use crate::errors::SimError;
use crate::hash::fnv1a64;
use crate::random::WeightTable;
use crate::utils::word_tokens;

/// Coarse sentiment lean of a topic phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicPolarity {
    Negative,
    Neutral,
    Positive,
}

impl TopicPolarity {
    /// Normalized lexicon score in `[-1, 1]`; `0.0` for phrases without words.
    pub fn lexicon_score(phrase: &str) -> f64 {
        let tokens = word_tokens(phrase);
        let score: i64 = tokens
            .iter()
            .map(|token| {
                let mut value = 0;
                if POSITIVE_WORDS.contains(&token.as_str()) {
                    value += 1;
                }
                if NEGATIVE_WORDS.contains(&token.as_str()) {
                    value -= 1;
                }
                value
            })
            .sum();
        score as f64 / tokens.len().max(1) as f64
    }

    /// Polarity of a phrase.
    pub fn from_phrase(phrase: &str) -> Self {
        let score = Self::lexicon_score(phrase);
        if score > POLARITY_THRESHOLD {
            TopicPolarity::Positive
        } else if score < -POLARITY_THRESHOLD {
            TopicPolarity::Negative
        } else {
            TopicPolarity::Neutral
        }
    }
}

/// Deterministic jitter in `[-HASH_JITTER, HASH_JITTER]` derived from the phrase.
pub fn phrase_jitter(phrase: &str) -> f64 {
    let unit = (fnv1a64(phrase.as_bytes()) % 10_001) as f64 / 10_000.0;
    (unit * 2.0 - 1.0) * HASH_JITTER
}

/// Sentiment weights (in `Sentiment::ALL` order) for a phrase.
pub fn sentiment_weights(phrase: &str) -> [f64; 3] {
    let shift = match TopicPolarity::from_phrase(phrase) {
        TopicPolarity::Positive => POLARITY_SHIFT,
        TopicPolarity::Negative => -POLARITY_SHIFT,
        TopicPolarity::Neutral => 0.0,
    };
    let delta = shift + phrase_jitter(phrase);
    let mut weights = BASE_SENTIMENT_WEIGHTS;
    weights[Sentiment::Positive.index()] += delta;
    weights[Sentiment::Negative.index()] -= delta;
    weights.map(|weight| weight.max(MIN_SENTIMENT_WEIGHT))
}

/// The three weight tables one job samples from.
#[derive(Clone, Debug)]
pub struct SamplingProfile {
    /// Lean derived from the phrase.
    pub polarity: TopicPolarity,
    pub sources: WeightTable<Source>,
    pub regions: WeightTable<Region>,
    pub sentiments: WeightTable<Sentiment>,
}

impl SamplingProfile {
    /// Build the profile for a phrase.
    pub fn for_phrase(phrase: &str) -> Result<Self, SimError> {
        Ok(Self {
            polarity: TopicPolarity::from_phrase(phrase),
            sources: table_for(Source::ALL, &SOURCE_WEIGHTS)?,
            regions: table_for(Region::ALL, &REGION_WEIGHTS)?,
            sentiments: table_for(Sentiment::ALL, &sentiment_weights(phrase))?,
        })
    }
}

fn table_for<C: Category>(members: &[C], weights: &[f64]) -> Result<WeightTable<C>, SimError> {
    if members.len() != weights.len() {
        return Err(SimError::Configuration(format!(
            "expected {} weights, found {}",
            members.len(),
            weights.len()
        )));
    }
    WeightTable::new(members.iter().copied().zip(weights.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_score_counts_trigger_words() {
        assert_eq!(TopicPolarity::lexicon_score(""), 0.0);
        assert_eq!(TopicPolarity::lexicon_score("great growth"), 1.0);
        assert_eq!(TopicPolarity::lexicon_score("market decline risk now"), -0.5);
        assert_eq!(TopicPolarity::lexicon_score("good and bad"), 0.0);
    }

    #[test]
    fn polarity_follows_thresholds() {
        assert_eq!(
            TopicPolarity::from_phrase("amazing battery growth"),
            TopicPolarity::Positive
        );
        assert_eq!(
            TopicPolarity::from_phrase("worried about the decline"),
            TopicPolarity::Negative
        );
        assert_eq!(
            TopicPolarity::from_phrase("battery tech"),
            TopicPolarity::Neutral
        );
    }

    #[test]
    fn jitter_is_bounded_and_deterministic() {
        for phrase in ["a", "battery tech", "climate", "ai"] {
            let jitter = phrase_jitter(phrase);
            assert!(jitter.abs() <= HASH_JITTER + 1e-12);
            assert_eq!(jitter, phrase_jitter(phrase));
        }
    }

    #[test]
    fn polarized_phrases_shift_sentiment_weights() {
        let neg = Sentiment::Negative.index();
        let pos = Sentiment::Positive.index();
        let positive = sentiment_weights("great growth");
        let negative = sentiment_weights("terrible decline");
        assert!(positive[pos] > positive[neg]);
        assert!(negative[neg] > negative[pos]);
        assert!(positive[pos] > negative[pos]);
        for weights in [positive, negative, sentiment_weights("neutral words")] {
            assert!(weights.iter().all(|w| *w >= MIN_SENTIMENT_WEIGHT));
        }
    }

    #[test]
    fn profile_tables_cover_every_label() {
        let profile = SamplingProfile::for_phrase("battery tech").unwrap();
        assert_eq!(profile.sources.probabilities().count(), Source::ALL.len());
        assert_eq!(profile.regions.probabilities().count(), Region::ALL.len());
        let total: f64 = profile.sentiments.probabilities().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_weight_lengths_are_configuration_errors() {
        assert!(matches!(
            table_for(Source::ALL, &[1.0, 2.0]),
            Err(SimError::Configuration(_))
        ));
    }
}
