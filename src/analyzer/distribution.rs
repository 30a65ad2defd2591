use serde::Serialize;
use std::marker::PhantomData;

use crate::constants::labels::NONE_LABEL;
use crate::data::{Category, Label, Region, Sentiment, Source};

/// Distribution of records across sentiment labels.
pub type SentimentMix = Distribution<Sentiment>;
/// Distribution of records across region codes.
pub type RegionShare = Distribution<Region>;
/// Distribution of records across source channels.
pub type SourceBreakdown = Distribution<Source>;

/// Count and normalized share of one category.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryShare<C> {
    #[serde(skip)]
    pub category: C,
    pub label: Label,
    pub count: usize,
    /// `count / total`, or `0.0` when the total is zero.
    pub share: f64,
}

/// One label→value point handed to chart renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Counts and shares for every member of a fixed enumeration.
///
/// Entries are kept in canonical (`Category::ALL`) order and always include
/// zero-count members. Shares sum to one within floating-point tolerance, or
/// are all zero for an empty input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution<C: Category> {
    total: usize,
    entries: Vec<CategoryShare<C>>,
}

impl<C: Category> Distribution<C> {
    /// Build from per-category counts indexed by `Category::index`.
    pub(crate) fn from_tally(tally: &Tally<C>) -> Self {
        let total: usize = tally.counts.iter().sum();
        let entries = C::ALL
            .iter()
            .map(|category| {
                let count = tally.counts[category.index()];
                CategoryShare {
                    category: *category,
                    label: category.label(),
                    count,
                    share: if total == 0 {
                        0.0
                    } else {
                        count as f64 / total as f64
                    },
                }
            })
            .collect();
        Self { total, entries }
    }

    /// Number of records counted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Every category, in canonical order.
    pub fn entries(&self) -> &[CategoryShare<C>] {
        &self.entries
    }

    /// Count for one category.
    pub fn count(&self, category: C) -> usize {
        self.entries[category.index()].count
    }

    /// Share for one category.
    pub fn share(&self, category: C) -> f64 {
        self.entries[category.index()].share
    }

    /// Entries ordered by count descending, then label ascending.
    pub fn ranked(&self) -> Vec<&CategoryShare<C>> {
        let mut ranked: Vec<&CategoryShare<C>> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(b.label)));
        ranked
    }

    /// The `n` highest-ranked entries with a non-zero count.
    pub fn top(&self, n: usize) -> Vec<&CategoryShare<C>> {
        self.ranked()
            .into_iter()
            .filter(|entry| entry.count > 0)
            .take(n)
            .collect()
    }

    /// Category with the highest count; exact ties go to the smallest label.
    /// `None` when nothing was counted.
    pub fn dominant(&self) -> Option<C> {
        if self.total == 0 {
            return None;
        }
        self.ranked().first().map(|entry| entry.category)
    }

    /// Label of [`Distribution::dominant`], or the `"none"` sentinel.
    pub fn dominant_label(&self) -> Label {
        self.dominant().map_or(NONE_LABEL, Category::label)
    }

    /// Label→count series in canonical order.
    pub fn count_series(&self) -> Vec<SeriesPoint> {
        self.entries
            .iter()
            .map(|entry| SeriesPoint {
                label: entry.label.to_string(),
                value: entry.count as f64,
            })
            .collect()
    }

    /// Label→share series in canonical order.
    pub fn share_series(&self) -> Vec<SeriesPoint> {
        self.entries
            .iter()
            .map(|entry| SeriesPoint {
                label: entry.label.to_string(),
                value: entry.share,
            })
            .collect()
    }
}

/// Per-category counter indexed by `Category::index`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Tally<C> {
    counts: Vec<usize>,
    marker: PhantomData<C>,
}

impl<C: Category> Tally<C> {
    pub(crate) fn new() -> Self {
        Self {
            counts: vec![0; C::ALL.len()],
            marker: PhantomData,
        }
    }

    pub(crate) fn add(&mut self, category: C) {
        self.counts[category.index()] += 1;
    }

    pub(crate) fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
    }
}
