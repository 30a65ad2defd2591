//! Per-job deterministic random streams.
//!
//! Every stream is derived from an explicit seed and owns its whole state, so
//! two streams derived from the same seed produce identical sequences no
//! matter what other streams do in between. Nothing here is process-wide.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SimError;
use crate::hash::mix_index;

/// Small splitmix64 generator used for reproducible corpus synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    state: u64,
}

impl RandomStream {
    /// Stream for a seed.
    pub fn derive(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Independent child stream for item `index` of a seeded sequence.
    pub fn derive_indexed(seed: u64, index: u64) -> Self {
        Self::derive(mix_index(seed, index))
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Uniform float in `[0, 1)` with 53 bits of precision.
    pub fn next_float(&mut self) -> f64 {
        (self.next_u64_internal() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform float in `[low, high)`.
    pub fn next_in_range(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_float()
    }

    /// Uniform index in `0..len`; `0` when `len` is zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_float() * len as f64) as usize).min(len - 1)
    }

    /// Pick a label with probability proportional to its weight.
    ///
    /// Validates the weights on every call; prefer [`RandomStream::choose`]
    /// with a prebuilt [`WeightTable`] in loops.
    pub fn weighted_choice<L: Copy>(&mut self, weights: &[(L, f64)]) -> Result<L, SimError> {
        let table = WeightTable::new(weights.iter().copied())?;
        Ok(self.choose(&table))
    }

    /// Pick from a validated weight table.
    pub fn choose<L: Copy>(&mut self, table: &WeightTable<L>) -> L {
        let target = self.next_float() * table.total;
        let idx = table
            .cumulative
            .partition_point(|bound| *bound <= target)
            .min(table.labels.len() - 1);
        table.labels[idx]
    }

    /// Instant in `[start, end)` (millisecond resolution) drawn per `skew`.
    ///
    /// Returns `start` when the window is empty.
    pub fn next_timestamp(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        skew: TimestampSkew,
    ) -> DateTime<Utc> {
        let span_ms = (end - start).num_milliseconds();
        if span_ms <= 0 {
            return start;
        }
        let unit = skew.apply(self.next_float());
        let offset = ((unit * span_ms as f64) as i64).clamp(0, span_ms - 1);
        start + Duration::milliseconds(offset)
    }
}

impl rand::RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Validated label→weight table with precomputed cumulative bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightTable<L> {
    labels: Vec<L>,
    weights: Vec<f64>,
    cumulative: Vec<f64>,
    total: f64,
}

impl<L: Copy> WeightTable<L> {
    /// Build a table. Weights must be finite and non-negative with a positive sum.
    pub fn new(entries: impl IntoIterator<Item = (L, f64)>) -> Result<Self, SimError> {
        let mut labels = Vec::new();
        let mut weights = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0.0;
        for (label, weight) in entries {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SimError::Configuration(format!(
                    "weight {weight} is not a finite non-negative number"
                )));
            }
            total += weight;
            labels.push(label);
            weights.push(weight);
            cumulative.push(total);
        }
        if labels.is_empty() || total <= 0.0 {
            return Err(SimError::Configuration(
                "weights must sum to a positive value".to_string(),
            ));
        }
        Ok(Self {
            labels,
            weights,
            cumulative,
            total,
        })
    }

    /// Sum of all weights.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Normalized probability of each label, in table order.
    pub fn probabilities(&self) -> impl Iterator<Item = (L, f64)> + '_ {
        self.labels
            .iter()
            .zip(&self.weights)
            .map(move |(label, weight)| (*label, weight / self.total))
    }
}

/// How timestamps are spread across a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum TimestampSkew {
    /// Uniform across the window.
    #[default]
    Uniform,
    /// Density grows toward the window end as `k * u^(k-1)`; `k < 1` acts as 1.
    Recent(f64),
}

impl TimestampSkew {
    fn apply(self, unit: f64) -> f64 {
        match self {
            TimestampSkew::Uniform => unit,
            TimestampSkew::Recent(k) if k > 1.0 => unit.powf(1.0 / k),
            TimestampSkew::Recent(_) => unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::Rng;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomStream::derive(42);
        let mut b = RandomStream::derive(42);
        let left: Vec<f64> = (0..32).map(|_| a.next_float()).collect();
        let right: Vec<f64> = (0..32).map(|_| b.next_float()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn streams_do_not_share_state() {
        let mut a = RandomStream::derive(7);
        let mut noise = RandomStream::derive(7);
        let mut b = RandomStream::derive(7);
        let first = a.next_float();
        for _ in 0..10 {
            noise.next_float();
        }
        assert_eq!(first, b.next_float());
    }

    #[test]
    fn indexed_streams_differ_per_index() {
        let mut a = RandomStream::derive_indexed(9, 0);
        let mut b = RandomStream::derive_indexed(9, 1);
        assert_ne!(a.next_float(), b.next_float());
        assert_eq!(
            RandomStream::derive_indexed(9, 3),
            RandomStream::derive_indexed(9, 3)
        );
    }

    #[test]
    fn next_float_stays_in_unit_interval() {
        let mut stream = RandomStream::derive(1);
        for _ in 0..10_000 {
            let value = stream.next_float();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn weighted_choice_tracks_weights() {
        let mut stream = RandomStream::derive(3);
        let table = WeightTable::new([("a", 0.8), ("b", 0.2), ("c", 0.0)]).unwrap();
        let mut counts = [0usize; 3];
        for _ in 0..20_000 {
            match stream.choose(&table) {
                "a" => counts[0] += 1,
                "b" => counts[1] += 1,
                _ => counts[2] += 1,
            }
        }
        assert_eq!(counts[2], 0, "zero-weight label must never be drawn");
        let share_a = counts[0] as f64 / 20_000.0;
        assert!((share_a - 0.8).abs() < 0.02, "share_a={share_a}");
    }

    #[test]
    fn weighted_choice_rejects_zero_sum_and_bad_weights() {
        let mut stream = RandomStream::derive(3);
        assert!(matches!(
            stream.weighted_choice(&[("a", 0.0), ("b", 0.0)]),
            Err(SimError::Configuration(_))
        ));
        assert!(matches!(
            stream.weighted_choice::<&str>(&[]),
            Err(SimError::Configuration(_))
        ));
        assert!(matches!(
            WeightTable::new([("a", -1.0), ("b", 2.0)]),
            Err(SimError::Configuration(_))
        ));
        assert!(matches!(
            WeightTable::new([("a", f64::NAN)]),
            Err(SimError::Configuration(_))
        ));
        assert_eq!(stream.weighted_choice(&[("only", 1.0)]).unwrap(), "only");
    }

    #[test]
    fn probabilities_are_normalized() {
        let table = WeightTable::new([(1, 2.0), (2, 6.0)]).unwrap();
        let probs: Vec<_> = table.probabilities().collect();
        assert_eq!(probs, vec![(1, 0.25), (2, 0.75)]);
        assert_eq!(table.total(), 8.0);
    }

    #[test]
    fn timestamps_stay_inside_window() {
        let start = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let mut stream = RandomStream::derive(11);
        for _ in 0..5_000 {
            let ts = stream.next_timestamp(start, end, TimestampSkew::Uniform);
            assert!(ts >= start && ts < end);
        }
        assert_eq!(
            stream.next_timestamp(end, start, TimestampSkew::Uniform),
            end
        );
    }

    #[test]
    fn recent_skew_moves_mass_toward_window_end() {
        let start = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let midpoint = start + (end - start) / 2;
        let mut uniform = RandomStream::derive(5);
        let mut recent = RandomStream::derive(5);
        let late_uniform = (0..4_000)
            .filter(|_| uniform.next_timestamp(start, end, TimestampSkew::Uniform) >= midpoint)
            .count();
        let late_recent = (0..4_000)
            .filter(|_| recent.next_timestamp(start, end, TimestampSkew::Recent(3.0)) >= midpoint)
            .count();
        assert!(late_recent > late_uniform);
    }

    #[test]
    fn stream_plugs_into_rand_helpers() {
        let mut stream = RandomStream::derive(21);
        let value: u32 = stream.random_range(10..20);
        assert!((10..20).contains(&value));
    }
}
