use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use insight_sim::analyzer::AnalysisAccumulator;
use insight_sim::constants::analyzer::SHARE_TOLERANCE;
use insight_sim::{
    Analyzer, Category, JobSpec, Record, Region, Sentiment, Source, generate, sentiment_mix,
    timeline_histogram,
};

fn arb_record() -> impl Strategy<Value = Record> {
    (
        0..Source::ALL.len(),
        0..Region::ALL.len(),
        0..Sentiment::ALL.len(),
        -1_000_000i32..=1_000_000,
        0i64..(60 * 86_400_000),
        1u64..4,
    )
        .prop_map(|(source, region, sentiment, score, offset_ms, job_id)| {
            let base = Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap();
            Record {
                id: offset_ms as u64,
                job_id,
                source: Source::ALL[source],
                region: Region::ALL[region],
                sentiment: Sentiment::ALL[sentiment],
                sentiment_score: f64::from(score) / 1_000_000.0,
                timestamp: base + Duration::milliseconds(offset_ms),
                text_snippet: String::new(),
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_analysis_is_order_independent(
        records in proptest::collection::vec(arb_record(), 0..200),
        rotate in 0usize..200,
    ) {
        let stamp = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut shuffled = records.clone();
        shuffled.reverse();
        if !shuffled.is_empty() {
            let by = rotate % shuffled.len();
            shuffled.rotate_left(by);
        }
        let analyzer = Analyzer::default();
        let forward = analyzer.analyze_at(&records, stamp).unwrap();
        let backward = analyzer.analyze_at(&shuffled, stamp).unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_histogram_sums_to_record_count(
        records in proptest::collection::vec(arb_record(), 0..300),
        width_minutes in 1i64..(3 * 24 * 60),
    ) {
        let histogram = timeline_histogram(&records, Duration::minutes(width_minutes)).unwrap();
        prop_assert_eq!(histogram.total(), records.len());
        for pair in histogram.buckets.windows(2) {
            prop_assert_eq!(pair[1].start - pair[0].start, Duration::minutes(width_minutes));
        }
    }

    #[test]
    fn prop_shares_sum_to_one_or_zero(records in proptest::collection::vec(arb_record(), 0..300)) {
        let mix = sentiment_mix(&records);
        let sum: f64 = mix.entries().iter().map(|e| e.share).sum();
        if records.is_empty() {
            prop_assert_eq!(sum, 0.0);
            prop_assert!(mix.dominant().is_none());
        } else {
            prop_assert!((sum - 1.0).abs() < SHARE_TOLERANCE);
            prop_assert!(mix.dominant().is_some());
        }
    }

    #[test]
    fn prop_split_accumulators_merge_to_the_whole(
        records in proptest::collection::vec(arb_record(), 0..200),
        split in 0usize..200,
    ) {
        let stamp = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let cut = split.min(records.len());
        let mut head = AnalysisAccumulator::new(Duration::hours(6)).unwrap();
        let mut tail = AnalysisAccumulator::new(Duration::hours(6)).unwrap();
        head.ingest(&records[..cut]);
        tail.ingest(&records[cut..]);
        head.merge(tail).unwrap();

        let mut whole = AnalysisAccumulator::new(Duration::hours(6)).unwrap();
        whole.ingest(&records);
        let analyzer = Analyzer::default();
        prop_assert_eq!(
            analyzer.finish_at(head, stamp).unwrap(),
            analyzer.finish_at(whole, stamp).unwrap()
        );
    }

    #[test]
    fn prop_corpus_is_reproducible_and_exact(
        phrase in "[a-z]{1,12}( [a-z]{1,12}){0,2}",
        volume in 1u64..300,
        seed in any::<u64>(),
    ) {
        let spec = JobSpec::with_seed(&phrase, volume, seed);
        let corpus = generate(&spec).unwrap();
        let first: Vec<Record> = corpus.iter().collect();
        let second: Vec<Record> = generate(&spec).unwrap().iter().collect();
        prop_assert_eq!(first.len() as u64, volume);
        prop_assert_eq!(&first, &second);
        let window = corpus.window();
        prop_assert!(first.iter().all(|r| window.contains(r.timestamp)));
    }
}
