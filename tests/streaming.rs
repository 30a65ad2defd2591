use chrono::{Duration, TimeZone, Utc};

use insight_sim::{
    Analyzer, Collector, CollectorConfig, JobSpec, Record, TimestampSkew, generate,
};

#[test]
fn resuming_from_a_checkpoint_matches_an_uninterrupted_run() {
    let spec = JobSpec::with_seed("grid storage", 3_000, 17);
    let corpus = generate(&spec).unwrap();
    let full: Vec<Record> = corpus.iter().collect();

    let mut batches = corpus.batches(400);
    let mut resumed: Vec<Record> = Vec::new();
    resumed.extend(batches.next().unwrap());
    resumed.extend(batches.next().unwrap());
    let checkpoint = batches.position();
    assert_eq!(checkpoint, 800);
    drop(batches);

    let restarted = generate(&spec).unwrap();
    for batch in restarted.batches_from(checkpoint, 400) {
        assert!(batch.len() <= 400);
        resumed.extend(batch);
    }
    assert_eq!(resumed, full);
}

#[test]
fn batched_analysis_matches_materialized_analysis() {
    let corpus = generate(&JobSpec::with_seed("ev charging", 4_321, 3)).unwrap();
    let stamp = Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap();
    let analyzer = Analyzer::default().with_window(corpus.window());

    let mut acc = analyzer.accumulator().unwrap();
    for batch in corpus.batches(1_000) {
        acc.ingest(&batch);
    }
    let streamed = analyzer.finish_at(acc, stamp).unwrap();

    let records: Vec<Record> = corpus.iter().collect();
    let materialized = analyzer.analyze_at(&records, stamp).unwrap();
    assert_eq!(streamed, materialized);
}

#[test]
fn recent_skew_keeps_timestamps_in_window_and_leans_late() {
    let spec = JobSpec::with_seed("ev charging", 6_000, 3);
    let uniform = generate(&spec).unwrap();
    let skewed = Collector::new(CollectorConfig {
        timestamp_skew: TimestampSkew::Recent(3.0),
        ..CollectorConfig::default()
    })
    .generate(&spec)
    .unwrap();

    let window = skewed.window();
    assert_eq!(window, uniform.window());
    let last_week = window.end - Duration::days(7);
    let late = |records: &[Record]| records.iter().filter(|r| r.timestamp >= last_week).count();

    let uniform_records: Vec<Record> = uniform.iter().collect();
    let skewed_records: Vec<Record> = skewed.iter().collect();
    assert!(skewed_records.iter().all(|r| window.contains(r.timestamp)));
    assert!(late(&skewed_records) > late(&uniform_records));
}

#[test]
fn window_grows_with_volume() {
    let small = generate(&JobSpec::with_seed("x", 100, 1)).unwrap().window();
    let medium = generate(&JobSpec::with_seed("x", 4_000, 1)).unwrap().window();
    let large = generate(&JobSpec::with_seed("x", 500_000, 1)).unwrap().window();
    assert_eq!(small.duration(), Duration::days(7));
    assert_eq!(medium.duration(), Duration::days(20));
    assert_eq!(large.duration(), Duration::days(30));
    assert_eq!(small.end, large.end);
}
