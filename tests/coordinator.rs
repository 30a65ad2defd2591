use std::sync::{Arc, Mutex};

use insight_sim::export::{chart_by_name, write_records_csv_path};
use insight_sim::{
    ChartKind, CoordinatorConfig, InMemoryRecordStore, InsightReport, JobCoordinator, JobStatus,
    Notifier, RecordStore, SimError, chart_series,
};

#[derive(Default)]
struct CollectingNotifier {
    messages: Mutex<Vec<(String, String)>>,
}

impl Notifier for CollectingNotifier {
    fn notify(&self, destination: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((destination.to_string(), message.to_string()));
    }
}

fn build_coordinator(batch_size: usize) -> (JobCoordinator, Arc<InMemoryRecordStore>, Arc<CollectingNotifier>) {
    let mut config = CoordinatorConfig::default();
    config.collector.batch_size = batch_size;
    let store = Arc::new(InMemoryRecordStore::new());
    let notifier = Arc::new(CollectingNotifier::default());
    let coordinator = JobCoordinator::with_parts(config, store.clone(), notifier.clone());
    (coordinator, store, notifier)
}

#[test]
fn job_lifecycle_persists_records_and_analysis() {
    let (coordinator, store, notifier) = build_coordinator(250);
    let job = coordinator
        .create_job("battery tech", Some(1_000), Some(11))
        .unwrap();
    assert_eq!(coordinator.job(job.id).unwrap().status, JobStatus::Pending);

    let finished = coordinator.run(job.id).unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(store.count_for(job.id).unwrap(), 1_000);

    let analysis = coordinator.analysis(job.id).unwrap().unwrap();
    assert_eq!(analysis.summary.total_records, 1_000);
    let stored = store.records_for(job.id).unwrap();
    assert!(stored.iter().all(|record| record.job_id == job.id));
    assert_eq!(
        insight_sim::sentiment_mix(&stored),
        analysis.sentiment,
        "cached analysis must match a recomputation from stored records"
    );

    let messages = notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "user");
    assert!(messages[0].1.contains("1000 records analyzed"));
}

#[test]
fn same_spec_yields_same_records_across_jobs() {
    let (coordinator, store, _) = build_coordinator(100);
    let a = coordinator.create_job("wind farms", Some(300), Some(5)).unwrap();
    let b = coordinator.create_job("wind farms", Some(300), Some(5)).unwrap();
    coordinator.run(a.id).unwrap();
    coordinator.run(b.id).unwrap();

    let strip = |job_id| {
        store
            .records_for(job_id)
            .unwrap()
            .into_iter()
            .map(|mut record| {
                record.job_id = 0;
                record
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(strip(a.id), strip(b.id));
}

#[test]
fn concurrent_jobs_do_not_interfere() {
    let (coordinator, store, _) = build_coordinator(64);
    let ids: Vec<u64> = (0..4)
        .map(|i| {
            coordinator
                .create_job(&format!("topic {i}"), Some(200 + i * 10), Some(i))
                .unwrap()
                .id
        })
        .collect();
    let handles: Vec<_> = ids
        .iter()
        .map(|id| coordinator.spawn(*id).unwrap())
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap().status, JobStatus::Completed);
    }
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(store.count_for(*id).unwrap(), 200 + i * 10);
    }
}

#[test]
fn cancelled_job_reports_cancelled() {
    let (coordinator, store, notifier) = build_coordinator(50);
    let job = coordinator.create_job("risk", Some(500), None).unwrap();
    coordinator.cancellation_token(job.id).unwrap().cancel();
    assert!(matches!(coordinator.run(job.id), Err(SimError::Cancelled(_))));

    let failed = coordinator.job(job.id).unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.message.as_deref(), Some("cancelled"));
    assert_eq!(store.count_for(job.id).unwrap(), 0);
    assert!(notifier.messages.lock().unwrap()[0].1.contains("cancelled"));
}

#[test]
fn finished_jobs_export_csv_charts_and_report() {
    let (coordinator, _, _) = build_coordinator(500);
    let job = coordinator.create_job("heat pumps", Some(800), Some(2)).unwrap();
    coordinator.run(job.id).unwrap();
    let analysis = coordinator.analysis(job.id).unwrap().unwrap();
    let records = coordinator.records(job.id).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join(format!("job-{}-data.csv", job.id));
    assert_eq!(write_records_csv_path(&csv_path, &records).unwrap(), 800);
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.records().count(), 800);

    let timeline = chart_series(&analysis, ChartKind::Timeline);
    let total: f64 = timeline.points.iter().map(|p| p.value).sum();
    assert_eq!(total, 800.0);
    assert!(matches!(
        chart_by_name(&analysis, "wordcloud"),
        Err(SimError::UnknownChart(_))
    ));

    let report = InsightReport::new(job.spec.phrase.clone(), &analysis);
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["title"], "Insight Report");
    assert_eq!(json["summary"]["total_records"], 800);
    assert_eq!(json["charts"].as_array().unwrap().len(), 4);
}

#[test]
fn deleted_jobs_disappear_from_store_and_table() {
    let (coordinator, store, _) = build_coordinator(100);
    let job = coordinator.create_job("ai", Some(150), None).unwrap();
    coordinator.run(job.id).unwrap();
    coordinator.delete_job(job.id).unwrap();
    assert_eq!(store.count_for(job.id).unwrap(), 0);
    assert!(matches!(coordinator.analysis(job.id), Err(SimError::UnknownJob(_))));
    assert!(coordinator.jobs().unwrap().is_empty());
}
