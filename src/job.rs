//! Job lifecycle: validation, batched generation into a record store, analysis,
//! and completion notices.
//!
//! A job moves `pending -> processing -> completed | failed` exactly once.
//! Generation streams through [`crate::collector::Corpus::batches`], so only one
//! batch is held while the accumulator folds it in; the cancellation token is
//! checked before every batch.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;

use tracing::{info, warn};

use crate::analyzer::{Analysis, Analyzer};
use crate::collector::Collector;
use crate::config::CoordinatorConfig;
use crate::constants::job::{CANCELLED_MESSAGE, DEFAULT_DESTINATION};
use crate::data::{JobId, JobSpec, Record};
use crate::errors::SimError;
use crate::store::{InMemoryRecordStore, RecordStore};
use crate::types::JobMessage;

/// Lifecycle state of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Stable lower-case label.
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// True for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of one research job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub spec: JobSpec,
    pub status: JobStatus,
    /// Failure reason, set only on failed jobs.
    pub message: Option<JobMessage>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Cooperative stop flag shared between a job and its callers.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next batch boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Delivery channel for job completion notices.
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `destination`.
    fn notify(&self, destination: &str, message: &str);
}

/// Notifier that only emits a log event.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, destination: &str, message: &str) {
        info!(destination, message, "[insight_sim:notify] notice sent");
    }
}

struct JobEntry {
    job: Job,
    token: CancellationToken,
    analysis: Option<Arc<Analysis>>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    jobs: RwLock<IndexMap<JobId, JobEntry>>,
    next_id: AtomicU64,
}

/// Owns jobs and drives them through generation and analysis.
///
/// Cloning is cheap; clones share the same jobs, store, and notifier.
#[derive(Clone)]
pub struct JobCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl fmt::Debug for JobCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobCoordinator")
            .field("config", &self.inner.config)
            .field("next_id", &self.inner.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for JobCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl JobCoordinator {
    /// Coordinator backed by an in-memory store and the log notifier.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_parts(config, Arc::new(InMemoryRecordStore::new()), Arc::new(LogNotifier))
    }

    /// Coordinator backed by explicit collaborators.
    pub fn with_parts(
        config: CoordinatorConfig,
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                store,
                notifier,
                jobs: RwLock::new(IndexMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Active settings.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Record store the coordinator writes to.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.inner.store
    }

    /// Register a pending job. Fails with `InvalidSpec` before anything is stored.
    pub fn create_job(
        &self,
        phrase: &str,
        volume: Option<u64>,
        seed: Option<u64>,
    ) -> Result<Job, SimError> {
        let spec = JobSpec::from_parts(phrase, volume, seed);
        spec.validate()?;
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            id,
            spec,
            status: JobStatus::Pending,
            message: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.write_jobs(id)?.insert(
            id,
            JobEntry {
                job: job.clone(),
                token: CancellationToken::new(),
                analysis: None,
            },
        );
        info!(
            job_id = id,
            phrase = %job.spec.phrase,
            volume = job.spec.volume,
            seed = job.spec.seed,
            "[insight_sim:job] job created"
        );
        Ok(job)
    }

    /// Current snapshot of `job_id`.
    pub fn job(&self, job_id: JobId) -> Result<Job, SimError> {
        self.read_entry(job_id, |entry| entry.job.clone())
    }

    /// Snapshots of every job, in creation order.
    pub fn jobs(&self) -> Result<Vec<Job>, SimError> {
        Ok(self
            .read_jobs(0)?
            .values()
            .map(|entry| entry.job.clone())
            .collect())
    }

    /// Token that stops `job_id` at its next batch boundary.
    pub fn cancellation_token(&self, job_id: JobId) -> Result<CancellationToken, SimError> {
        self.read_entry(job_id, |entry| entry.token.clone())
    }

    /// Request that `job_id` stops at its next batch boundary.
    pub fn cancel(&self, job_id: JobId) -> Result<(), SimError> {
        self.cancellation_token(job_id)?.cancel();
        Ok(())
    }

    /// Cached analysis; `None` until the job completes.
    pub fn analysis(&self, job_id: JobId) -> Result<Option<Arc<Analysis>>, SimError> {
        self.read_entry(job_id, |entry| entry.analysis.clone())
    }

    /// Records persisted for `job_id` so far.
    pub fn records(&self, job_id: JobId) -> Result<Vec<Record>, SimError> {
        self.job(job_id)?;
        self.inner.store.records_for(job_id)
    }

    /// Forget `job_id`, stop it if running, and drop its stored records.
    ///
    /// A running job may still be writing a batch; its worker purges the
    /// store again once it sees the job is gone.
    pub fn delete_job(&self, job_id: JobId) -> Result<(), SimError> {
        let entry = self
            .write_jobs(job_id)?
            .shift_remove(&job_id)
            .ok_or(SimError::UnknownJob(job_id))?;
        entry.token.cancel();
        let removed = self.inner.store.delete_job(job_id)?;
        info!(job_id, removed, "[insight_sim:job] job deleted");
        Ok(())
    }

    /// Run `job_id` to completion on the calling thread.
    ///
    /// Returns the completed snapshot. On failure the job is marked `failed`
    /// with the reason (`"cancelled"` for a cancelled job) and the error is
    /// returned.
    pub fn run(&self, job_id: JobId) -> Result<Job, SimError> {
        let (spec, token) = self.start(job_id)?;
        match self.execute(job_id, &spec, &token) {
            Ok(analysis) => {
                let records = analysis.summary.total_records;
                let job = self
                    .update_entry(job_id, |entry| {
                        entry.job.status = JobStatus::Completed;
                        entry.job.completed_at = Some(Utc::now());
                        entry.analysis = Some(Arc::new(analysis));
                    })
                    .inspect_err(|_| self.purge_deleted(job_id))?;
                info!(job_id, records, "[insight_sim:job] job completed");
                self.inner.notifier.notify(
                    DEFAULT_DESTINATION,
                    &format!("Job {job_id} completed: {records} records analyzed"),
                );
                Ok(job)
            }
            Err(err) => {
                let message = match &err {
                    SimError::Cancelled(_) => CANCELLED_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                warn!(job_id, reason = %message, "[insight_sim:job] job failed");
                // The entry is gone when the job was deleted mid-run.
                match self.update_entry(job_id, |entry| {
                    entry.job.status = JobStatus::Failed;
                    entry.job.message = Some(message.clone());
                    entry.job.completed_at = Some(Utc::now());
                }) {
                    Ok(_) => self.inner.notifier.notify(
                        DEFAULT_DESTINATION,
                        &format!("Job {job_id} failed: {message}"),
                    ),
                    Err(_) => self.purge_deleted(job_id),
                }
                Err(err)
            }
        }
    }

    /// Run `job_id` on a worker thread.
    pub fn spawn(&self, job_id: JobId) -> Result<thread::JoinHandle<Result<Job, SimError>>, SimError> {
        self.job(job_id)?;
        let coordinator = self.clone();
        Ok(thread::spawn(move || coordinator.run(job_id)))
    }

    // Drops batches a deleted job appended after its store entry was removed.
    fn purge_deleted(&self, job_id: JobId) {
        match self.inner.store.delete_job(job_id) {
            Ok(removed) if removed > 0 => {
                info!(job_id, removed, "[insight_sim:job] late batches purged");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(job_id, error = %err, "[insight_sim:job] purge failed");
            }
        }
    }

    fn start(&self, job_id: JobId) -> Result<(JobSpec, CancellationToken), SimError> {
        let mut jobs = self.write_jobs(job_id)?;
        let entry = jobs.get_mut(&job_id).ok_or(SimError::UnknownJob(job_id))?;
        if entry.job.status != JobStatus::Pending {
            return Err(SimError::Configuration(format!(
                "job {job_id} is already {}",
                entry.job.status
            )));
        }
        entry.job.status = JobStatus::Processing;
        info!(job_id, "[insight_sim:job] job processing");
        Ok((entry.job.spec.clone(), entry.token.clone()))
    }

    fn execute(
        &self,
        job_id: JobId,
        spec: &JobSpec,
        token: &CancellationToken,
    ) -> Result<Analysis, SimError> {
        let config = &self.inner.config;
        let corpus = Collector::new(config.collector.clone())
            .generate(spec)?
            .with_job_id(job_id);
        let mut analyzer = Analyzer::new(config.analyzer.clone());
        if analyzer.config().window.is_none() {
            analyzer = analyzer.with_window(corpus.window());
        }
        let mut acc = analyzer.accumulator()?;
        let mut batches = corpus.batches(config.collector.batch_size);
        loop {
            if token.is_cancelled() {
                return Err(SimError::Cancelled(job_id));
            }
            let Some(batch) = batches.next() else {
                break;
            };
            self.inner.store.append(job_id, &batch)?;
            acc.ingest(&batch);
        }
        analyzer.finish(acc)
    }

    fn read_jobs(
        &self,
        job_id: JobId,
    ) -> Result<RwLockReadGuard<'_, IndexMap<JobId, JobEntry>>, SimError> {
        self.inner.jobs.read().map_err(|_| SimError::Store {
            job_id,
            reason: "job table lock poisoned".into(),
        })
    }

    fn write_jobs(
        &self,
        job_id: JobId,
    ) -> Result<RwLockWriteGuard<'_, IndexMap<JobId, JobEntry>>, SimError> {
        self.inner.jobs.write().map_err(|_| SimError::Store {
            job_id,
            reason: "job table lock poisoned".into(),
        })
    }

    fn read_entry<T>(&self, job_id: JobId, read: impl FnOnce(&JobEntry) -> T) -> Result<T, SimError> {
        let jobs = self.read_jobs(job_id)?;
        jobs.get(&job_id)
            .map(read)
            .ok_or(SimError::UnknownJob(job_id))
    }

    fn update_entry(
        &self,
        job_id: JobId,
        update: impl FnOnce(&mut JobEntry),
    ) -> Result<Job, SimError> {
        let mut jobs = self.write_jobs(job_id)?;
        let entry = jobs.get_mut(&job_id).ok_or(SimError::UnknownJob(job_id))?;
        update(entry);
        Ok(entry.job.clone())
    }
}
