use std::io;

use thiserror::Error;

use crate::types::{ChartName, JobId};

/// Error type for generation, analysis, coordination, and export failures.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid job spec: {0}")]
    InvalidSpec(String),
    #[error("bucket width must be a positive number of milliseconds, got {0}ms")]
    InvalidBucketWidth(i64),
    #[error("timeline would need {requested} buckets, limit is {limit}")]
    TooManyBuckets { requested: u64, limit: u64 },
    #[error("record store failure for job {job_id}: {reason}")]
    Store { job_id: JobId, reason: String },
    #[error("job {0} not found")]
    UnknownJob(JobId),
    #[error("job {0} was cancelled")]
    Cancelled(JobId),
    #[error("unknown chart '{0}'")]
    UnknownChart(ChartName),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
