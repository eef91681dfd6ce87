use crate::utils::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Task timed out after {0}s")]
    Timeout(u64),

    #[error("Task processing failed: {0}")]
    ProcessingError(String),

    #[error("Worker pool is closed: {0}")]
    CapacityError(String),
}

pub type WorkerResult<T> = Result<T, WorkerError>;

impl From<tokio::sync::AcquireError> for WorkerError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        WorkerError::CapacityError(format!("Failed to acquire worker: {}", err))
    }
}

impl From<tokio::task::JoinError> for WorkerError {
    fn from(err: tokio::task::JoinError) -> Self {
        WorkerError::ProcessingError(format!("Worker task failed: {}", err))
    }
}

impl From<WorkerError> for PipelineError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Timeout(secs) => PipelineError::timeout(format!("gave up after {secs}s")),
            other => PipelineError::worker(other.to_string()),
        }
    }
}
