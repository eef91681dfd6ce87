mod pool;
mod error;

pub use pool::{PoolRun, WorkerPool};
pub use error::{WorkerError, WorkerResult};
