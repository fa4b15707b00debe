//! Worker tasks that run alongside the tick loop.

mod optimizer;

pub use optimizer::{JobStatus, OptimizationJob, OptimizerWorker, PendingOptimization};
