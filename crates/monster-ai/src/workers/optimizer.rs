//! Background stat optimization.
//!
//! Annealing runs take far longer than a tick, so the worker moves them onto
//! tokio's blocking pool when a runtime is available. The report comes back
//! through a oneshot channel and the brain swaps it in at a tick boundary.
//! Without a runtime, or with background execution disabled, the run happens
//! inline and the job is ready immediately.
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};

use crate::optimization::{Annealer, EncounterObjective, Loadout, OptimizationReport};

/// Input of one optimization run.
#[derive(Clone, Debug)]
pub struct OptimizationJob {
    pub current: Loadout,
    pub objective: EncounterObjective,
    pub seed: u64,
}

/// Poll result of a [`PendingOptimization`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JobStatus {
    Ready(OptimizationReport),
    Running,
    /// The worker dropped its sender without reporting (e.g. it panicked).
    Lost,
}

/// Handle to an optimization that may still be running.
#[derive(Debug)]
pub struct PendingOptimization {
    receiver: oneshot::Receiver<OptimizationReport>,
    submitted_at: Instant,
}

impl PendingOptimization {
    /// Non-blocking check for the finished report.
    pub fn poll(&mut self) -> JobStatus {
        match self.receiver.try_recv() {
            Ok(report) => {
                debug!(
                    "optimization finished after {:?} ({} iterations)",
                    self.submitted_at.elapsed(),
                    report.iterations
                );
                JobStatus::Ready(report)
            }
            Err(TryRecvError::Empty) => JobStatus::Running,
            Err(TryRecvError::Closed) => {
                warn!("optimization worker exited without a report");
                JobStatus::Lost
            }
        }
    }

    /// Waits for the report; `None` if the worker was lost.
    pub async fn wait(self) -> Option<OptimizationReport> {
        self.receiver.await.ok()
    }
}

/// Dispatches annealing runs inline or onto the blocking pool.
#[derive(Clone, Debug)]
pub struct OptimizerWorker {
    annealer: Annealer,
    background: bool,
}

impl OptimizerWorker {
    pub fn new(annealer: Annealer, background: bool) -> Self {
        Self {
            annealer,
            background,
        }
    }

    /// Starts `job` and returns a handle to its eventual report.
    pub fn submit(&self, job: OptimizationJob) -> PendingOptimization {
        let (sender, receiver) = oneshot::channel();
        let annealer = self.annealer.clone();
        let task = move || {
            let report = annealer.run(job.current, &job.objective, job.seed);
            // The brain may have been dropped meanwhile; nothing to deliver to.
            let _ = sender.send(report);
        };

        match Handle::try_current() {
            Ok(handle) if self.background => {
                debug!("optimization dispatched to the blocking pool");
                handle.spawn_blocking(task);
            }
            _ => task(),
        }

        PendingOptimization {
            receiver,
            submitted_at: Instant::now(),
        }
    }
}
