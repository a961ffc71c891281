use crate::job::JobOutcome;
use std::future::Future;
use tokio::task::{JoinError, JoinSet};
use tracing::warn;
use vulntechx_core::SlotPool;

/// Completion counts for every job that went through a [`Scheduler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub submitted: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub spawn_failures: usize,
}

impl Tally {
    fn record(&mut self, joined: Result<JobOutcome, JoinError>) {
        self.completed += 1;
        match joined {
            Ok(outcome) if outcome.is_success() => self.succeeded += 1,
            Ok(JobOutcome::SpawnFailed) => {
                self.spawn_failures += 1;
                self.failed += 1;
            }
            Ok(_) => self.failed += 1,
            Err(e) => {
                warn!(error = %e, "job task did not finish cleanly");
                self.failed += 1;
            }
        }
    }
}

/// Runs jobs as tokio tasks, never more at once than the slot pool allows.
///
/// `submit` waits for a free slot before spawning, which stalls the caller
/// while the pool is saturated. `finish` joins every task. Dropping the
/// scheduler without calling `finish` aborts whatever is still running.
pub struct Scheduler {
    slots: SlotPool,
    tasks: JoinSet<JobOutcome>,
    tally: Tally,
}

impl Scheduler {
    pub fn new(slots: SlotPool) -> Self {
        Scheduler { slots, tasks: JoinSet::new(), tally: Tally::default() }
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub async fn submit<F>(&mut self, job: F)
    where
        F: Future<Output = JobOutcome> + Send + 'static,
    {
        let slot = self.slots.acquire().await;
        self.reap();
        self.tally.submitted += 1;
        self.tasks.spawn(async move {
            let outcome = job.await;
            drop(slot);
            outcome
        });
    }

    /// Collect tasks that already finished so the set stays bounded.
    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            self.tally.record(joined);
        }
    }

    /// Wait for every submitted job and return the final counts.
    pub async fn finish(mut self) -> Tally {
        while let Some(joined) = self.tasks.join_next().await {
            self.tally.record(joined);
        }
        self.tally
    }
}
