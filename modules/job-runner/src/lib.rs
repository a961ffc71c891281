//! Bounded job execution: scheduling, subprocess handling and output.

mod job;
mod pipeline;
mod scheduler;
mod sink;

pub use job::{run_job, JobOutcome};
pub use pipeline::{run_pipeline, RunOptions, RunSummary};
pub use scheduler::{Scheduler, Tally};
pub use sink::{OutputSink, SinkWriter};
