use crate::job::run_job;
use crate::scheduler::{Scheduler, Tally};
use crate::sink::OutputSink;
use command_builder::Expansion;
use std::sync::Arc;
use tech_list::{normalize_tags, TechPolicy};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, info};
use vulntechx_core::{Error, SlotPool, TechRecord};

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| String::new())
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Tool name used in `--process` announcements.
    pub tool: String,
    /// Print each command before it starts.
    pub process: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records decoded from the input.
    pub records: usize,
    /// Records that produced no job.
    pub skipped: usize,
    pub jobs: Tally,
    pub started_at: String,
    pub ended_at: String,
}

/// Drive records through filtering, expansion and the bounded scheduler.
///
/// Returns once every submitted job has completed. A decode error returns
/// immediately and abandons jobs that are still running.
pub async fn run_pipeline<I>(
    records: I,
    policy: &TechPolicy,
    expansion: Arc<dyn Expansion>,
    sink: OutputSink,
    slots: SlotPool,
    opts: &RunOptions,
) -> Result<RunSummary, Error>
where
    I: IntoIterator<Item = Result<TechRecord, serde_json::Error>>,
{
    let mut summary = RunSummary { started_at: now_rfc3339(), ..RunSummary::default() };
    let mut scheduler = Scheduler::new(slots);
    debug!(parallel = scheduler.capacity(), "dispatching jobs");

    for record in records {
        let record = record?;
        summary.records += 1;

        let Some(raw) = record.tech.as_deref() else {
            debug!(host = %record.host, "skipping host with tech field as null");
            summary.skipped += 1;
            continue;
        };
        let tags = select_tags(policy, &record.host, raw);
        if tags.is_empty() {
            debug!(host = %record.host, "SKIPPED: no matching technologies found");
            summary.skipped += 1;
            continue;
        }

        for spec in expansion.expand(&record.host, &tags) {
            let expansion = expansion.clone();
            let sink = sink.clone();
            let announce = opts.process.then(|| expansion.announce(&opts.tool, &spec));
            scheduler
                .submit(async move {
                    if let Some(line) = announce {
                        sink.emit(&line, false).await;
                    }
                    run_job(&spec, expansion.as_ref(), &sink).await
                })
                .await;
        }
    }

    summary.jobs = scheduler.finish().await;
    summary.ended_at = now_rfc3339();
    info!(
        records = summary.records,
        skipped = summary.skipped,
        jobs = summary.jobs.completed,
        succeeded = summary.jobs.succeeded,
        failed = summary.jobs.failed,
        started_at = %summary.started_at,
        ended_at = %summary.ended_at,
        "run finished"
    );
    Ok(summary)
}

fn select_tags(policy: &TechPolicy, host: &str, raw: &[String]) -> Vec<String> {
    normalize_tags(raw)
        .into_iter()
        .filter(|tag| {
            let keep = policy.allows(tag);
            if !keep {
                debug!(host, tech = %tag, "skipping filtered tech");
            }
            keep
        })
        .collect()
}
