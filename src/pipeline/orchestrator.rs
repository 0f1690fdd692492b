use anyhow::Result;
use crossbeam_channel::{bounded, unbounded};
use log::debug;
use std::sync::Arc;

use crate::engine::progress::finish_progress_bar;
use crate::{CandidateFile, Concurrency};

use super::context::WorkerContext;
use super::workers::{FileOutcome, Job, WorkerReport, spawn_format_workers};

/// Counts of the Execute phase, one per [`FileOutcome`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExecuteResult {
    pub reformatted: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl ExecuteResult {
    pub fn tally(reports: &[WorkerReport]) -> Self {
        let mut result = Self::default();
        for report in reports {
            match report.outcome {
                FileOutcome::Reformatted => result.reformatted += 1,
                FileOutcome::Failed => result.failed += 1,
                FileOutcome::Cancelled => result.cancelled += 1,
            }
        }
        result
    }
}

/// Worker count for `jobs` files: the resolved limit, never more than the jobs, never below 1.
pub fn worker_count(concurrency: Concurrency, jobs: usize) -> usize {
    concurrency.resolve().min(jobs).max(1)
}

/// Format `files` on a pool of workers. All jobs are queued up front; workers pull from the
/// queue until it is empty. Reports are collected after every worker has been joined and
/// flushed to the log in candidate order, so output for one file is never split up.
pub fn execute_jobs(
    files: &[CandidateFile],
    ctx: WorkerContext,
    concurrency: Concurrency,
) -> Result<ExecuteResult> {
    if files.is_empty() {
        return Ok(ExecuteResult::default());
    }
    let num_workers = worker_count(concurrency, files.len());
    debug!(
        "Formatting {} files with {} workers",
        files.len(),
        num_workers
    );

    let (job_tx, job_rx) = bounded::<Job>(files.len());
    for (index, f) in files.iter().enumerate() {
        job_tx
            .send(Job {
                index,
                file: f.path.clone(),
            })
            .map_err(|_| anyhow::anyhow!("job queue closed before dispatch"))?;
    }
    // Dropping the last job sender lets workers see the queue close and exit.
    drop(job_tx);

    let (report_tx, report_rx) = unbounded::<WorkerReport>();
    let ctx = Arc::new(ctx);
    let worker_handles = spawn_format_workers(&job_rx, &report_tx, &ctx, num_workers);
    drop(report_tx);
    drop(job_rx);

    shutdown_worker_handles(worker_handles)?;

    let mut reports: Vec<WorkerReport> = report_rx.try_iter().collect();
    reports.sort_by_key(|r| r.index);
    if let Some(pb) = &ctx.progress {
        finish_progress_bar(pb);
    }
    flush_reports(&reports);

    Ok(ExecuteResult::tally(&reports))
}

/// Join every worker; a panicked worker fails the run.
pub fn shutdown_worker_handles(worker_handles: Vec<std::thread::JoinHandle<()>>) -> Result<()> {
    let mut panicked = 0_usize;
    for h in worker_handles {
        if h.join().is_err() {
            panicked += 1;
        }
    }
    if panicked > 0 {
        anyhow::bail!("{} format worker(s) panicked", panicked);
    }
    Ok(())
}

/// Log each report's buffered lines at the level they were recorded with.
pub fn flush_reports(reports: &[WorkerReport]) {
    for report in reports {
        for (level, msg) in &report.messages {
            log::log!(*level, "{}", msg);
        }
    }
}
