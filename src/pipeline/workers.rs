use crossbeam_channel::{Receiver, Sender};
use log::Level;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::hashing::hash_file;
use crate::engine::progress::update_progress_bar;
use crate::engine::runner::{FailureKind, InvocationResult};

use super::context::WorkerContext;

/// One file to format. `index` is its position in the sorted candidate list.
#[derive(Clone, Debug)]
pub struct Job {
    pub index: usize,
    pub file: PathBuf,
}

/// What happened to one job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Reformatted,
    Failed,
    Cancelled,
}

/// A finished job plus the log lines it produced, flushed later by the orchestrator.
#[derive(Debug)]
pub struct WorkerReport {
    pub index: usize,
    pub outcome: FileOutcome,
    pub messages: Vec<(Level, String)>,
}

/// Single formatter worker: take jobs until the queue is drained, send one report per job.
fn format_worker_loop(
    job_rx: Receiver<Job>,
    report_tx: Sender<WorkerReport>,
    ctx: Arc<WorkerContext>,
) {
    while let Ok(job) = job_rx.recv() {
        let report = if ctx.cancel_requested() {
            WorkerReport {
                index: job.index,
                outcome: FileOutcome::Cancelled,
                messages: Vec::new(),
            }
        } else {
            format_one(&ctx, job)
        };
        if let Some(pb) = &ctx.progress {
            update_progress_bar(pb, 1);
        }
        if report_tx.send(report).is_err() {
            break;
        }
    }
}

/// Spawn `num_workers` formatter workers. Caller must drop its job sender so workers exit.
pub fn spawn_format_workers(
    job_rx: &Receiver<Job>,
    report_tx: &Sender<WorkerReport>,
    ctx: &Arc<WorkerContext>,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let job_rx = job_rx.clone();
            let report_tx = report_tx.clone();
            let ctx = Arc::clone(ctx);
            thread::spawn(move || format_worker_loop(job_rx, report_tx, ctx))
        })
        .collect()
}

/// Run the formatter on one file; on success re-hash the result and write its stamp.
fn format_one(ctx: &WorkerContext, job: Job) -> WorkerReport {
    let mut messages = vec![(Level::Debug, format!("Formatting {}...", job.file.display()))];
    let result = ctx.command.run(&job.file);

    let outcome = if result.success {
        push_output(&mut messages, Level::Debug, &result);
        commit_stamp(ctx, &job, &mut messages);
        FileOutcome::Reformatted
    } else {
        let kind = result.failure.unwrap_or(FailureKind::NonZeroExit);
        messages.push((Level::Error, failure_headline(&job, &result, kind)));
        messages.push((Level::Error, format!("Command: {}", result.command_line)));
        push_output(&mut messages, Level::Error, &result);
        FileOutcome::Failed
    };

    WorkerReport {
        index: job.index,
        outcome,
        messages,
    }
}

/// Stamp the post-format digest. The formatter rewrote the file, so the pre-format hash is stale.
fn commit_stamp(ctx: &WorkerContext, job: &Job, messages: &mut Vec<(Level, String)>) {
    let digest = match hash_file(&job.file) {
        Ok(d) => d,
        Err(e) => {
            messages.push((
                Level::Warn,
                format!(
                    "Cannot hash {} after formatting, not stamping: {}",
                    job.file.display(),
                    e
                ),
            ));
            return;
        }
    };
    if let Err(e) = ctx.store.record_success(&job.file, &digest) {
        messages.push((
            Level::Warn,
            format!("Stamp not written for {}: {:#}", job.file.display(), e),
        ));
    }
}

fn failure_headline(job: &Job, result: &InvocationResult, kind: FailureKind) -> String {
    let why = match kind {
        FailureKind::SpawnFailed => "formatter failed to start".to_string(),
        FailureKind::TimedOut => "formatter timed out".to_string(),
        FailureKind::NonZeroExit => match result.exit_code {
            Some(code) => format!("formatter exited with code {}", code),
            None => "formatter was terminated by a signal".to_string(),
        },
    };
    format!("Formatting {} failed: {}", job.file.display(), why)
}

fn push_output(messages: &mut Vec<(Level, String)>, level: Level, result: &InvocationResult) {
    let stdout = result.stdout.trim_end();
    if !stdout.is_empty() {
        messages.push((level, format!("stdout:\n{}", stdout)));
    }
    let stderr = result.stderr.trim_end();
    if !stderr.is_empty() {
        messages.push((level, format!("stderr:\n{}", stderr)));
    }
}
