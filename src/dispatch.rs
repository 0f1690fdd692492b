//! Incremental format run: resolve, collect, filter, decide, execute, summarize.

use anyhow::Result;
use log::{debug, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::check::report_plan;
use crate::engine::ignore_filter::IgnoreFilter;
use crate::engine::progress::formatting_bar;
use crate::engine::runner::FormatterCommand;
use crate::engine::stamps::{Decision, StampStore};
use crate::engine::tools::{check_and_canonicalize_root, normalize_extensions, resolve_executable};
use crate::error::ConfigError;
use crate::pipeline::{
    CollectContext, WorkerContext, collect_files, execute_jobs, report_skipped_paths,
};
use crate::utils::config::PackagePaths;
use crate::{CandidateFile, FormatOpts, RunSummary};

/// Everything decided before any formatter runs.
#[derive(Debug)]
pub struct RunPlan {
    pub root: PathBuf,
    pub executable: PathBuf,
    pub store: StampStore,
    /// Files with a matching extension, before ignore rules.
    pub scanned: usize,
    pub ignored: Vec<CandidateFile>,
    pub unchanged: Vec<CandidateFile>,
    pub to_format: Vec<CandidateFile>,
    pub skipped_dirs: usize,
}

/// Resolve configuration, scan, filter and compare fingerprints. Touches no file and writes no stamp.
/// Configuration problems come back as [`ConfigError`] inside the error.
pub fn plan_run(root: &Path, opts: &FormatOpts) -> Result<RunPlan> {
    // Resolve
    let root = check_and_canonicalize_root(root)?;
    let extensions = normalize_extensions(&opts.extensions);
    if extensions.is_empty() {
        return Err(ConfigError::NoExtensions.into());
    }
    let executable = resolve_executable(&opts.formatter)?;
    emit_banner(opts, &executable);
    let stamp_dir = resolve_stamp_dir(&root, opts.stamp_dir.as_deref());
    debug!("Stamp directory: {}", stamp_dir.display());
    let store = StampStore::new(&root, &stamp_dir);
    let filter = IgnoreFilter::new(&opts.ignore);

    // Collect
    let collected = collect_files(&CollectContext {
        root: root.clone(),
        extensions,
        exclude_dir: Some(stamp_dir),
        follow_links: opts.follow_links,
    })?;
    report_skipped_paths(&collected.skipped);
    let scanned = collected.files.len();

    // Filter
    let (ignored, candidates): (Vec<_>, Vec<_>) = collected
        .files
        .into_iter()
        .partition(|f| filter.is_ignored(&f.path));
    for f in &ignored {
        debug!("Ignored {}", f.path.display());
    }

    // Decide (par_iter collect keeps scan order)
    let decisions: Vec<(CandidateFile, Decision)> = candidates
        .into_par_iter()
        .map(|f| {
            let d = store.needs_formatting(&f.path);
            (f, d)
        })
        .collect();
    let mut unchanged = Vec::new();
    let mut to_format = Vec::new();
    for (f, d) in decisions {
        match d {
            Decision::Unchanged => {
                debug!("Skipping {}, unchanged.", f.path.display());
                unchanged.push(f);
            }
            Decision::NeedsFormatting(reason) => {
                debug!("{} needs formatting ({:?})", f.path.display(), reason);
                to_format.push(f);
            }
        }
    }

    Ok(RunPlan {
        root,
        executable,
        store,
        scanned,
        ignored,
        unchanged,
        to_format,
        skipped_dirs: collected.skipped.len(),
    })
}

/// Format every changed file under `root`. Per-file failures do not stop the run; they show up
/// as `success == false` in the summary. Only configuration and scan-root problems are `Err`.
pub fn format_dir(root: &Path, opts: &FormatOpts) -> Result<RunSummary> {
    let plan = plan_run(root, opts)?;
    if opts.dry_run {
        let summary = report_plan(&plan);
        info!("{}", summary.summary_line());
        return Ok(summary);
    }

    let mut command = FormatterCommand::new(&plan.executable);
    command.leading_args = opts.formatter_args.clone();
    command.style_config = opts.style_config.clone();
    command.timeout = opts.timeout;

    let ctx = WorkerContext {
        command,
        store: plan.store.clone(),
        cancel: opts.cancel.clone(),
        progress: formatting_bar(opts.progress, plan.to_format.len()),
    };
    let executed = execute_jobs(&plan.to_format, ctx, opts.concurrency)?;

    let summary = RunSummary {
        scanned: plan.scanned,
        ignored: plan.ignored.len(),
        unchanged: plan.unchanged.len(),
        eligible: plan.to_format.len(),
        reformatted: executed.reformatted,
        failed: executed.failed,
        cancelled: executed.cancelled,
        skipped_dirs: plan.skipped_dirs,
        success: executed.failed == 0 && executed.cancelled == 0,
    };
    if executed.cancelled > 0 {
        log::warn!(
            "Cancelled: {} files were not formatted",
            executed.cancelled
        );
    }
    info!("{}", summary.summary_line());
    Ok(summary)
}

/// Stamp dir from options, or `<root>/.stampfmt`. Made absolute so the collector can exclude it.
pub fn resolve_stamp_dir(root: &Path, configured: Option<&Path>) -> PathBuf {
    let dir = configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(PackagePaths::get().stamp_dir_name()));
    let dir = std::path::absolute(&dir).unwrap_or(dir);
    dir.canonicalize().unwrap_or(dir)
}

/// Banner naming the formatter, printed once per session (or once per call without a session).
fn emit_banner(opts: &FormatOpts, executable: &Path) {
    let first = opts
        .session
        .as_ref()
        .is_none_or(|s| s.cache.claim_banner(&s.id));
    if first {
        info!(
            "{} {}: formatting with {}",
            PackagePaths::get().pkg_name(),
            env!("CARGO_PKG_VERSION"),
            executable.display()
        );
    }
}
