//! CLI command handler: defaults → `.stampfmt.toml` → flags, then one format run.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::dispatch::{format_dir, resolve_stamp_dir};
use crate::engine::arg_parser::Cli;
use crate::engine::ignore_filter::split_patterns;
use crate::engine::tools::split_list;
use crate::utils::session::SessionCache;
use crate::utils::{apply_file_to_opts, load_stampfmt_toml, set_verbose, setup_logging};
use crate::{FormatOpts, RunSummary, Session};

/// Build options from the config file in DIR (if any) with CLI flags on top. Returns (opts, verbose).
pub fn setup_opts(cli: &Cli) -> (FormatOpts, bool) {
    let mut opts = FormatOpts::default();
    let mut verbose = false;
    if let Some(file) = load_stampfmt_toml(&cli.dir)
        && let Some(v) = apply_file_to_opts(&file, &cli.dir, &mut opts)
    {
        verbose = v;
    }

    if let Some(f) = &cli.formatter {
        opts.formatter = f.clone();
    }
    if !cli.formatter_args.is_empty() {
        opts.formatter_args = cli.formatter_args.clone();
    }
    if !cli.extensions.is_empty() {
        opts.extensions = cli.extensions.iter().flat_map(|s| split_list(s)).collect();
    }
    if !cli.ignore.is_empty() || cli.ignore_list.is_some() {
        opts.ignore = cli.ignore.clone();
        if let Some(list) = &cli.ignore_list {
            opts.ignore.extend(split_patterns(list));
        }
    }
    if let Some(j) = cli.jobs {
        opts.concurrency = j;
    }
    if let Some(s) = &cli.style {
        opts.style_config = Some(s.clone());
    }
    if let Some(d) = &cli.stamp_dir {
        opts.stamp_dir = Some(d.clone());
    }
    if let Some(secs) = cli.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    if let Some(p) = cli.progress {
        opts.progress = p;
    }
    if let Some(f) = cli.follow_links {
        opts.follow_links = f;
    }
    if let Some(v) = cli.verbose {
        verbose = v;
    }
    opts.dry_run = cli.dry_run;
    (opts, verbose)
}

/// Session for `--session ID`. The marker file under the stamp dir is skipped on dry runs,
/// which write nothing.
pub fn session_for(cli: &Cli, opts: &FormatOpts) -> Option<Session> {
    let id = cli.session.as_ref()?;
    let marker = if opts.dry_run {
        None
    } else {
        cli.dir
            .canonicalize()
            .map(|root| resolve_stamp_dir(&root, opts.stamp_dir.as_deref()).join("session"))
            .ok()
    };
    let cache = match marker {
        Some(m) => SessionCache::persistent(m),
        None => SessionCache::new(),
    };
    Some(Session {
        id: id.clone(),
        cache: Arc::new(cache),
    })
}

/// Run one format pass for the CLI. Installs a Ctrl+C handler that stops dispatching new files.
pub fn handle_run(cli: &Cli) -> Result<RunSummary> {
    // Before the config file is read, so its warnings are not lost.
    setup_logging(cli.verbose.unwrap_or(false));
    let (mut opts, verbose) = setup_opts(cli);
    set_verbose(verbose);
    opts.session = session_for(cli, &opts);

    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;
    opts.cancel = Some(cancel_requested);

    if opts.dry_run {
        warn!("RUNNING IN DRY-RUN MODE. NO FILES WILL BE FORMATTED AND NO STAMPS WRITTEN.");
    }
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let summary = format_dir(&cli.dir, &opts)?;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serialize run summary")?
        );
    }
    Ok(summary)
}
