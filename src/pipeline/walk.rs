//! File collector: iterative walk of the root, filtered by extension, sorted for a stable run order.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::CandidateFile;
use crate::engine::tools::dotted_extension;

use super::context::CollectContext;

/// One result from a directory walk: either a file to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err {
        msg: String,
        path: Option<PathBuf>,
        depth: usize,
    },
}

/// Convert a walkdir result into [`WalkOutcome`]. Directories are dropped here.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> Option<WalkOutcome> {
    match r {
        Ok(entry) if entry.file_type().is_file() => Some(WalkOutcome::Ok(entry.into_path())),
        Ok(_) => None,
        Err(err) => Some(WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
            depth: err.depth(),
        }),
    }
}

/// Files and unreadable directories found by [`collect_files`].
#[derive(Debug, Default)]
pub struct CollectOutcome {
    pub files: Vec<CandidateFile>,
    pub skipped: Vec<(PathBuf, String)>,
}

/// Walk `ctx.root` depth-first. walkdir keeps an explicit stack of open directories, so deep
/// trees cannot overflow ours. An unreadable subdirectory contributes nothing; an unreadable
/// root is an error.
pub fn collect_files(ctx: &CollectContext) -> Result<CollectOutcome> {
    let exclude_dir = ctx.exclude_dir.clone();
    let iter = WalkDir::new(&ctx.root)
        .follow_links(ctx.follow_links)
        .into_iter()
        .filter_entry(move |e| exclude_dir.as_deref() != Some(e.path()))
        .filter_map(to_outcome_walkdir);
    run_collect_loop(ctx, iter)
}

/// Consume `iter`, keep files whose extension is in the set, record recoverable errors,
/// then sort and dedup.
pub fn run_collect_loop<I>(ctx: &CollectContext, iter: I) -> Result<CollectOutcome>
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut out = CollectOutcome::default();
    for outcome in iter {
        match outcome {
            WalkOutcome::Ok(path) => {
                if let Some(ext) = dotted_extension(&path)
                    && ctx.extensions.contains(&ext)
                {
                    out.files.push(CandidateFile {
                        path,
                        extension: ext,
                    });
                }
            }
            WalkOutcome::Err { msg, path, depth } => {
                if depth == 0 {
                    anyhow::bail!("read root directory {}: {}", ctx.root.display(), msg);
                }
                log::warn!("Skipping unreadable path: {}", msg);
                let to_push = path.unwrap_or_else(|| PathBuf::from("<no-path>"));
                out.skipped.push((to_push, msg));
            }
        }
    }
    sort_candidates(&mut out.files);
    Ok(out)
}

/// Lexicographic, case-insensitive; exact path breaks ties. Duplicates removed.
pub fn sort_candidates(files: &mut Vec<CandidateFile>) {
    files.sort_by_cached_key(|f| (sort_key(&f.path), f.path.clone()));
    files.dedup_by(|a, b| a.path == b.path);
}

fn sort_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
