//! Public and internal types for the stampfmt API and pipeline.

use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::error::ConfigError;
use crate::utils::config::DEFAULT_EXTENSIONS;
use crate::utils::session::SessionCache;

/// A source file found under the root whose extension is in the configured set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute path (under the canonicalized root).
    pub path: PathBuf,
    /// Lowercase extension with leading dot, e.g. `.cpp`.
    pub extension: String,
}

/// How many formatter processes may run at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// One worker per available thread.
    #[default]
    Auto,
    /// Exactly this many workers (0 is clamped to 1).
    Fixed(usize),
}

impl Concurrency {
    /// Token accepted for [`Concurrency::Auto`].
    pub const AUTO_TOKEN: &'static str = "auto";

    /// Resolve to a worker count, never below 1.
    pub fn resolve(self) -> usize {
        let n = match self {
            Concurrency::Auto => rayon::current_num_threads(),
            Concurrency::Fixed(n) => n,
        };
        n.max(1)
    }
}

impl FromStr for Concurrency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(Self::AUTO_TOKEN) {
            return Ok(Concurrency::Auto);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Concurrency::Fixed(n)),
            _ => Err(ConfigError::InvalidConcurrency(s.to_string())),
        }
    }
}

/// Build-session identity plus the caller-owned cache that remembers which sessions already
/// printed the banner.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub cache: Arc<SessionCache>,
}

/// Options for [`format_dir`](crate::format_dir).
#[derive(Clone, Debug)]
pub struct FormatOpts {
    /// Formatter executable: a path, or a bare name looked up on `PATH`.
    pub formatter: PathBuf,
    /// Extra arguments placed before the in-place flag.
    pub formatter_args: Vec<String>,
    /// Extensions to format. Entries may omit the leading dot; matching is case-insensitive.
    pub extensions: Vec<String>,
    /// Ignore patterns (regex, case-insensitive) tested against the full path.
    pub ignore: Vec<String>,
    pub concurrency: Concurrency,
    /// Explicit style file passed to the formatter instead of letting it search the tree.
    pub style_config: Option<PathBuf>,
    /// Fingerprint store directory. When None, uses `root.join(<package stamp dir>)` (e.g. `.stampfmt`).
    pub stamp_dir: Option<PathBuf>,
    /// Kill a formatter process that runs longer than this.
    pub timeout: Option<Duration>,
    /// Follow symbolic links while scanning.
    pub follow_links: bool,
    /// Decide only: report what would be formatted, never run the formatter or write stamps.
    pub dry_run: bool,
    /// Show a progress bar while formatting.
    pub progress: bool,
    /// Emit the banner once per session instead of once per call.
    pub session: Option<Session>,
    /// Set by the caller (e.g. a Ctrl+C handler) to stop dispatching new files.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for FormatOpts {
    fn default() -> Self {
        Self {
            formatter: PathBuf::from("clang-format"),
            formatter_args: Vec::new(),
            extensions: crate::engine::tools::split_list(DEFAULT_EXTENSIONS),
            ignore: Vec::new(),
            concurrency: Concurrency::Auto,
            style_config: None,
            stamp_dir: None,
            timeout: None,
            follow_links: false,
            dry_run: false,
            progress: false,
            session: None,
            cancel: None,
        }
    }
}

/// Counts for one run. Returned by [`format_dir`](crate::format_dir).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files under the root with a matching extension.
    pub scanned: usize,
    /// Files excluded by an ignore pattern.
    pub ignored: usize,
    /// Files whose fingerprint matched; not formatted.
    pub unchanged: usize,
    /// Files selected for formatting.
    pub eligible: usize,
    /// Files the formatter processed successfully.
    pub reformatted: usize,
    /// Files whose invocation failed to start, exited non-zero or timed out.
    pub failed: usize,
    /// Eligible files never started because the run was cancelled.
    pub cancelled: usize,
    /// Directories that could not be read during the scan.
    pub skipped_dirs: usize,
    /// True when no file failed and nothing was cancelled.
    pub success: bool,
}

impl RunSummary {
    /// `"<reformatted> of <eligible> files have been reformatted (<ignored> ignored)"`
    pub fn summary_line(&self) -> String {
        format!(
            "{} of {} files have been reformatted ({} ignored)",
            self.reformatted, self.eligible, self.ignored
        )
    }
}
