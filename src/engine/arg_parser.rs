use clap::Parser;
use std::path::PathBuf;

use crate::Concurrency;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Incremental formatter dispatcher.
#[derive(Clone, Parser)]
#[command(name = "stampfmt")]
#[command(about = "Run a formatter on files changed since their last successful format.")]
pub struct Cli {
    /// Directory to scan. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Formatter executable (path or name on PATH). Default: clang-format.
    #[arg(long, short = 'f')]
    pub formatter: Option<PathBuf>,

    /// Extra argument passed before the in-place flag. Repeatable.
    #[arg(long = "formatter-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub formatter_args: Vec<String>,

    /// Extensions to format, pipe-delimited or repeated (e.g. ".cpp|.h"). Default: .cpp|.c|.h|.hpp|.inl
    #[arg(long, short = 'x', num_args = 1..)]
    pub extensions: Vec<String>,

    /// Ignore patterns (regex, case-insensitive, matched on the full path). Can specify multiple: -e pattern1 pattern2
    #[arg(long, short = 'e', num_args = 1..)]
    pub ignore: Vec<String>,

    /// Ignore patterns as one pipe-delimited string.
    #[arg(long, value_name = "PATTERNS")]
    pub ignore_list: Option<String>,

    /// Formatter processes to run at once: a positive integer or "auto".
    #[arg(long, short = 'j')]
    pub jobs: Option<Concurrency>,

    /// Explicit style file for the formatter.
    #[arg(long, short = 's')]
    pub style: Option<PathBuf>,

    /// Directory holding fingerprint stamps. Default: `.stampfmt` in DIR.
    #[arg(long)]
    pub stamp_dir: Option<PathBuf>,

    /// Kill a formatter process after this many seconds.
    #[arg(long, short = 't', value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Build session id; the banner is printed once per session.
    #[arg(long)]
    pub session: Option<String>,

    /// Report what would be formatted; run nothing and write no stamps.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    pub json: bool,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Show a progress bar while formatting.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Follow symbolic links.
    #[arg(long, short = 'L', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,
}
