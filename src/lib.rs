//! stampfmt: incremental formatter dispatcher with content-hash stamps

pub mod check;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::ConfigError;
pub use types::*;
pub use utils::session::SessionCache;

/// Result alias used by public stampfmt API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use dispatch::{RunPlan, plan_run};

/// Single entry point: format every file under `root` whose content changed since its last
/// successful format, and return the run's counts.
///
/// - Configuration problems (missing root, formatter not found, no extensions) are `Err` and
///   carry a [`ConfigError`]: `err.downcast_ref::<ConfigError>()`.
/// - Per-file failures are not errors: check [`RunSummary::success`] and [`RunSummary::failed`].
///
/// ```ignore
/// let opts = stampfmt::FormatOpts {
///     formatter: "clang-format".into(),
///     concurrency: stampfmt::Concurrency::Fixed(4),
///     ..Default::default()
/// };
/// let summary = stampfmt::format_dir(std::path::Path::new("src"), &opts)?;
/// println!("{}", summary.summary_line());
/// ```
pub fn format_dir(root: &std::path::Path, opts: &FormatOpts) -> Result<RunSummary> {
    dispatch::format_dir(root, opts)
}
