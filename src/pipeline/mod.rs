//! Pipeline components: collector, formatter workers, execute phase, error reporting.

pub mod context;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;
pub mod workers;

pub use context::{CollectContext, WorkerContext};
pub use error_handler::report_skipped_paths;
pub use orchestrator::{ExecuteResult, execute_jobs, shutdown_worker_handles, worker_count};
pub use walk::{
    CollectOutcome, WalkOutcome, collect_files, run_collect_loop, sort_candidates,
    to_outcome_walkdir,
};
pub use workers::{FileOutcome, Job, WorkerReport, spawn_format_workers};
