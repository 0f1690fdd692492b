//! Pipeline context: shared data for the collector and the formatter workers.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::progress::ProgressBar;
use crate::engine::runner::FormatterCommand;
use crate::engine::stamps::StampStore;

/// What the file collector needs: root, extension set and the stamp dir to keep out of the scan.
#[derive(Clone, Debug)]
pub struct CollectContext {
    pub root: PathBuf,
    /// Normalized extensions (lowercase, leading dot).
    pub extensions: Vec<String>,
    pub exclude_dir: Option<PathBuf>,
    pub follow_links: bool,
}

/// Shared state for every formatter worker.
pub struct WorkerContext {
    pub command: FormatterCommand,
    pub store: StampStore,
    pub cancel: Option<Arc<AtomicBool>>,
    pub progress: Option<ProgressBar>,
}

impl WorkerContext {
    pub fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|c| c.load(Ordering::Relaxed))
    }
}
