//! Progress bar utilities for the formatting phase

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )))
}

/// Bar for `total` formatter jobs, or None when progress is off or there is nothing to do.
pub fn formatting_bar(enabled: bool, total: usize) -> Option<ProgressBar> {
    (enabled && total > 0)
        .then(|| create_progress_bar(ProgressBarConfig::new(total, "Formatting", Animation::Classic)))
}

/// Advance by `n`. Each step is a whole process run, so blocking on the lock is fine.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.update(n);
    }
}

/// Finish the line so following log output starts clean.
pub fn finish_progress_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.lock() {
        let _ = bar.refresh();
        eprintln!();
    }
}
