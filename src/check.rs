//! Dry-run reporting: what a run would format, without running anything.

use colored::Colorize;
use log::info;

use crate::RunSummary;
use crate::dispatch::RunPlan;

/// Log the files a real run would format and return the summary of a run that formatted nothing.
pub fn report_plan(plan: &RunPlan) -> RunSummary {
    for f in &plan.to_format {
        info!("Would format {}", f.path.display());
    }
    info!(
        "{} | {} | {}",
        format!("To format: {}", plan.to_format.len()).yellow(),
        format!("Unchanged: {}", plan.unchanged.len()).green(),
        format!("Ignored: {}", plan.ignored.len()).white()
    );
    RunSummary {
        scanned: plan.scanned,
        ignored: plan.ignored.len(),
        unchanged: plan.unchanged.len(),
        eligible: plan.to_format.len(),
        reformatted: 0,
        failed: 0,
        cancelled: 0,
        skipped_dirs: plan.skipped_dirs,
        success: true,
    }
}
