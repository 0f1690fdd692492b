use std::path::PathBuf;

/// Log directories the collector could not read. They contributed no files; the run goes on.
pub fn report_skipped_paths(skipped_paths: &[(PathBuf, String)]) {
    if skipped_paths.is_empty() {
        return;
    }
    log::warn!(
        "Skipped {} paths due to permission errors or access issues",
        skipped_paths.len()
    );
    for (p, msg) in skipped_paths {
        log::debug!("  skipped: {} ({})", p.display(), msg);
    }
}
