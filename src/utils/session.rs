//! Per-build-session bookkeeping owned by the caller.
//!
//! A build may call [`format_dir`](crate::format_dir) many times (once per project). The banner
//! naming the formatter should appear once per session, so the caller keeps a [`SessionCache`]
//! alive across those calls and passes it in with a session id. The CLI runs once per process,
//! so it uses a marker file instead of memory to remember the last session.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// Session ids for which the banner was already emitted.
#[derive(Debug, Default)]
pub struct SessionCache {
    bannered: Mutex<HashSet<String>>,
    marker: Option<PathBuf>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that also remembers the most recent session id in `marker`.
    pub fn persistent(marker: PathBuf) -> Self {
        Self {
            bannered: Mutex::new(HashSet::new()),
            marker: Some(marker),
        }
    }

    /// Returns true the first time it is called for `session_id`, false afterwards.
    pub fn claim_banner(&self, session_id: &str) -> bool {
        let mut seen = self
            .bannered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !seen.insert(session_id.to_string()) {
            return false;
        }
        let Some(marker) = &self.marker else {
            return true;
        };
        let previous = std::fs::read_to_string(marker).unwrap_or_default();
        if previous.trim() == session_id {
            return false;
        }
        if let Some(parent) = marker.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(marker, session_id) {
            log::debug!("Cannot write session marker {}: {}", marker.display(), e);
        }
        true
    }

    pub fn has_banner(&self, session_id: &str) -> bool {
        self.bannered
            .lock()
            .map(|seen| seen.contains(session_id))
            .unwrap_or(false)
    }
}
