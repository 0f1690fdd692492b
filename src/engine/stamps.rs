//! Fingerprint store: one plain-text stamp per formatted file, holding the hex blake3 digest
//! of the file as it was right after its last successful format.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::hashing::{digest_from_hex, digest_to_hex, hash_file};
use crate::engine::tools::{path_relative_to, path_to_key_string};
use crate::utils::config::StampConsts;

/// Why a file was selected for formatting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeReason {
    NoRecord,
    RecordUnreadable,
    HashFailed,
    ContentChanged,
}

/// Outcome of comparing a file against its stamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Unchanged,
    NeedsFormatting(ChangeReason),
}

impl Decision {
    pub fn needs_formatting(&self) -> bool {
        matches!(self, Decision::NeedsFormatting(_))
    }
}

/// Stamps for files under `root`, stored flat in `dir`.
#[derive(Clone, Debug)]
pub struct StampStore {
    root: PathBuf,
    dir: PathBuf,
}

impl StampStore {
    pub fn new(root: &Path, dir: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Record file name for `file`: hash of the root-relative path plus a readable copy of the
    /// file name. Paths outside the root fall back to the full path.
    pub fn key_for(&self, file: &Path) -> String {
        let rel = path_relative_to(file, &self.root).unwrap_or_else(|| file.to_path_buf());
        let rel_hash = blake3::hash(path_to_key_string(&rel).as_bytes()).to_hex();
        let name = file
            .file_name()
            .map(|n| sanitize_name(&n.to_string_lossy()))
            .unwrap_or_default();
        format!(
            "{}-{}.{}",
            &rel_hash.as_str()[..StampConsts::KEY_HEX_LEN],
            name,
            StampConsts::EXTENSION
        )
    }

    pub fn record_path(&self, file: &Path) -> PathBuf {
        self.dir.join(self.key_for(file))
    }

    /// Compare the file's current digest to its stamp. Any failure along the way means
    /// "needs formatting".
    pub fn needs_formatting(&self, file: &Path) -> Decision {
        let record = self.record_path(file);
        let stored = match fs::read_to_string(&record) {
            Ok(s) => digest_from_hex(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Decision::NeedsFormatting(ChangeReason::NoRecord);
            }
            Err(e) => {
                log::debug!("Cannot read stamp {}: {}", record.display(), e);
                return Decision::NeedsFormatting(ChangeReason::RecordUnreadable);
            }
        };
        let Some(stored) = stored else {
            log::debug!("Malformed stamp {}", record.display());
            return Decision::NeedsFormatting(ChangeReason::RecordUnreadable);
        };
        match hash_file(file) {
            Ok(current) if current == stored => Decision::Unchanged,
            Ok(_) => Decision::NeedsFormatting(ChangeReason::ContentChanged),
            Err(e) => {
                log::warn!(
                    "Cannot hash {}, assuming changed: {}",
                    file.display(),
                    e
                );
                Decision::NeedsFormatting(ChangeReason::HashFailed)
            }
        }
    }

    /// Persist `digest` as the stamp for `file`. Writes a temp sibling and renames it over the record.
    pub fn record_success(&self, file: &Path, digest: &[u8; 32]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create stamp directory {}", self.dir.display()))?;
        let record = self.record_path(file);
        let tmp = record.with_extension(format!("{}.tmp", StampConsts::EXTENSION));
        fs::write(&tmp, digest_to_hex(digest))
            .with_context(|| format!("write stamp {}", tmp.display()))?;
        fs::rename(&tmp, &record).with_context(|| {
            format!(
                "rename stamp into place ({} -> {})",
                tmp.display(),
                record.display()
            )
        })?;
        Ok(())
    }
}

/// Keep `[A-Za-z0-9._-]`, replace the rest with `_`, cap the length.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(StampConsts::MAX_NAME_LEN)
        .collect()
}
