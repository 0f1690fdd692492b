//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    stamp_dir_name: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                stamp_dir_name: format!(".{pkg}"),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Default fingerprint store directory name, created under the scanned root.
    pub fn stamp_dir_name(&self) -> &str {
        &self.stamp_dir_name
    }

    /// Per-project config file looked up in the scanned root (CLI only).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Discovery ----

/// Extensions formatted when none are configured.
pub const DEFAULT_EXTENSIONS: &str = ".cpp|.c|.h|.hpp|.inl";

/// Separators accepted in delimited list options. Pipe is the MSBuild-safe one.
pub const LIST_SEPARATORS: &[char] = &['|', ';'];

// ---- Formatter invocation ----

/// Formatter flag defaults (clang-format conventions).
pub struct FormatterConsts;

impl FormatterConsts {
    /// Flag asking the formatter to rewrite the file in place.
    pub const IN_PLACE_FLAG: &'static str = "-i";
    /// Prefix of the argument selecting an explicit style file.
    pub const STYLE_FILE_PREFIX: &'static str = "--style=file:";
    /// Command line reported when the process never started.
    pub const SPAWN_FAILED_COMMAND: &'static str = "<failed to start>";
    /// Poll interval while waiting on a child with a timeout.
    pub const WAIT_POLL_MS: u64 = 10;
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Fingerprint records ----

/// Stamp file naming.
pub struct StampConsts;

impl StampConsts {
    /// Hex characters of the path hash kept in the record name (128 bits).
    pub const KEY_HEX_LEN: usize = 32;
    /// Extension of fingerprint records.
    pub const EXTENSION: &'static str = "stamp";
    /// Longest sanitized file name appended to a record name.
    pub const MAX_NAME_LEN: usize = 64;
}
