//! Path, list and executable lookup utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::utils::config::LIST_SEPARATORS;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Render a relative path with `/` separators so stamp keys match across platforms.
pub fn path_to_key_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Split a pipe- or semicolon-delimited list, trimming entries and dropping empty ones.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(LIST_SEPARATORS)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase, add the leading `.`, drop duplicates (first occurrence wins).
pub fn normalize_extensions<S: AsRef<str>>(exts: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(exts.len());
    for ext in exts {
        let ext = ext.as_ref().trim().trim_start_matches('*');
        if ext.is_empty() || ext == "." {
            continue;
        }
        let ext = if ext.starts_with('.') {
            ext.to_lowercase()
        } else {
            format!(".{}", ext.to_lowercase())
        };
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// Lowercase extension of `path` with leading `.`, or None when it has none.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Validate that `root` exists and is a directory, then canonicalize it.
pub fn check_and_canonicalize_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(ConfigError::RootMissing(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(ConfigError::RootNotDirectory(root.to_path_buf()).into());
    }
    root.canonicalize()
        .with_context(|| format!("canonicalize root {}", root.display()))
}

/// Resolve the formatter: a path with a directory component must exist as a file,
/// a bare name is searched on `PATH` (with `PATHEXT` on Windows).
pub fn resolve_executable(exe: &Path) -> Result<PathBuf, ConfigError> {
    let is_bare = exe.components().count() == 1 && !exe.is_absolute();
    if !is_bare {
        return if exe.is_file() {
            Ok(exe.to_path_buf())
        } else {
            Err(ConfigError::FormatterNotFound(exe.to_path_buf()))
        };
    }
    find_on_path(exe).ok_or_else(|| ConfigError::FormatterNotFound(exe.to_path_buf()))
}

fn find_on_path(tool: &Path) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    let extensions: Vec<String> = if cfg!(windows) && tool.extension().is_none() {
        std::env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(|s| s.to_ascii_lowercase())
            .collect()
    } else {
        vec![String::new()]
    };

    for dir in std::env::split_paths(&path_var) {
        for ext in &extensions {
            let candidate = if ext.is_empty() {
                dir.join(tool)
            } else {
                let mut name = tool.as_os_str().to_os_string();
                name.push(ext);
                dir.join(name)
            };
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Quote an argument for display when it contains whitespace.
pub fn display_arg(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}
