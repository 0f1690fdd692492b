//! Load `.stampfmt.toml` from the scanned directory (CLI only). Lib callers build FormatOpts directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::tools::split_list;
use crate::utils::config::PackagePaths;
use crate::{Concurrency, FormatOpts};

#[derive(Debug, Deserialize)]
pub(crate) struct StampfmtToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    formatter: Option<String>,
    formatter_args: Option<Vec<String>>,
    extensions: Option<ListValue>,
    ignore: Option<Vec<String>>,
    concurrency: Option<ConcurrencyValue>,
    style: Option<String>,
    stamp_dir: Option<String>,
    timeout: Option<u64>,
    verbose: Option<bool>,
    follow_links: Option<bool>,
    progress: Option<bool>,
}

/// `extensions = ".cpp|.h"` or `extensions = [".cpp", ".h"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListValue {
    Delimited(String),
    List(Vec<String>),
}

/// `concurrency = 4` or `concurrency = "auto"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ConcurrencyValue {
    Count(usize),
    Text(String),
}

/// Load the config file from `dir` if present. Returns None if missing or unreadable; a file that
/// does not parse is reported as a warning.
pub(crate) fn load_stampfmt_toml(dir: &Path) -> Option<StampfmtToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_stampfmt_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_stampfmt_toml(s: &str) -> Result<StampfmtToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
/// Relative paths are taken relative to `dir`. dry_run is never read from the file.
/// Returns the file's `verbose` setting, which the CLI owns.
pub(crate) fn apply_file_to_opts(file: &StampfmtToml, dir: &Path, opts: &mut FormatOpts) -> Option<bool> {
    let idx = &file.settings;
    if let Some(ref f) = idx.formatter {
        let p = PathBuf::from(f);
        opts.formatter = if p.components().count() > 1 && p.is_relative() {
            dir.join(p)
        } else {
            p
        };
    }
    if let Some(ref args) = idx.formatter_args {
        opts.formatter_args = args.clone();
    }
    match &idx.extensions {
        Some(ListValue::Delimited(s)) => opts.extensions = split_list(s),
        Some(ListValue::List(v)) => opts.extensions = v.iter().flat_map(|s| split_list(s)).collect(),
        None => {}
    }
    if let Some(ref v) = idx.ignore {
        opts.ignore = v.clone();
    }
    match &idx.concurrency {
        Some(ConcurrencyValue::Count(n)) => opts.concurrency = Concurrency::Fixed(*n),
        Some(ConcurrencyValue::Text(s)) => match s.parse() {
            Ok(c) => opts.concurrency = c,
            Err(e) => log::warn!("{}; keeping {:?}", e, opts.concurrency),
        },
        None => {}
    }
    if let Some(ref s) = idx.style {
        opts.style_config = Some(dir.join(s));
    }
    if let Some(ref s) = idx.stamp_dir {
        opts.stamp_dir = Some(dir.join(s));
    }
    if let Some(secs) = idx.timeout {
        opts.timeout = Some(Duration::from_secs(secs));
    }
    apply_file_opt!(idx, opts, follow_links => follow_links);
    apply_file_opt!(idx, opts, progress => progress);
    idx.verbose
}
