//! End-to-end format runs against a fake formatter (a shell script run through /bin/sh).
#![cfg(unix)]

use stampfmt::{Concurrency, ConfigError, FormatOpts, RunSummary, Session, SessionCache, format_dir};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

/// Appends the target to a log, fails on file names starting with "bad", otherwise marks the file
/// formatted (idempotent).
const FAKE_FORMATTER: &str = r#"for last; do :; done
echo "$last" >> "$STAMPFMT_TEST_LOG"
case "${last##*/}" in
  bad*) echo "cannot format $last" >&2; exit 2 ;;
esac
grep -q '^// formatted$' "$last" || echo '// formatted' >> "$last"
"#;

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
    stamps: PathBuf,
    log: PathBuf,
    script: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().canonicalize().unwrap();
        let root = base.join("proj");
        fs::create_dir_all(&root).unwrap();
        let log = base.join("invocations.log");
        let script = base.join("fake-format.sh");
        fs::write(
            &script,
            FAKE_FORMATTER.replace("$STAMPFMT_TEST_LOG", &log.to_string_lossy()),
        )
        .unwrap();
        Self {
            _dir: dir,
            root,
            stamps: base.join("stamps"),
            log,
            script,
        }
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let p = self.root.join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&p, content).unwrap();
        p
    }

    fn opts(&self, jobs: usize) -> FormatOpts {
        FormatOpts {
            formatter: PathBuf::from("/bin/sh"),
            formatter_args: vec![self.script.to_string_lossy().into_owned()],
            extensions: vec![".cpp".to_string()],
            concurrency: Concurrency::Fixed(jobs),
            stamp_dir: Some(self.stamps.clone()),
            ..Default::default()
        }
    }

    fn run(&self, opts: &FormatOpts) -> RunSummary {
        format_dir(&self.root, opts).unwrap()
    }

    /// Invocation log lines, sorted (workers finish in any order).
    fn invocations(&self) -> Vec<PathBuf> {
        let mut lines: Vec<PathBuf> = fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(PathBuf::from)
            .collect();
        lines.sort();
        lines
    }

    fn clear_log(&self) {
        let _ = fs::remove_file(&self.log);
    }

    fn stamp_count(&self) -> usize {
        count_stamps(&self.stamps)
    }
}

fn count_stamps(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|rd| {
            rd.flatten()
                .filter(|e| e.path().extension().is_some_and(|x| x == "stamp"))
                .count()
        })
        .unwrap_or(0)
}

#[test]
fn formats_once_then_skips_unchanged() {
    let fx = Fixture::new();
    let a = fx.write("a.cpp", "int a;\n");
    fx.write("b.txt", "not source\n");

    let first = fx.run(&fx.opts(2));
    assert_eq!(
        first.summary_line(),
        "1 of 1 files have been reformatted (0 ignored)"
    );
    assert!(first.success);
    assert_eq!(first.scanned, 1);
    assert_eq!(fx.invocations(), vec![a.clone()]);
    assert_eq!(fx.stamp_count(), 1);
    assert!(fs::read_to_string(&a).unwrap().ends_with("// formatted\n"));

    let second = fx.run(&fx.opts(2));
    assert_eq!(
        second.summary_line(),
        "0 of 0 files have been reformatted (0 ignored)"
    );
    assert_eq!(second.unchanged, 1);
    assert!(second.success);
    assert_eq!(fx.invocations(), vec![a]);
}

#[test]
fn ignored_file_never_reaches_formatter() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    let mut opts = fx.opts(1);
    opts.ignore = vec![r"a\.cpp$".to_string()];

    let summary = fx.run(&opts);
    assert_eq!(summary.eligible, 0);
    assert_eq!(summary.ignored, 1);
    assert_eq!(
        summary.summary_line(),
        "0 of 0 files have been reformatted (1 ignored)"
    );
    assert!(fx.invocations().is_empty());
    assert_eq!(fx.stamp_count(), 0);
}

#[test]
fn ignored_even_when_changed_and_bad_pattern_is_dropped() {
    let fx = Fixture::new();
    fx.write("keep.cpp", "int k;\n");
    fx.write("third_party/lib.cpp", "int t;\n");
    let mut opts = fx.opts(2);
    opts.ignore = vec!["(broken".to_string(), "THIRD_PARTY/".to_string()];

    let summary = fx.run(&opts);
    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.reformatted, 1);

    fx.write("third_party/lib.cpp", "int changed;\n");
    fx.clear_log();
    let summary = fx.run(&opts);
    assert_eq!(summary.eligible, 0);
    assert!(fx.invocations().is_empty());
}

#[test]
fn missing_formatter_is_config_error_and_touches_nothing() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");

    for formatter in ["/no/such/dir/clang-format", "stampfmt-missing-formatter-xyz"] {
        let mut opts = fx.opts(1);
        opts.formatter = PathBuf::from(formatter);
        opts.formatter_args.clear();
        let err = format_dir(&fx.root, &opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::FormatterNotFound(_))
        ));
    }
    assert!(!fx.stamps.exists());
    assert_eq!(fs::read_to_string(fx.root.join("a.cpp")).unwrap(), "int a;\n");
}

#[test]
fn bad_root_and_empty_extensions_are_config_errors() {
    let fx = Fixture::new();
    let err = format_dir(&fx.root.join("missing"), &fx.opts(1)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::RootMissing(_))
    ));

    let file = fx.write("a.cpp", "");
    let err = format_dir(&file, &fx.opts(1)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::RootNotDirectory(_))
    ));

    let mut opts = fx.opts(1);
    opts.extensions = vec![" ".to_string(), ".".to_string()];
    let err = format_dir(&fx.root, &opts).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::NoExtensions)
    ));
}

#[test]
fn only_changed_file_is_reselected() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    let b = fx.write("src/b.cpp", "int b;\n");
    fx.write("src/c.cpp", "int c;\n");

    let first = fx.run(&fx.opts(3));
    assert_eq!(first.reformatted, 3);

    fs::write(&b, "int b2;\n").unwrap();
    fx.clear_log();
    let second = fx.run(&fx.opts(3));
    assert_eq!(second.eligible, 1);
    assert_eq!(second.reformatted, 1);
    assert_eq!(second.unchanged, 2);
    assert_eq!(fx.invocations(), vec![b]);
}

#[test]
fn one_failure_does_not_stop_the_others() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    let bad = fx.write("bad.cpp", "int ???\n");
    fx.write("c.cpp", "int c;\n");

    let summary = fx.run(&fx.opts(2));
    assert!(!summary.success);
    assert_eq!(summary.eligible, 3);
    assert_eq!(summary.reformatted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(fx.invocations().len(), 3);
    assert_eq!(fx.stamp_count(), 2);
    assert_eq!(fs::read_to_string(&bad).unwrap(), "int ???\n");

    // The failed file has no stamp, so it is retried; the others are not.
    fx.clear_log();
    let again = fx.run(&fx.opts(2));
    assert_eq!(again.eligible, 1);
    assert_eq!(fx.invocations(), vec![bad]);
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let build = |jobs: usize| {
        let fx = Fixture::new();
        for i in 0..12 {
            fx.write(&format!("dir{}/file{:02}.cpp", i % 3, i), "int x;\n");
        }
        fx.write("dir1/bad_one.cpp", "int y;\n");
        fx.write("gen/skip.cpp", "int z;\n");
        let mut opts = fx.opts(jobs);
        opts.ignore = vec!["/gen/".to_string()];
        let summary = fx.run(&opts);
        (summary, fx.invocations().len(), fx.stamp_count())
    };

    let baseline = build(1);
    assert_eq!(baseline.0.eligible, 13);
    assert_eq!(baseline.0.reformatted, 12);
    assert_eq!(baseline.0.failed, 1);
    assert_eq!(baseline.0.ignored, 1);
    for jobs in [2, 4, 16] {
        assert_eq!(build(jobs), baseline, "jobs = {}", jobs);
    }
}

#[test]
fn dry_run_reports_without_running_or_stamping() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    fx.write("b.cpp", "int b;\n");
    let mut opts = fx.opts(2);
    opts.dry_run = true;

    let summary = fx.run(&opts);
    assert!(summary.success);
    assert_eq!(summary.eligible, 2);
    assert_eq!(summary.reformatted, 0);
    assert!(fx.invocations().is_empty());
    assert!(!fx.stamps.exists());
}

#[test]
fn cancelled_run_starts_nothing() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    fx.write("b.cpp", "int b;\n");
    let mut opts = fx.opts(2);
    opts.cancel = Some(Arc::new(AtomicBool::new(true)));

    let summary = fx.run(&opts);
    assert!(!summary.success);
    assert_eq!(summary.cancelled, 2);
    assert_eq!(summary.reformatted, 0);
    assert!(fx.invocations().is_empty());
    assert_eq!(fx.stamp_count(), 0);
}

#[test]
fn default_stamp_dir_lives_under_root_and_is_not_scanned() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    let mut opts = fx.opts(1);
    opts.stamp_dir = None;
    // Records end in ".stamp"; make the extension set match them to prove the dir is skipped.
    opts.extensions = vec![".cpp".to_string(), ".stamp".to_string()];

    let first = fx.run(&opts);
    assert_eq!(first.reformatted, 1);
    let default_dir = fx.root.join(".stampfmt");
    assert_eq!(count_stamps(&default_dir), 1);

    let second = fx.run(&opts);
    assert_eq!(second.scanned, 1);
    assert_eq!(second.eligible, 0);
}

#[test]
fn moving_the_tree_keeps_stamps_valid() {
    let fx = Fixture::new();
    fx.write("src/a.cpp", "int a;\n");
    fx.run(&fx.opts(1));

    let moved = fx.root.with_file_name("proj-moved");
    fs::rename(&fx.root, &moved).unwrap();
    fx.clear_log();
    let summary = format_dir(&moved, &fx.opts(1)).unwrap();
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.eligible, 0);
    assert!(fx.invocations().is_empty());
}

#[test]
fn session_banner_is_claimed_once() {
    let fx = Fixture::new();
    fx.write("a.cpp", "int a;\n");
    let cache = Arc::new(SessionCache::new());
    let mut opts = fx.opts(1);
    opts.session = Some(Session {
        id: "build-42".to_string(),
        cache: Arc::clone(&cache),
    });

    fx.run(&opts);
    assert!(cache.has_banner("build-42"));
    assert!(!cache.claim_banner("build-42"));
    fx.run(&opts);
    assert!(!cache.has_banner("build-43"));
}

#[test]
fn style_file_is_forwarded_to_formatter() {
    let fx = Fixture::new();
    let target = fx.write("a.cpp", "int a;\n");
    let args_log = fx.root.with_file_name("args.log");
    let script = fx.root.with_file_name("echo-args.sh");
    fs::write(
        &script,
        format!("echo \"$@\" >> '{}'\n", args_log.to_string_lossy()),
    )
    .unwrap();
    let style = fx.root.with_file_name("my style.yml");

    let mut opts = fx.opts(1);
    opts.formatter_args = vec![script.to_string_lossy().into_owned()];
    opts.style_config = Some(style.clone());
    let summary = fx.run(&opts);
    assert!(summary.success);

    let logged = fs::read_to_string(&args_log).unwrap();
    assert_eq!(
        logged.trim_end(),
        format!(
            "-i --style=file:{} {}",
            style.to_string_lossy(),
            target.to_string_lossy()
        )
    );
}
