//! Formatter runner: one external process per file, output captured, never panics or errors.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine::tools::display_arg;
use crate::utils::config::FormatterConsts;

/// Why an invocation did not succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The process could not be started (missing binary, permission denied).
    SpawnFailed,
    /// The process ran and returned a non-zero status (or was killed by a signal).
    NonZeroExit,
    /// The process outlived the configured timeout and was killed.
    TimedOut,
}

/// Everything known about one formatter invocation.
#[derive(Clone, Debug)]
pub struct InvocationResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub command_line: String,
    pub failure: Option<FailureKind>,
}

impl InvocationResult {
    fn spawn_failed(err: &std::io::Error) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: err.to_string(),
            command_line: FormatterConsts::SPAWN_FAILED_COMMAND.to_string(),
            failure: Some(FailureKind::SpawnFailed),
        }
    }
}

/// How to invoke the formatter on a file.
#[derive(Clone, Debug)]
pub struct FormatterCommand {
    pub executable: PathBuf,
    /// Arguments placed before the in-place flag (e.g. a script for an interpreter).
    pub leading_args: Vec<String>,
    pub style_config: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl FormatterCommand {
    pub fn new(executable: &Path) -> Self {
        Self {
            executable: executable.to_path_buf(),
            leading_args: Vec::new(),
            style_config: None,
            timeout: None,
        }
    }

    /// Arguments after the executable: leading args, in-place flag, optional style file, target file.
    pub fn args_for(&self, file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.push(FormatterConsts::IN_PLACE_FLAG.into());
        if let Some(style) = &self.style_config {
            let mut arg = OsString::from(FormatterConsts::STYLE_FILE_PREFIX);
            arg.push(style.as_os_str());
            args.push(arg);
        }
        args.push(file.as_os_str().to_os_string());
        args
    }

    /// Human-readable command line; whitespace-containing parts are quoted.
    pub fn command_line(&self, file: &Path) -> String {
        let mut parts = vec![display_arg(&self.executable.to_string_lossy())];
        for arg in &self.leading_args {
            parts.push(display_arg(arg));
        }
        parts.push(FormatterConsts::IN_PLACE_FLAG.to_string());
        if let Some(style) = &self.style_config {
            parts.push(format!(
                "{}{}",
                FormatterConsts::STYLE_FILE_PREFIX,
                display_arg(&style.to_string_lossy())
            ));
        }
        parts.push(display_arg(&file.to_string_lossy()));
        parts.join(" ")
    }

    /// Run the formatter on `file`. Both pipes are drained on reader threads while the child runs.
    pub fn run(&self, file: &Path) -> InvocationResult {
        let command_line = self.command_line(file);
        let mut command = Command::new(&self.executable);
        command
            .args(self.args_for(file))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so a timeout also reaches anything a wrapper script started.
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);
        let mut child = match command.spawn() {
            Ok(c) => c,
            Err(e) => return InvocationResult::spawn_failed(&e),
        };

        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let (status, timed_out) = match wait_child(&mut child, self.timeout) {
            Ok(s) => s,
            Err(e) => {
                kill_process_tree(&mut child);
                let _ = child.wait();
                let mut result = InvocationResult::spawn_failed(&e);
                result.command_line = command_line;
                return result;
            }
        };

        let stdout = join_reader(stdout_reader);
        let mut stderr = join_reader(stderr_reader);
        let exit_code = status.and_then(|s| s.code());

        let failure = if timed_out {
            if let Some(t) = self.timeout {
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!("killed after timeout of {:?}", t));
            }
            Some(FailureKind::TimedOut)
        } else if status.is_some_and(|s| s.success()) {
            None
        } else {
            Some(FailureKind::NonZeroExit)
        };

        InvocationResult {
            success: failure.is_none(),
            exit_code,
            stdout,
            stderr,
            command_line,
            failure,
        }
    }
}

/// Run `executable` on `file` with an optional style file.
pub fn run_formatter(
    executable: &Path,
    file: &Path,
    style_config: Option<&Path>,
) -> InvocationResult {
    let mut cmd = FormatterCommand::new(executable);
    cmd.style_config = style_config.map(Path::to_path_buf);
    cmd.run(file)
}

/// Wait for exit, killing the child when `timeout` passes. Returns (status, timed_out).
fn wait_child(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<(Option<ExitStatus>, bool)> {
    let Some(timeout) = timeout else {
        return child.wait().map(|s| (Some(s), false));
    };
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((Some(status), false));
        }
        if Instant::now() >= deadline {
            kill_process_tree(child);
            let status = child.wait().ok();
            return Ok((status, true));
        }
        thread::sleep(Duration::from_millis(FormatterConsts::WAIT_POLL_MS));
    }
}

/// Kill the child and, on Unix, every process in its group. Grandchildren would otherwise keep
/// the output pipes open and the readers would never finish.
fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: kill(2) with a negative pid signals the group the child leads.
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut p| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = p.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|b| String::from_utf8_lossy(&b).into_owned())
        .unwrap_or_default()
}
