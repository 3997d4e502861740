//! External tool invocation for the post-generation hook.
//! Every call degrades to a [`StepOutcome`]; nothing here returns an error.

use log::{debug, warn};
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Result of one optional external step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tool is not installed or the step was not attempted
    Unavailable,
    /// The tool ran and exited unsuccessfully, or timed out
    Failed,
    Succeeded,
}

impl StepOutcome {
    pub fn succeeded(self) -> bool {
        self == StepOutcome::Succeeded
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepOutcome::Unavailable => "unavailable",
            StepOutcome::Failed => "failed",
            StepOutcome::Succeeded => "succeeded",
        };
        f.write_str(s)
    }
}

/// Seam between the hook and the host's executables.
pub trait ToolRunner {
    /// Whether `program` can be found on the search path.
    fn is_installed(&self, program: &str) -> bool;

    /// Runs `program` with `args` in `cwd` and waits for it.
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> StepOutcome;
}

/// Runs tools as child processes of the current process.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

const POLL_INTERVAL: Duration = Duration::from_millis(50);

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kills a tool that runs longer than `timeout` and reports it as failed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }
}

impl ToolRunner for SystemRunner {
    fn is_installed(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[String], cwd: &Path) -> StepOutcome {
        debug!("Running '{} {}' in {}", program, args.join(" "), cwd.display());

        let mut child = match Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("'{program}' is not installed");
                return StepOutcome::Unavailable;
            }
            Err(e) => {
                warn!("Failed to start '{program}': {e}");
                return StepOutcome::Failed;
            }
        };

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to wait for '{program}': {e}");
                    return StepOutcome::Failed;
                }
            }
            if self.timeout.is_some_and(|limit| started.elapsed() >= limit) {
                warn!("'{program}' timed out, killing it");
                let _ = child.kill();
                let _ = child.wait();
                return StepOutcome::Failed;
            }
            thread::sleep(POLL_INTERVAL);
        };

        if status.success() {
            StepOutcome::Succeeded
        } else {
            warn!("'{} {}' exited with {}", program, args.join(" "), status);
            StepOutcome::Failed
        }
    }
}
