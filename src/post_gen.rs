//! Built-in post-generation hook.
//!
//! Runs once after the tree is rendered: prunes paths of disabled toggles,
//! generates the dependency lock file when the lock tool is installed,
//! bootstraps a git repository with one commit and builds the status report.
//! External tools are best effort; their failures only show up in the report.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{Bootstrap, Fragment};
use crate::context::Context;
use crate::error::Result;
use crate::processor::excluded_paths;
use crate::renderer::TemplateRenderer;
use crate::runner::{StepOutcome, ToolRunner};

const GIT: &str = "git";

/// Outcomes of the three version-control steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsOutcome {
    pub init: StepOutcome,
    pub add: StepOutcome,
    pub commit: StepOutcome,
}

/// What the hook did, plus the human-readable status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    /// Paths removed while pruning, relative to the project root
    pub pruned: Vec<PathBuf>,
    pub lock_tool_installed: bool,
    pub lock: StepOutcome,
    pub vcs: VcsOutcome,
    pub lines: Vec<String>,
}

impl fmt::Display for HookReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Removes a file or directory. Returns whether anything was removed.
pub fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

pub struct PostGenHook<'a> {
    engine: &'a dyn TemplateRenderer,
    runner: &'a dyn ToolRunner,
    fragments: &'a [Fragment],
    bootstrap: &'a Bootstrap,
}

impl<'a> PostGenHook<'a> {
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        runner: &'a dyn ToolRunner,
        fragments: &'a [Fragment],
        bootstrap: &'a Bootstrap,
    ) -> Self {
        Self { engine, runner, fragments, bootstrap }
    }

    /// Runs all steps against the rendered project at `project_root`.
    ///
    /// # Errors
    /// Only a context that lacks a toggle or key referenced by a fragment
    /// path or status message, and IO errors while pruning, are fatal.
    pub fn run(&self, project_root: &Path, context: &Context) -> Result<HookReport> {
        let pruned = self.prune(project_root, context)?;

        let lock_tool = self.bootstrap.lock.as_ref();
        let lock_tool_installed =
            lock_tool.is_some_and(|tool| self.runner.is_installed(&tool.program));

        let lock = match lock_tool {
            Some(tool) if lock_tool_installed => {
                self.runner.run(&tool.program, &tool.args, project_root)
            }
            _ => StepOutcome::Unavailable,
        };

        let vcs = self.bootstrap_vcs(project_root);

        let mut report = HookReport { pruned, lock_tool_installed, lock, vcs, lines: Vec::new() };
        report.lines = self.status_lines(&report, context)?;
        Ok(report)
    }

    /// Removes the paths of every fragment whose toggle is off.
    fn prune(&self, project_root: &Path, context: &Context) -> Result<Vec<PathBuf>> {
        let mut pruned = Vec::new();
        for relative in excluded_paths(self.engine, Path::new(""), self.fragments, context)? {
            if remove_path(&project_root.join(&relative))? {
                debug!("Pruned {}", relative.display());
                pruned.push(relative);
            }
        }
        Ok(pruned)
    }

    /// Each step is attempted even when the previous one failed.
    fn bootstrap_vcs(&self, project_root: &Path) -> VcsOutcome {
        let init = self.runner.run(GIT, &["init".to_string()], project_root);
        let add = self.runner.run(GIT, &["add".to_string(), ".".to_string()], project_root);
        let commit = self.runner.run(
            GIT,
            &["commit".to_string(), "-m".to_string(), self.bootstrap.commit_message.clone()],
            project_root,
        );
        VcsOutcome { init, add, commit }
    }

    fn status_lines(&self, report: &HookReport, context: &Context) -> Result<Vec<String>> {
        let json = context.to_json();
        let mut lines = vec![String::new()];

        if let Some(tool) = &self.bootstrap.lock {
            if report.lock_tool_installed {
                lines.push(format!("✓ {} is installed", tool.program));
            }
            let artifact = tool.artifact.as_deref().unwrap_or("lock file");
            match report.lock {
                StepOutcome::Succeeded => lines.push(format!("✓ Created {artifact}")),
                StepOutcome::Failed => lines.push(format!("⚠ Could not create {artifact}")),
                StepOutcome::Unavailable => {}
            }
        }

        if report.vcs.init.succeeded() {
            lines.push("✓ Initialized git repository".to_string());
            if report.vcs.commit.succeeded() {
                lines.push("✓ Created initial commit".to_string());
            } else {
                lines.push("⚠ Could not create the initial commit".to_string());
            }
        } else {
            lines.push("⚠ Could not initialize a git repository".to_string());
        }

        if let Some(tool) = &self.bootstrap.lock {
            lines.push(String::new());
            if report.lock_tool_installed {
                lines.push("Next steps:".to_string());
                for (i, step) in self.bootstrap.next_steps.iter().enumerate() {
                    lines.push(format!("{}. {}", i + 1, self.engine.render(step, &json)?));
                }
            } else {
                lines.push(format!("⚠ {} is not installed", tool.program));
                for hint in &self.bootstrap.install_hint {
                    lines.push(self.engine.render(hint, &json)?);
                }
            }
        }

        lines.push(String::new());
        lines.push(format!("✨ {}", self.engine.render(&self.bootstrap.banner, &json)?));
        Ok(lines)
    }
}
