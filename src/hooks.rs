//! Template-supplied hook scripts.
//! A template may ship executable `hooks/pre_gen_project` and
//! `hooks/post_gen_project` scripts. They receive the template directory,
//! output directory and resolved context as JSON on stdin.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Document written to a hook script's stdin.
#[derive(Serialize)]
pub struct Output<'a> {
    pub template_dir: &'a str,
    pub output_dir: &'a str,
    pub context: &'a serde_json::Value,
}

/// Returns the paths of the pre and post generation scripts.
pub fn get_hook_files<P: AsRef<Path>>(template_dir: P) -> (PathBuf, PathBuf) {
    let hooks_dir = template_dir.as_ref().join("hooks");
    (hooks_dir.join("pre_gen_project"), hooks_dir.join("post_gen_project"))
}

/// Asks before running template scripts, unless there are none or the
/// check is skipped.
pub fn confirm_hook_execution<P: AsRef<Path>>(
    prompt: &dyn Prompter,
    template_dir: P,
    skip_hooks_check: bool,
) -> Result<bool> {
    let (pre_hook, post_hook) = get_hook_files(template_dir);
    if !pre_hook.exists() && !post_hook.exists() {
        return Ok(false);
    }
    prompt.confirm(
        skip_hooks_check,
        "WARNING: This template contains hooks that will execute commands on your system. Do you want to run these hooks?".to_string(),
    )
}

/// Runs a hook script and waits for it.
///
/// # Errors
/// * `Error::HookError` if the script cannot be started or exits unsuccessfully
pub fn run_hook<P: AsRef<Path>>(
    template_dir: P,
    output_dir: P,
    script_path: &Path,
    context: &serde_json::Value,
) -> Result<()> {
    let template_dir = template_dir.as_ref().display().to_string();
    let output_dir = output_dir.as_ref();
    let output = Output {
        template_dir: &template_dir,
        output_dir: &output_dir.display().to_string(),
        context,
    };
    let payload = serde_json::to_vec(&output)
        .map_err(|e| Error::HookError(format!("cannot serialize hook input: {e}")))?;

    log::debug!("Running hook {}", script_path.display());
    let mut child = Command::new(script_path)
        .current_dir(output_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| Error::HookError(format!("{}: {e}", script_path.display())))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&payload)?;
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(Error::HookError(format!(
            "{} failed with status: {status}",
            script_path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::DefaultPrompter;
    use tempfile::TempDir;

    #[test]
    fn test_get_hook_files() {
        let temp_dir = TempDir::new().unwrap();
        let (pre_hook, post_hook) = get_hook_files(temp_dir.path());

        assert_eq!(pre_hook, temp_dir.path().join("hooks/pre_gen_project"));
        assert_eq!(post_hook, temp_dir.path().join("hooks/post_gen_project"));
    }

    #[test]
    fn test_no_hooks_means_nothing_to_confirm() {
        let temp_dir = TempDir::new().unwrap();

        assert!(!confirm_hook_execution(&DefaultPrompter, temp_dir.path(), true).unwrap());
    }

    #[test]
    fn test_output_serialization() {
        let output = Output {
            template_dir: "/path/to/template",
            output_dir: "/path/to/output",
            context: &serde_json::json!({"key": "value"}),
        };

        let serialized = serde_json::to_string(&output).unwrap();
        assert!(serialized.contains("template_dir"));
        assert!(serialized.contains("output_dir"));
        assert!(serialized.contains("\"key\":\"value\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_hook_receives_context() {
        use std::os::unix::fs::PermissionsExt;

        let template = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let script = template.path().join("post_gen_project");
        std::fs::write(&script, "#!/bin/sh\ncat > hook_input.json\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let context = serde_json::json!({"project_slug": "demo"});
        run_hook(template.path(), output.path(), &script, &context).unwrap();

        let input = std::fs::read_to_string(output.path().join("hook_input.json")).unwrap();
        assert!(input.contains("\"project_slug\":\"demo\""));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_hook_is_an_error() {
        use std::os::unix::fs::PermissionsExt;

        let template = TempDir::new().unwrap();
        let script = template.path().join("pre_gen_project");
        std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = run_hook(template.path(), template.path(), &script, &serde_json::json!({}));
        assert!(matches!(result, Err(Error::HookError(_))));
    }
}
