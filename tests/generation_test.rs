mod common;

use common::{bake_with, options, read, FakeRunner};
use pyskel::context::Toggle;
use pyskel::error::{Error, Result};
use pyskel::generate::{bake, BakeOptions};
use pyskel::prompt::{DefaultPrompter, Prompter};
use pyskel::runner::{StepOutcome, SystemRunner};
use std::cell::RefCell;
use std::time::Duration;
use tempfile::TempDir;

/// Answers with the offered defaults and records every text question.
#[derive(Default)]
struct RecordingPrompter {
    asked: RefCell<Vec<(String, String)>>,
}

impl Prompter for RecordingPrompter {
    fn confirm(&self, _skip: bool, _prompt: String) -> Result<bool> {
        Ok(true)
    }

    fn text(&self, prompt: &str, default: &str) -> Result<String> {
        self.asked.borrow_mut().push((prompt.to_string(), default.to_string()));
        Ok(default.to_string())
    }

    fn select(&self, _prompt: &str, choices: &[String], default: usize) -> Result<String> {
        Ok(choices[default].clone())
    }

    fn toggle(&self, _prompt: &str, default: Toggle) -> Result<Toggle> {
        Ok(default)
    }
}

#[test]
fn test_default_project_generation() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[]);

    assert_eq!(result.exit_code, 0);
    assert!(result.error.is_none());
    let project = result.project_path.unwrap();
    assert_eq!(project, out.path().join("my_awesome_project"));
    assert!(project.is_dir());

    for file in [
        "pyproject.toml",
        "README.md",
        "LICENSE",
        "Makefile",
        "tox.ini",
        ".gitignore",
        ".pre-commit-config.yaml",
        "src/my_awesome_project/__init__.py",
        "src/my_awesome_project/py.typed",
        "tests/test_my_awesome_project.py",
    ] {
        assert!(project.join(file).is_file(), "missing {file}");
    }

    assert!(!project.join("src/my_awesome_project/cli.py").exists());
    assert!(!project.join(".github/workflows/release.yml").exists());
    assert!(!project.join("pyskel.yaml").exists());
    assert!(!out.path().join("pyskel.yaml").exists());
}

#[test]
fn test_project_with_cli() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("use_cli", "yes")]);

    assert_eq!(result.exit_code, 0);
    let project = result.project_path.unwrap();
    let cli = read(&project.join("src/my_awesome_project/cli.py"));
    assert!(cli.contains("import click"));
    assert!(cli.contains("from rich.console import Console"));
    assert!(cli.contains("Hello from My Awesome Project!"));

    let pyproject = read(&project.join("pyproject.toml"));
    assert!(pyproject.contains("[project.scripts]"));
    assert!(pyproject.contains("my_awesome_project = \"my_awesome_project.cli:main\""));
}

#[test]
fn test_project_without_cli() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("use_cli", "no")]);

    assert_eq!(result.exit_code, 0);
    let project = result.project_path.unwrap();
    assert!(!project.join("src/my_awesome_project/cli.py").exists());
    assert!(!read(&project.join("pyproject.toml")).contains("[project.scripts]"));
}

#[test]
fn test_project_with_pypi_publishing() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("publish_to_pypi", "yes")]);

    assert_eq!(result.exit_code, 0);
    let project = result.project_path.unwrap();
    assert!(project.join(".github/workflows/release.yml").is_file());

    let pyproject = read(&project.join("pyproject.toml"));
    assert!(pyproject.contains("keywords = "));
    assert!(pyproject.contains("classifiers = "));
    assert!(pyproject.contains("[project.urls]"));

    let readme = read(&project.join("README.md"));
    assert!(readme.contains("## Publishing"));
    assert!(readme.contains("PyPI"));
}

#[test]
fn test_project_without_pypi_publishing() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[]);

    let project = result.project_path.unwrap();
    assert!(!project.join(".github/workflows/release.yml").exists());
    assert!(!read(&project.join("pyproject.toml")).contains("[project.urls]"));
    assert!(!read(&project.join("README.md")).contains("## Publishing"));
}

#[test]
fn test_all_license_options() {
    let markers = [
        ("MIT", "MIT License"),
        ("BSD-3-Clause", "BSD 3-Clause License"),
        ("Apache-2.0", "Apache License"),
        ("GPL-3.0", "GNU General Public License"),
        ("Not open source", "All rights reserved"),
    ];

    for (license, marker) in markers {
        let out = TempDir::new().unwrap();
        let result = bake_with(out.path(), &[("open_source_license", license)]);
        assert_eq!(result.exit_code, 0, "{license}: {:?}", result.error);

        let content = read(&result.project_path.unwrap().join("LICENSE"));
        assert!(content.contains(marker), "{license} should contain {marker}");
        for (other, other_marker) in markers {
            if other != license {
                assert!(
                    !content.contains(other_marker),
                    "{license} should not contain {other_marker}"
                );
            }
        }
    }
}

#[test]
fn test_python_version_configuration() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("python_version", "3.11"), ("publish_to_pypi", "yes")]);

    assert_eq!(result.exit_code, 0);
    let pyproject = read(&result.project_path.unwrap().join("pyproject.toml"));
    assert!(pyproject.contains(r#"requires-python = ">=3.11""#));
    assert!(pyproject.contains(r#""Programming Language :: Python :: 3.11""#));
}

#[test]
fn test_custom_project_slug() {
    let out = TempDir::new().unwrap();
    let result = bake_with(
        out.path(),
        &[("project_name", "My Test Project"), ("project_slug", "my_test_project")],
    );

    assert_eq!(result.exit_code, 0);
    let project = result.project_path.unwrap();
    assert!(project.join("src/my_test_project").is_dir());
    assert!(project.join("src/my_test_project/__init__.py").is_file());
}

#[test]
fn test_slug_derived_from_project_name() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("project_name", "Data Tools")]);

    assert_eq!(result.exit_code, 0);
    let project = result.project_path.unwrap();
    assert_eq!(project, out.path().join("data_tools"));
    assert!(project.join("src/data_tools/__init__.py").is_file());
}

#[test]
fn test_generated_project_structure() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("project_slug", "test_project")]);

    assert_eq!(result.exit_code, 0);
    let project = result.project_path.unwrap();
    assert!(project.join("src/test_project/__init__.py").is_file());

    let pyproject = read(&project.join("pyproject.toml"));
    assert!(pyproject.contains("[build-system]"));
    assert!(pyproject.contains("hatchling"));
    assert!(pyproject.contains("name = \"test_project\""));
}

#[test]
fn test_makefile_targets() {
    let expected = [
        "help", "install", "dev", "test", "coverage", "lint", "format", "typecheck", "clean",
    ];

    for overrides in [
        vec![],
        vec![("use_cli", "yes"), ("use_claude", "no"), ("publish_to_pypi", "yes")],
    ] {
        let out = TempDir::new().unwrap();
        let result = bake_with(out.path(), &overrides);
        assert_eq!(result.exit_code, 0);

        let makefile = read(&result.project_path.unwrap().join("Makefile"));
        for target in expected {
            assert!(makefile.contains(&format!("\n{target}:")), "missing target {target}");
        }
    }
}

#[test]
fn test_github_actions_workflows() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[]);

    assert_eq!(result.exit_code, 0);
    let workflow = read(&result.project_path.unwrap().join(".github/workflows/tests.yml"));
    assert!(workflow.contains("name: Tests"));
    assert!(workflow.contains("uv sync --group dev"));
    assert!(workflow.contains("${{ matrix.python-version }}"));
}

#[test]
fn test_dependency_groups() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[]);

    assert_eq!(result.exit_code, 0);
    let pyproject = read(&result.project_path.unwrap().join("pyproject.toml"));
    assert!(pyproject.contains("[dependency-groups]"));
    assert!(pyproject.contains("dev = ["));
    assert!(pyproject.contains("test = ["));
    assert!(pyproject.contains("{ include-group = "));
}

#[test]
fn test_project_with_claude() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("use_claude", "yes")]);

    assert_eq!(result.exit_code, 0);
    let claude = read(&result.project_path.unwrap().join("CLAUDE.md"));
    assert!(claude.contains("# CLAUDE.md - Project Context"));
    assert!(claude.contains("My Awesome Project"));
    assert!(claude.contains("uv"));
    assert!(claude.contains("pytest"));
}

#[test]
fn test_project_without_claude() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("use_claude", "no")]);

    assert_eq!(result.exit_code, 0);
    assert!(!result.project_path.unwrap().join("CLAUDE.md").exists());
}

#[test]
fn test_invalid_license_fails_before_writing() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("open_source_license", "WTFPL")]);

    assert_eq!(result.exit_code, 1);
    assert!(result.project_path.is_none());
    match result.error {
        Some(Error::ValidationError { key, allowed, .. }) => {
            assert_eq!(key, "open_source_license");
            assert_eq!(allowed.len(), 5);
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_toggle_value() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("use_cli", "maybe")]);

    assert_eq!(result.exit_code, 1);
    assert!(matches!(result.error, Some(Error::ValidationError { .. })));
}

#[test]
fn test_unknown_option_fails() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("use_clli", "yes")]);

    assert_eq!(result.exit_code, 1);
    match result.error {
        Some(Error::UnknownOptionError { key, .. }) => assert_eq!(key, "use_clli"),
        other => panic!("Expected UnknownOptionError, got {other:?}"),
    }
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_invalid_slug_fails() {
    let out = TempDir::new().unwrap();
    let result = bake_with(out.path(), &[("project_slug", "My Project")]);

    assert_eq!(result.exit_code, 1);
    assert!(matches!(result.error, Some(Error::InvalidValueError { .. })));
}

#[test]
fn test_existing_project_requires_force() {
    let out = TempDir::new().unwrap();
    std::fs::create_dir(out.path().join("my_awesome_project")).unwrap();

    let result = bake_with(out.path(), &[]);
    assert_eq!(result.exit_code, 1);
    assert!(matches!(result.error, Some(Error::OutputDirectoryExistsError { .. })));

    let mut opts = options(out.path());
    opts.force = true;
    let result = bake(&opts, &FakeRunner::default(), &DefaultPrompter);
    assert_eq!(result.exit_code, 0);
}

#[test]
fn test_user_defaults_apply_to_declared_options_only() {
    let out = TempDir::new().unwrap();
    let mut opts = options(out.path());
    opts.user_defaults.insert("full_name".to_string(), "Ada Lovelace".into());
    opts.user_defaults.insert("favourite_editor".to_string(), "vim".into());

    let result = bake(&opts, &FakeRunner::default(), &DefaultPrompter);

    assert_eq!(result.exit_code, 0, "{:?}", result.error);
    let license = read(&result.project_path.unwrap().join("LICENSE"));
    assert!(license.contains("Ada Lovelace"));
}

#[test]
fn test_user_defaults_are_prefilled_in_prompts() {
    let out = TempDir::new().unwrap();
    let mut opts = options(out.path());
    opts.no_input = false;
    opts.user_defaults.insert("full_name".to_string(), "Ada Lovelace".into());
    let prompter = RecordingPrompter::default();

    let result = bake(&opts, &FakeRunner::default(), &prompter);

    assert_eq!(result.exit_code, 0, "{:?}", result.error);
    let asked = prompter.asked.borrow();
    assert!(asked.contains(&("Your full name".to_string(), "Ada Lovelace".to_string())));
    assert!(asked.iter().any(|(prompt, _)| prompt == "Project name"));
    assert!(read(&result.project_path.unwrap().join("LICENSE")).contains("Ada Lovelace"));
}

#[test]
fn test_overrides_are_not_prompted() {
    let out = TempDir::new().unwrap();
    let mut opts = options(out.path()).with("full_name", "Grace Hopper");
    opts.no_input = false;
    let prompter = RecordingPrompter::default();

    let result = bake(&opts, &FakeRunner::default(), &prompter);

    assert_eq!(result.exit_code, 0, "{:?}", result.error);
    assert!(!prompter.asked.borrow().iter().any(|(prompt, _)| prompt == "Your full name"));
}

#[test]
fn test_template_root_files_stay_out_of_output_dir() {
    let template = TempDir::new().unwrap();
    let root = template.path();
    std::fs::write(
        root.join("pyskel.yaml"),
        "questions:\n  project_slug:\n    type: str\n    default: demo\n",
    )
    .unwrap();
    std::fs::write(root.join("README.md"), "# A template\n").unwrap();
    std::fs::write(root.join("LICENSE"), "template license\n").unwrap();
    std::fs::create_dir(root.join("{{ project_slug }}")).unwrap();
    std::fs::write(root.join("{{ project_slug }}/README.md.j2"), "# {{ project_slug }}\n")
        .unwrap();

    let out = TempDir::new().unwrap();
    std::fs::write(out.path().join("README.md"), "my own notes\n").unwrap();

    let opts = BakeOptions::new(root.display().to_string(), out.path());
    let result = bake(&opts, &FakeRunner::default(), &DefaultPrompter);

    assert_eq!(result.exit_code, 0, "{:?}", result.error);
    assert_eq!(read(&out.path().join("README.md")), "my own notes\n");
    assert!(!out.path().join("LICENSE").exists());
    assert_eq!(read(&out.path().join("demo/README.md")), "# demo\n");
}

#[test]
fn test_rendering_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let overrides = [("use_cli", "yes"), ("publish_to_pypi", "yes")];

    let a = bake_with(first.path(), &overrides).project_path.unwrap();
    let b = bake_with(second.path(), &overrides).project_path.unwrap();

    assert!(!dir_diff::is_different(&a, &b).unwrap());
}

#[test]
fn test_hook_report_with_fake_runner() {
    let out = TempDir::new().unwrap();
    let runner = FakeRunner::with_lock_tool();
    let result = bake(&options(out.path()), &runner, &DefaultPrompter);

    assert_eq!(result.exit_code, 0);
    assert_eq!(
        runner.calls(),
        [
            "uv lock",
            "git init",
            "git add .",
            "git commit -m Initial commit from pyskel template",
        ]
    );
    let report = result.report.unwrap();
    assert_eq!(report.lock, StepOutcome::Succeeded);
    assert!(report.pruned.is_empty());
    let text = report.to_string();
    assert!(text.contains("✓ Created uv.lock file"));
    assert!(text.contains("1. cd my_awesome_project"));
    assert!(text.contains("✨ Project 'My Awesome Project' created successfully!"));
}

#[test]
fn test_tool_failures_do_not_change_exit_code() {
    let out = TempDir::new().unwrap();
    let runner = FakeRunner {
        installed: true,
        failing: vec!["uv", "git"],
        ..Default::default()
    };
    let result = bake(&options(out.path()), &runner, &DefaultPrompter);

    assert_eq!(result.exit_code, 0);
    let report = result.report.unwrap();
    assert_eq!(report.lock, StepOutcome::Failed);
    assert_eq!(report.vcs.init, StepOutcome::Failed);
    assert_eq!(runner.calls().len(), 4);
}

#[test]
fn test_generation_with_system_tools() {
    let out = TempDir::new().unwrap();
    let runner = SystemRunner::with_timeout(Duration::from_secs(60));
    let result = bake(&options(out.path()), &runner, &DefaultPrompter);

    assert_eq!(result.exit_code, 0, "{:?}", result.error);
    let project = result.project_path.unwrap();
    let report = result.report.unwrap();
    assert_eq!(report.vcs.init.succeeded(), project.join(".git").is_dir());
}
