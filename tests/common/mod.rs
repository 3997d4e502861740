#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;

use pyskel::generate::{bake, Bake, BakeOptions};
use pyskel::prompt::DefaultPrompter;
use pyskel::runner::{StepOutcome, ToolRunner};

/// Records every invocation instead of running anything.
#[derive(Default)]
pub struct FakeRunner {
    pub installed: bool,
    pub failing: Vec<&'static str>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn with_lock_tool() -> Self {
        Self { installed: true, ..Default::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ToolRunner for FakeRunner {
    fn is_installed(&self, _program: &str) -> bool {
        self.installed
    }

    fn run(&self, program: &str, args: &[String], _cwd: &Path) -> StepOutcome {
        let call = format!("{program} {}", args.join(" "));
        self.calls.borrow_mut().push(call.clone());
        if self.failing.iter().any(|f| call.starts_with(f)) {
            StepOutcome::Failed
        } else {
            StepOutcome::Succeeded
        }
    }
}

/// Options for the bundled template, writing into `output_dir`.
pub fn options(output_dir: &Path) -> BakeOptions {
    BakeOptions::bundled(output_dir)
}

/// Bakes the bundled template with the given overrides and a fake runner.
pub fn bake_with(output_dir: &Path, overrides: &[(&str, &str)]) -> Bake {
    let mut opts = options(output_dir);
    for (key, value) in overrides {
        opts = opts.with(*key, *value);
    }
    bake(&opts, &FakeRunner::default(), &DefaultPrompter)
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}
