//! Generation pipeline.
//! Ties together template loading, context resolution, rendering and the
//! post-generation hook.

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use log::debug;

use crate::bundled::{extract_bundled_template, BUNDLED_TEMPLATE};
use crate::config::{get_config, Config};
use crate::context::{resolve_context, Context};
use crate::error::{Error, Result};
use crate::hooks::{confirm_hook_execution, get_hook_files, run_hook};
use crate::ignore::parse_ignore_file;
use crate::loader::load_template;
use crate::post_gen::{HookReport, PostGenHook};
use crate::processor::{ensure_output_dir, excluded_paths, is_rendered_path_valid, Processor};
use crate::prompt::Prompter;
use crate::renderer::{MiniJinjaRenderer, TemplateRenderer};
use crate::runner::ToolRunner;

/// Inputs of one generation run.
#[derive(Debug, Clone, Default)]
pub struct BakeOptions {
    /// Local path or git URL of the template; `None` uses the bundled one
    pub template: Option<String>,
    /// Directory the project directory is created in
    pub output_dir: PathBuf,
    /// Caller-supplied option values; every key must be declared
    pub overrides: IndexMap<String, serde_json::Value>,
    /// Defaults from the user config file. They replace the declared
    /// defaults, so they still show up pre-filled in prompts. Keys the
    /// template does not declare are ignored.
    pub user_defaults: IndexMap<String, serde_json::Value>,
    /// Use defaults instead of prompting
    pub no_input: bool,
    pub force: bool,
    pub skip_hooks_check: bool,
    pub skip_overwrite_check: bool,
}

impl BakeOptions {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(template: S, output_dir: P) -> Self {
        Self { template: Some(template.into()), ..Self::bundled(output_dir) }
    }

    /// Non-interactive options for the bundled template.
    pub fn bundled<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self { output_dir: output_dir.into(), no_input: true, ..Default::default() }
    }

    /// Adds an override.
    pub fn with<K: Into<String>, V: Into<serde_json::Value>>(mut self, key: K, value: V) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

/// A successfully generated project.
#[derive(Debug)]
pub struct Generated {
    pub project_path: PathBuf,
    pub context: Context,
    pub report: HookReport,
}

/// Outcome of [`bake`], shaped for callers that only care about the exit code.
#[derive(Debug)]
pub struct Bake {
    pub exit_code: i32,
    pub project_path: Option<PathBuf>,
    pub error: Option<Error>,
    pub report: Option<HookReport>,
}

/// Replaces declared defaults with the user's. Undeclared keys are ignored.
fn apply_user_defaults(config: &mut Config, user_defaults: &IndexMap<String, serde_json::Value>) {
    for (key, value) in user_defaults {
        if let Some(question) = config.questions.get_mut(key) {
            question.default = Some(value.clone());
        }
    }
}

fn project_dir(engine: &dyn TemplateRenderer, config: &Config, context: &Context) -> Result<PathBuf> {
    let rendered = engine.render(&config.project_dir, &context.to_json())?;
    if !is_rendered_path_valid(&rendered) {
        return Err(Error::TemplateError(format!(
            "project directory '{}' rendered to invalid path '{rendered}'",
            config.project_dir
        )));
    }
    Ok(PathBuf::from(rendered))
}

/// Generates a project.
///
/// Validation happens before anything is written: unknown options,
/// invalid values and an existing project directory (without `force`) fail
/// with an untouched output directory.
///
/// # Flow
/// 1. Loads the template and its schema
/// 2. Resolves the context
/// 3. Runs the template's pre-generation script, if any
/// 4. Renders the tree, leaving out fragments of disabled toggles
/// 5. Runs the template's post-generation script, if any
/// 6. Runs the built-in post-generation hook
pub fn generate(
    options: &BakeOptions,
    runner: &dyn ToolRunner,
    prompter: &dyn Prompter,
) -> Result<Generated> {
    let engine = MiniJinjaRenderer::new();

    let skip_overwrite_check = options.skip_overwrite_check || options.no_input;
    let bundled;
    let template_root = match &options.template {
        Some(template) => load_template(prompter, template, skip_overwrite_check)?,
        None => {
            println!("Using the bundled {BUNDLED_TEMPLATE} template");
            bundled = extract_bundled_template()?;
            bundled.path().to_path_buf()
        }
    };
    let mut config = get_config(&template_root)?;
    apply_user_defaults(&mut config, &options.user_defaults);

    let interactive = (!options.no_input).then_some(prompter);
    let context = resolve_context(&engine, &config.questions, &options.overrides, interactive)?;
    let json = context.to_json();

    let project_dir = project_dir(&engine, &config, &context)?;
    let project_path = ensure_output_dir(options.output_dir.join(&project_dir), options.force)?;

    let skip_hooks_check = options.skip_hooks_check || options.no_input;
    let execute_hooks = confirm_hook_execution(prompter, &template_root, skip_hooks_check)?;
    let (pre_hook_file, post_hook_file) = get_hook_files(&template_root);

    fs::create_dir_all(&options.output_dir)?;

    if execute_hooks && pre_hook_file.exists() {
        run_hook(template_root.as_path(), options.output_dir.as_path(), &pre_hook_file, &json)?;
    }

    let ignored = parse_ignore_file(&template_root)?;
    let excluded = excluded_paths(&engine, &project_dir, &config.fragments, &context)?;
    let processor = Processor::new(
        &engine,
        &template_root,
        &config.project_dir,
        &options.output_dir,
        &context,
        &ignored,
        excluded,
    );
    for target in processor.render_tree()? {
        debug!("Generated '{}'", target.display());
    }

    if !project_path.is_dir() {
        return Err(Error::TemplateError(format!(
            "template has no '{}' directory to generate",
            config.project_dir
        )));
    }

    if execute_hooks && post_hook_file.exists() {
        run_hook(template_root.as_path(), project_path.as_path(), &post_hook_file, &json)?;
    }

    let hook = PostGenHook::new(&engine, runner, &config.fragments, &config.bootstrap);
    let report = hook.run(&project_path, &context)?;

    Ok(Generated { project_path, context, report })
}

/// Runs [`generate`] and folds the result into an exit code.
pub fn bake(options: &BakeOptions, runner: &dyn ToolRunner, prompter: &dyn Prompter) -> Bake {
    match generate(options, runner, prompter) {
        Ok(generated) => Bake {
            exit_code: 0,
            project_path: Some(generated.project_path),
            error: None,
            report: Some(generated.report),
        },
        Err(error) => Bake { exit_code: 1, project_path: None, error: Some(error), report: None },
    }
}
