//! Core template processing.
//! Walks the template tree, renders every path and `.j2` file against the
//! context and leaves out paths gated off by a disabled toggle.

use globset::GlobSet;
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Fragment;
use crate::constants::TEMPLATE_SUFFIX;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;

/// Filesystem change produced for one template entry.
#[derive(Debug, PartialEq, Eq)]
pub enum FileOperation {
    CreateDir { target: PathBuf },
    /// Copy the source verbatim
    Copy { target: PathBuf },
    /// Write rendered content
    Write { target: PathBuf, content: String },
}

impl FileOperation {
    pub fn target(&self) -> &Path {
        match self {
            FileOperation::CreateDir { target }
            | FileOperation::Copy { target }
            | FileOperation::Write { target, .. } => target,
        }
    }

    /// Performs the operation, creating parent directories as needed.
    pub fn apply(&self, source: &Path) -> Result<()> {
        match self {
            FileOperation::CreateDir { target } => fs::create_dir_all(target)?,
            FileOperation::Copy { target } => {
                create_parent(target)?;
                fs::copy(source, target)?;
            }
            FileOperation::Write { target, content } => {
                create_parent(target)?;
                fs::write(target, content)?;
            }
        }
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Result of processing one template entry.
#[derive(Debug)]
pub struct ProcessResult {
    pub source: PathBuf,
    /// `None` when the entry is skipped
    pub operation: Option<FileOperation>,
}

/// Returns true for names like `README.md.j2` or `Makefile.j2`, whose
/// contents are rendered.
pub fn is_jinja_template(filename: &str) -> bool {
    filename.strip_suffix(TEMPLATE_SUFFIX).is_some_and(|stem| !stem.is_empty())
}

/// Maps a rendered relative path to its location under `target_dir`,
/// stripping the `.j2` suffix. The flag tells whether contents are rendered.
pub fn resolve_target_path<P: AsRef<Path>>(rendered_path: &str, target_dir: P) -> (PathBuf, bool) {
    let target_dir = target_dir.as_ref();
    let path = Path::new(rendered_path);
    match path.file_name().and_then(|n| n.to_str()) {
        Some(filename) if is_jinja_template(filename) => {
            let new_name = filename.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(filename);
            (target_dir.join(path.with_file_name(new_name)), true)
        }
        _ => (target_dir.join(path), false),
    }
}

/// A rendered path must be relative, non-empty and free of empty or
/// parent segments.
pub fn is_rendered_path_valid(rendered_path: &str) -> bool {
    if rendered_path.trim().is_empty() || rendered_path.contains("//") {
        return false;
    }
    Path::new(rendered_path).components().all(|c| matches!(c, Component::Normal(_)))
}

/// Ensures the output directory is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and `force` is false
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(output_dir.to_path_buf())
}

/// Renders fragment paths whose toggle is off, relative to the output root.
pub fn excluded_paths(
    engine: &dyn TemplateRenderer,
    project_dir: &Path,
    fragments: &[Fragment],
    context: &Context,
) -> Result<Vec<PathBuf>> {
    let json = context.to_json();
    let mut excluded = Vec::new();
    for fragment in fragments {
        if context.toggle(&fragment.toggle)?.is_yes() {
            continue;
        }
        let rendered = engine.render(&fragment.path, &json)?;
        if !is_rendered_path_valid(&rendered) {
            return Err(Error::TemplateError(format!(
                "fragment path '{}' rendered to invalid path '{rendered}'",
                fragment.path
            )));
        }
        excluded.push(project_dir.join(rendered));
    }
    Ok(excluded)
}

pub struct Processor<'a> {
    engine: &'a dyn TemplateRenderer,
    template_root: &'a Path,
    /// Unrendered name of the project directory inside `template_root`
    project_template: &'a str,
    output_root: &'a Path,
    context: serde_json::Value,
    ignored: &'a GlobSet,
    excluded: Vec<PathBuf>,
}

impl<'a> Processor<'a> {
    /// Only the `project_template` entry of `template_root` is rendered;
    /// other top-level entries belong to the template itself.
    ///
    /// # Arguments
    /// * `project_template` - Unrendered project directory name, e.g. `{{ project_slug }}`
    /// * `output_root` - Directory the project directory is rendered into
    /// * `excluded` - Rendered relative paths to leave out, see [`excluded_paths`]
    pub fn new(
        engine: &'a dyn TemplateRenderer,
        template_root: &'a Path,
        project_template: &'a str,
        output_root: &'a Path,
        context: &Context,
        ignored: &'a GlobSet,
        excluded: Vec<PathBuf>,
    ) -> Self {
        Self {
            engine,
            template_root,
            project_template,
            output_root,
            context: context.to_json(),
            ignored,
            excluded,
        }
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.excluded.iter().any(|ex| relative.starts_with(ex))
    }

    /// Decides what to do with a single template entry.
    pub fn process(&self, template_entry: &Path) -> Result<ProcessResult> {
        let source = template_entry.to_path_buf();
        let skip = || -> Result<ProcessResult> {
            Ok(ProcessResult { source: source.clone(), operation: None })
        };

        let relative = template_entry
            .strip_prefix(self.template_root)
            .map_err(|e| Error::TemplateError(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            return skip();
        }
        if !relative.starts_with(self.project_template) {
            debug!("Skipping {}: outside the project directory", relative.display());
            return skip();
        }
        let relative = relative.to_str().ok_or_else(|| {
            Error::TemplateError(format!("non UTF-8 path: {}", template_entry.display()))
        })?;

        if self.ignored.is_match(relative) {
            debug!("Skipping ignored path {relative}");
            return skip();
        }

        let rendered = self.engine.render(relative, &self.context)?;
        if !is_rendered_path_valid(&rendered) {
            debug!("Skipping {relative}: rendered path '{rendered}' is empty or invalid");
            return skip();
        }

        let (target, is_template) = resolve_target_path(&rendered, self.output_root);
        let target_relative = target.strip_prefix(self.output_root).unwrap_or(&target);
        if self.is_excluded(target_relative) {
            debug!("Skipping {relative}: gated off by a disabled toggle");
            return skip();
        }

        let operation = if template_entry.is_dir() {
            FileOperation::CreateDir { target }
        } else if is_template {
            debug!("Writing file: {}", target.display());
            let content = fs::read_to_string(template_entry)?;
            let content = self.engine.render(&content, &self.context)?;
            FileOperation::Write { target, content }
        } else {
            debug!("Copying file: {}", target.display());
            FileOperation::Copy { target }
        };

        Ok(ProcessResult { source, operation: Some(operation) })
    }

    /// Renders the project directory of the template into the output root.
    ///
    /// Entries are visited in file name order so repeated runs produce the
    /// same tree. Returns the written targets.
    pub fn render_tree(&self) -> Result<Vec<PathBuf>> {
        let project_root = self.template_root.join(self.project_template);
        if !project_root.is_dir() {
            return Err(Error::TemplateError(format!(
                "template has no '{}' directory to generate",
                self.project_template
            )));
        }
        let mut written = Vec::new();
        for entry in WalkDir::new(project_root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::TemplateError(e.to_string()))?;
            let result = self.process(entry.path())?;
            if let Some(operation) = result.operation {
                operation.apply(&result.source)?;
                written.push(operation.target().to_path_buf());
            }
        }
        Ok(written)
    }
}
