//! Configuration handling for pyskel templates.
//! Loads the template schema (questions, toggle-gated fragments and
//! post-generation bootstrap settings) and the optional user defaults file.

use crate::constants::CONFIG_FILES;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Kind of value a question produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ValueType {
    /// Free text, or a closed set of strings when `choices` is non-empty
    #[serde(rename = "str")]
    Str,
    /// A yes/no feature toggle
    #[serde(rename = "toggle", alias = "bool")]
    Toggle,
}

/// A single declared template option.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub help: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Default answer. Strings are templates rendered against the answers
    /// resolved so far.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub choices: Vec<String>,
    /// Regular expression a text answer must match
    #[serde(default)]
    pub validation: Option<String>,
    #[serde(default)]
    pub validation_message: Option<String>,
}

impl Question {
    pub fn is_choice(&self) -> bool {
        self.value_type == ValueType::Str && !self.choices.is_empty()
    }
}

/// A project-relative path that only exists when `toggle` is `yes`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fragment {
    /// Path template, e.g. `src/{{ project_slug }}/cli.py`
    pub path: String,
    pub toggle: String,
}

/// External command run by the post-generation hook.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// File the command is expected to produce, used in status output
    #[serde(default)]
    pub artifact: Option<String>,
}

/// Settings of the built-in post-generation hook.
#[derive(Debug, Clone, Deserialize)]
pub struct Bootstrap {
    /// Dependency lock generator, probed on PATH before running
    #[serde(default)]
    pub lock: Option<ToolCommand>,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Lines printed when the lock tool is installed; rendered templates
    #[serde(default)]
    pub next_steps: Vec<String>,
    /// Lines printed when the lock tool is missing
    #[serde(default)]
    pub install_hint: Vec<String>,
    /// Final banner; a rendered template
    #[serde(default = "default_banner")]
    pub banner: String,
}

fn default_commit_message() -> String {
    "Initial commit".to_string()
}

fn default_banner() -> String {
    "Project '{{ project_slug }}' created successfully!".to_string()
}

fn default_project_dir() -> String {
    "{{ project_slug }}".to_string()
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self {
            lock: None,
            commit_message: default_commit_message(),
            next_steps: Vec::new(),
            install_hint: Vec::new(),
            banner: default_banner(),
        }
    }
}

/// Parsed template schema.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name of the generated project root, relative to the output directory
    #[serde(default = "default_project_dir")]
    pub project_dir: String,
    pub questions: IndexMap<String, Question>,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
    #[serde(default)]
    pub bootstrap: Bootstrap,
}

impl Config {
    /// Checks the schema for internal consistency.
    ///
    /// # Errors
    /// * `Error::ConfigError` if a choice default is not one of its choices,
    ///   a toggle default is not yes/no, a validation pattern does not
    ///   compile, or a fragment refers to something other than a toggle
    pub fn validate(&self) -> Result<()> {
        for (key, question) in &self.questions {
            if question.is_choice() {
                if let Some(default) = question.default.as_ref().and_then(|d| d.as_str()) {
                    if !question.choices.iter().any(|c| c == default) {
                        return Err(Error::ConfigError(format!(
                            "default '{default}' of '{key}' is not one of its choices"
                        )));
                    }
                }
            }
            if question.value_type == ValueType::Toggle {
                if let Some(default) = &question.default {
                    crate::context::Toggle::from_json(default).ok_or_else(|| {
                        Error::ConfigError(format!(
                            "default of toggle '{key}' must be \"yes\" or \"no\""
                        ))
                    })?;
                }
            }
            if let Some(pattern) = &question.validation {
                regex::Regex::new(pattern).map_err(|e| {
                    Error::ConfigError(format!("invalid validation pattern for '{key}': {e}"))
                })?;
            }
        }

        for fragment in &self.fragments {
            match self.questions.get(&fragment.toggle) {
                Some(q) if q.value_type == ValueType::Toggle => {}
                _ => {
                    return Err(Error::ConfigError(format!(
                        "fragment '{}' is gated on '{}', which is not a declared toggle",
                        fragment.path, fragment.toggle
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Loads the raw schema from a template directory, trying multiple file formats.
///
/// # Errors
/// * `Error::ConfigError` if no schema file exists
pub fn load_config<P: AsRef<Path>>(template_dir: P, config_files: &[&str]) -> Result<String> {
    for file in config_files {
        let config_path = template_dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Ok(std::fs::read_to_string(&config_path)?);
        }
    }

    Err(Error::ConfigError(format!(
        "No configuration file found (tried: {})",
        config_files.join(", ")
    )))
}

/// Parses schema content. JSON is tried first, then YAML.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = match serde_json::from_str(content) {
        Ok(config) => config,
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}")))?,
    };
    config.validate()?;
    Ok(config)
}

/// Loads, parses and validates the schema of the template at `template_root`.
pub fn get_config<P: AsRef<Path>>(template_root: P) -> Result<Config> {
    let content = load_config(template_root, &CONFIG_FILES)?;
    parse_config(&content)
}

#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    default_context: IndexMap<String, serde_json::Value>,
}

/// Reads the `default_context` section of a user defaults file.
///
/// A missing `path` yields an empty mapping; a path that does not exist is
/// an error since the user asked for it explicitly.
pub fn load_user_defaults(path: Option<&Path>) -> Result<IndexMap<String, serde_json::Value>> {
    let Some(path) = path else {
        return Ok(IndexMap::new());
    };
    if !path.is_file() {
        return Err(Error::ConfigError(format!(
            "user config '{}' does not exist",
            path.display()
        )));
    }
    debug!("Loading user defaults from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let user_config: UserConfig = serde_yaml::from_str(&content)
        .map_err(|e| Error::ConfigError(format!("Invalid user config: {e}")))?;
    Ok(user_config.default_context)
}
