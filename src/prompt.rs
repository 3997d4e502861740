//! User input and interaction handling.
//! Options without an override are asked for interactively unless
//! `--no-input` is given.

use crate::context::Toggle;
use crate::error::{Error, Result};
use dialoguer::{Confirm, Input, Select};

/// Source of interactive answers.
pub trait Prompter {
    /// Asks a yes/no question. Returns `true` without asking when `skip` is set.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;

    /// Asks for free text, pre-filled with `default`.
    fn text(&self, prompt: &str, default: &str) -> Result<String>;

    /// Asks to pick one of `choices`, starting at index `default`.
    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<String>;

    /// Asks for a toggle value.
    fn toggle(&self, prompt: &str, default: Toggle) -> Result<Toggle>;
}

/// Terminal prompter built on dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::ConfigError(format!("prompt failed: {e}"))
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Confirm::new().with_prompt(prompt).default(false).interact().map_err(prompt_error)
    }

    fn text(&self, prompt: &str, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .map_err(prompt_error)
    }

    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<String> {
        let selection = Select::new()
            .with_prompt(prompt)
            .default(default)
            .items(choices)
            .interact()
            .map_err(prompt_error)?;

        choices
            .get(selection)
            .cloned()
            .ok_or_else(|| Error::ConfigError(format!("invalid selection {selection}")))
    }

    fn toggle(&self, prompt: &str, default: Toggle) -> Result<Toggle> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default.is_yes())
            .interact()
            .map(Toggle::from)
            .map_err(prompt_error)
    }
}

/// Answers every question with its default and confirms everything.
/// Used for `--no-input` runs and in tests.
#[derive(Debug, Default)]
pub struct DefaultPrompter;

impl Prompter for DefaultPrompter {
    fn confirm(&self, _skip: bool, _prompt: String) -> Result<bool> {
        Ok(true)
    }

    fn text(&self, _prompt: &str, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn select(&self, _prompt: &str, choices: &[String], default: usize) -> Result<String> {
        choices
            .get(default)
            .cloned()
            .ok_or_else(|| Error::ConfigError("no choices to select from".to_string()))
    }

    fn toggle(&self, _prompt: &str, default: Toggle) -> Result<Toggle> {
        Ok(default)
    }
}
