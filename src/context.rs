//! Context resolution.
//! Merges caller overrides with the defaults declared in the template schema
//! into one validated, immutable [`Context`].

use crate::config::{Question, ValueType};
use crate::constants::TOGGLE_VALUES;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::debug;
use regex::Regex;
use std::fmt;

/// A yes/no feature switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Yes,
    No,
}

impl Toggle {
    /// Parses `"yes"`/`"no"`. Anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Toggle::Yes),
            "no" => Some(Toggle::No),
            _ => None,
        }
    }

    /// Accepts the two strings above as well as JSON booleans.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Toggle::from(*b)),
            serde_json::Value::String(s) => Toggle::parse(s),
            _ => None,
        }
    }

    pub fn is_yes(self) -> bool {
        self == Toggle::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Toggle::Yes => "yes",
            Toggle::No => "no",
        }
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value {
            Toggle::Yes
        } else {
            Toggle::No
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// Member of the question's declared choices
    Choice(String),
    Toggle(Toggle),
}

impl Value {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Text(s) | Value::Choice(s) => serde_json::Value::String(s.clone()),
            Value::Toggle(t) => serde_json::Value::Bool(t.is_yes()),
        }
    }
}

/// Fully resolved option values for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: IndexMap<String, Value>,
}

impl Context {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the toggle stored under `key`.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the key is missing or not a toggle
    pub fn toggle(&self, key: &str) -> Result<Toggle> {
        match self.values.get(key) {
            Some(Value::Toggle(t)) => Ok(*t),
            Some(_) => Err(Error::ConfigError(format!("option '{key}' is not a toggle"))),
            None => Err(Error::ConfigError(format!("option '{key}' is missing from the context"))),
        }
    }

    /// Returns the string value stored under `key`.
    pub fn text(&self, key: &str) -> Result<&str> {
        match self.values.get(key) {
            Some(Value::Text(s)) | Some(Value::Choice(s)) => Ok(s),
            Some(Value::Toggle(_)) => {
                Err(Error::ConfigError(format!("option '{key}' is a toggle, not text")))
            }
            None => Err(Error::ConfigError(format!("option '{key}' is missing from the context"))),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// JSON view handed to the template engine and hook scripts.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self.values.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
        serde_json::Value::Object(map)
    }
}

fn json_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn check_choice(key: &str, question: &Question, value: String) -> Result<Value> {
    if question.choices.contains(&value) {
        Ok(Value::Choice(value))
    } else {
        Err(Error::ValidationError {
            key: key.to_string(),
            value,
            allowed: question.choices.clone(),
        })
    }
}

fn check_text(key: &str, question: &Question, value: String) -> Result<Value> {
    if let Some(pattern) = &question.validation {
        let re = Regex::new(pattern).map_err(|e| {
            Error::ConfigError(format!("invalid validation pattern for '{key}': {e}"))
        })?;
        if !re.is_match(&value) {
            let message = question
                .validation_message
                .clone()
                .unwrap_or_else(|| format!("must match {pattern}"));
            return Err(Error::InvalidValueError { key: key.to_string(), value, message });
        }
    }
    Ok(Value::Text(value))
}

fn check_toggle(key: &str, value: &serde_json::Value) -> Result<Value> {
    Toggle::from_json(value).map(Value::Toggle).ok_or_else(|| Error::ValidationError {
        key: key.to_string(),
        value: json_to_text(value),
        allowed: TOGGLE_VALUES.iter().map(|s| s.to_string()).collect(),
    })
}

/// Validates a caller-supplied value against its question.
fn coerce(key: &str, question: &Question, raw: &serde_json::Value) -> Result<Value> {
    match question.value_type {
        ValueType::Toggle => check_toggle(key, raw),
        ValueType::Str if question.is_choice() => check_choice(key, question, json_to_text(raw)),
        ValueType::Str => check_text(key, question, json_to_text(raw)),
    }
}

/// Computes the declared default, rendering string defaults against the
/// answers resolved so far.
fn default_value(
    question: &Question,
    engine: &dyn TemplateRenderer,
    current: &serde_json::Value,
) -> Result<serde_json::Value> {
    match (&question.default, question.value_type) {
        (Some(serde_json::Value::String(s)), ValueType::Str) => {
            Ok(serde_json::Value::String(engine.render(s, current)?))
        }
        (Some(value), _) => Ok(value.clone()),
        (None, ValueType::Toggle) => Ok(serde_json::Value::Bool(false)),
        (None, ValueType::Str) => Ok(serde_json::Value::String(
            question.choices.first().cloned().unwrap_or_default(),
        )),
    }
}

fn ask(
    prompter: &dyn Prompter,
    key: &str,
    question: &Question,
    default: &serde_json::Value,
    engine: &dyn TemplateRenderer,
    current: &serde_json::Value,
) -> Result<serde_json::Value> {
    let help = if question.help.is_empty() {
        key.to_string()
    } else {
        engine.render(&question.help, current).unwrap_or_else(|_| question.help.clone())
    };

    let answer = match question.value_type {
        ValueType::Toggle => {
            let default = Toggle::from_json(default).unwrap_or(Toggle::No);
            serde_json::Value::String(prompter.toggle(&help, default)?.to_string())
        }
        ValueType::Str if question.is_choice() => {
            let default_str = json_to_text(default);
            let index = question.choices.iter().position(|c| *c == default_str).unwrap_or(0);
            serde_json::Value::String(prompter.select(&help, &question.choices, index)?)
        }
        ValueType::Str => serde_json::Value::String(prompter.text(&help, &json_to_text(default))?),
    };
    Ok(answer)
}

/// Builds the context for one generation run.
///
/// # Arguments
/// * `engine` - Renderer used for templated defaults and prompt texts
/// * `questions` - Declared options, resolved in declaration order
/// * `overrides` - Caller-supplied values; every key must be declared
/// * `prompter` - When present, options without an override are asked for
///
/// # Errors
/// * `Error::UnknownOptionError` for an override key the schema does not declare
/// * `Error::ValidationError` for a choice or toggle value outside its enumeration
/// * `Error::InvalidValueError` for text failing its validation pattern
/// * `Error::MinijinjaError` if a templated default cannot be rendered
pub fn resolve_context(
    engine: &dyn TemplateRenderer,
    questions: &IndexMap<String, Question>,
    overrides: &IndexMap<String, serde_json::Value>,
    prompter: Option<&dyn Prompter>,
) -> Result<Context> {
    if let Some(key) = overrides.keys().find(|k| !questions.contains_key(*k)) {
        return Err(Error::UnknownOptionError {
            key: key.clone(),
            known: questions.keys().cloned().collect::<Vec<_>>().join(", "),
        });
    }

    let mut context = Context::default();
    for (key, question) in questions {
        let current = context.to_json();
        let raw = match overrides.get(key) {
            Some(value) => {
                debug!("Using provided value for '{key}'");
                value.clone()
            }
            None => {
                let default = default_value(question, engine, &current)?;
                match prompter {
                    Some(prompter) => ask(prompter, key, question, &default, engine, &current)?,
                    None => default,
                }
            }
        };
        let value = coerce(key, question, &raw)?;
        context.values.insert(key.clone(), value);
    }

    Ok(context)
}

/// Parses `KEY=VALUE` command-line pairs into an override mapping.
pub fn parse_overrides<S: AsRef<str>>(pairs: &[S]) -> Result<IndexMap<String, serde_json::Value>> {
    let mut overrides = IndexMap::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            Error::ConfigError(format!("expected KEY=VALUE, got '{pair}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::ConfigError(format!("empty option name in '{pair}'")));
        }
        overrides.insert(key.to_string(), serde_json::Value::String(value.to_string()));
    }
    Ok(overrides)
}
