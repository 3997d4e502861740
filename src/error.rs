//! Error handling for pyskel.
//! Defines the error type and result alias used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for pyskel operations.
///
/// Everything here is fatal for a generation run. Failures of optional
/// external tools inside the post-generation hook are not errors; they are
/// reported as [`crate::runner::StepOutcome`] values instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors raised by the MiniJinja engine, such as a
    /// placeholder without a matching context key
    #[error("Template error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Represents errors in the template schema or the user defaults file
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// An override names an option the template does not declare
    #[error("Unknown option '{key}' (declared options: {known}).")]
    UnknownOptionError { key: String, known: String },

    /// A choice or toggle option got a value outside its enumeration
    #[error("Validation error: '{value}' is not a valid value for '{key}' (allowed: {}).", allowed.join(", "))]
    ValidationError { key: String, value: String, allowed: Vec<String> },

    /// A text option failed its declared validation pattern
    #[error("Validation error: '{value}' is not a valid value for '{key}': {message}.")]
    InvalidValueError { key: String, value: String, message: String },

    /// Represents errors that occur during hook script execution
    #[error("Hook execution error: {0}.")]
    HookError(String),

    /// Represents errors in processing .pyskelignore files
    #[error("Ignore file error: {0}.")]
    IgnoreError(String),

    /// Represents errors while cloning a git template
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
