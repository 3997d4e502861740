//! pyskel generates Python project skeletons from parameterized templates.
//! It resolves template options, renders the template tree and runs a
//! post-generation hook that prunes disabled features and bootstraps
//! version control.

/// The template embedded in the binary
pub mod bundled;

/// Command-line interface module
pub mod cli;

/// Template schema and user defaults
/// Supports YAML and JSON formats (pyskel.yaml, pyskel.yml, pyskel.json)
pub mod config;

/// Common constants
pub mod constants;

/// Context resolution and validation
pub mod context;

/// Error types and handling
pub mod error;

/// The generation pipeline and its entry points
pub mod generate;

/// Template-supplied hook scripts:
/// - hooks/pre_gen_project
/// - hooks/post_gen_project
pub mod hooks;

/// File and directory ignore patterns
/// Processes .pyskelignore files to exclude specific paths
pub mod ignore;

/// Local and git template sources
pub mod loader;

pub mod logger;

/// Built-in post-generation hook
pub mod post_gen;

/// Template tree processing
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// MiniJinja rendering
pub mod renderer;

/// External tool invocation
pub mod runner;
