//! Command-line interface implementation for pyskel.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use indexmap::IndexMap;
use std::io::Read;
use std::path::PathBuf;

use crate::constants::CONFIG_ENV;
use crate::context::parse_overrides;
use crate::error::{Error, Result};
use crate::generate::BakeOptions;

/// Command-line arguments structure for pyskel.
#[derive(Parser, Debug)]
#[command(author, version, about = "pyskel: Python project skeleton generator", long_about = None)]
pub struct Args {
    /// Path to the template directory or git repository URL.
    /// Defaults to the bundled python-package template.
    #[arg(value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Template options as KEY=VALUE pairs, e.g. use_cli=yes
    #[arg(value_name = "KEY=VALUE")]
    pub extra_context: Vec<String>,

    /// Directory where the generated project will be created
    #[arg(short, long, value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Do not prompt; use defaults for every option not given explicitly
    #[arg(long)]
    pub no_input: bool,

    /// Force overwrite of an existing project directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Read answers as a JSON object from stdin
    #[arg(short, long)]
    pub stdin: bool,

    /// User config file with a `default_context` mapping
    #[arg(long, value_name = "PATH", env = CONFIG_ENV)]
    pub config_file: Option<PathBuf>,

    /// Kill external tools run by the post-generation hook after this many seconds
    #[arg(long, value_name = "SECS")]
    pub tool_timeout: Option<u64>,

    /// Skip confirmation prompts when replacing a previously cloned template.
    #[arg(long)]
    pub skip_overwrite_check: bool,

    /// Skip confirmation prompts when executing hooks.
    /// This will automatically execute any pre/post hook scripts defined in the template
    /// without asking for confirmation first.
    #[arg(long)]
    pub skip_hooks_check: bool,
}

impl Args {
    /// Builds generation options from the parsed arguments.
    ///
    /// Overrides are layered: answers from stdin first, then `KEY=VALUE`
    /// pairs, which win on conflicts.
    pub fn bake_options(
        &self,
        stdin_answers: IndexMap<String, serde_json::Value>,
        user_defaults: IndexMap<String, serde_json::Value>,
    ) -> Result<BakeOptions> {
        let mut overrides = stdin_answers;
        overrides.extend(parse_overrides(&self.extra_context)?);

        Ok(BakeOptions {
            template: self.template.clone(),
            output_dir: self.output_dir.clone(),
            overrides,
            user_defaults,
            no_input: self.no_input,
            force: self.force,
            skip_hooks_check: self.skip_hooks_check,
            skip_overwrite_check: self.skip_overwrite_check,
        })
    }
}

/// Parses a JSON object of answers. Empty input means no answers.
pub fn parse_answers(input: &str) -> Result<IndexMap<String, serde_json::Value>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(IndexMap::new());
    }
    serde_json::from_str(input)
        .map_err(|e| Error::ConfigError(format!("Failed to parse answers as a JSON object: {e}")))
}

/// Reads answers from stdin, see [`parse_answers`].
pub fn read_stdin_answers() -> Result<IndexMap<String, serde_json::Value>> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    parse_answers(&buffer)
}

/// Short help shown when arguments are missing.
pub fn usage_help() -> String {
    Args::command()
        .help_template(
            r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
        )
        .render_help()
        .to_string()
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and [`usage_help`] on stderr if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                eprintln!("{}", usage_help());
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
