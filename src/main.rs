//! pyskel's application entry point.
//! Parses arguments, sets up logging and runs one generation.

use std::time::Duration;

use indexmap::IndexMap;
use pyskel::{
    cli::{get_args, read_stdin_answers, Args},
    config::load_user_defaults,
    error::{default_error_handler, Result},
    generate::generate,
    logger::init_logger,
    prompt::{DefaultPrompter, DialoguerPrompter, Prompter},
    runner::SystemRunner,
};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn run(args: Args) -> Result<()> {
    let stdin_answers = if args.stdin { read_stdin_answers()? } else { IndexMap::new() };
    let user_defaults = load_user_defaults(args.config_file.as_deref())?;
    let options = args.bake_options(stdin_answers, user_defaults)?;

    let runner = match args.tool_timeout {
        Some(secs) => SystemRunner::with_timeout(Duration::from_secs(secs)),
        None => SystemRunner::new(),
    };
    // Answers read from stdin leave no terminal to prompt on.
    let prompter: Box<dyn Prompter> = if args.no_input || args.stdin {
        Box::new(DefaultPrompter)
    } else {
        Box::new(DialoguerPrompter::new())
    };

    let generated = generate(&options, &runner, &*prompter)?;
    print!("{}", generated.report);
    log::debug!("Project written to {}", generated.project_path.display());
    Ok(())
}
