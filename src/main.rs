//! Pytemplator's command-line entry point.
//! Parses arguments, then drives a [`Templator`] through the whole run.

use pytemplator::{
    cli::{get_args, Args},
    config::Config,
    error::{default_error_handler, Result},
    logger::init_logger,
    templator::Templator,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Acquires the template, asks for its context, then generates the project.
fn run(args: Args) -> Result<()> {
    let mut templator = Templator::new(Config::from(args))?;
    templator.generate_context()?;
    templator.render()?;
    log::info!("Success!");
    Ok(())
}
