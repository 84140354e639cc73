//! Command-line interface implementation for pytemplator.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use crate::config::{default_base_dir, Config};
use crate::constants::DEFAULT_CHECKOUT_REF;

/// Command-line arguments structure for pytemplator.
#[derive(Parser, Debug)]
#[command(author, version, about = "pytemplate: generate a project from a template", long_about = None)]
pub struct Args {
    /// The location of the template to use, either a repo url or its path on
    /// the filesystem
    #[arg(value_name = "TEMPLATE_LOCATION")]
    pub template_location: String,

    /// The directory pytemplator uses to store downloaded templates
    /// [default: ~/.pytemplator]
    #[arg(short, long, env = "PYTEMPLATOR_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Which ref to checkout if using a repo-based template
    #[arg(short, long = "checkout-branch", default_value = DEFAULT_CHECKOUT_REF)]
    pub checkout_branch: String,

    /// Where to generate the project [default: current directory]
    #[arg(short, long)]
    pub destination_dir: Option<PathBuf>,

    /// Never prompt: use defaults and overwrite existing directories
    #[arg(long)]
    pub no_input: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config::new(args.template_location)
            .base_dir(args.base_dir.unwrap_or_else(default_base_dir))
            .checkout_ref(args.checkout_branch)
            .non_interactive(args.no_input);
        if let Some(destination_dir) = args.destination_dir {
            config = config.destination_dir(destination_dir);
        }
        config
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let mut command = Args::command().help_template(
                    r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                );
                // Nothing more useful to do if stdout is gone.
                let _ = command.print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
