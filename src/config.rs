//! Run configuration handed to the core by the command line (or by any other
//! caller embedding pytemplator).

use std::path::PathBuf;

use crate::constants::DEFAULT_CHECKOUT_REF;

/// Fully-formed parameters of one templating run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where cached template checkouts are stored.
    pub base_dir: PathBuf,
    /// Git URL or filesystem path of the template.
    pub template_location: String,
    /// Ref checked out for git templates.
    pub checkout_ref: String,
    /// Directory the generated tree is written into.
    pub destination_dir: PathBuf,
    /// Never prompt; every answer must come from defaults.
    pub non_interactive: bool,
}

impl Config {
    /// Configuration with every optional parameter at its default.
    pub fn new<S: Into<String>>(template_location: S) -> Self {
        Self {
            base_dir: default_base_dir(),
            template_location: template_location.into(),
            checkout_ref: DEFAULT_CHECKOUT_REF.to_string(),
            destination_dir: PathBuf::from("."),
            non_interactive: false,
        }
    }

    pub fn base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn checkout_ref<S: Into<String>>(mut self, checkout_ref: S) -> Self {
        self.checkout_ref = checkout_ref.into();
        self
    }

    pub fn destination_dir<P: Into<PathBuf>>(mut self, destination_dir: P) -> Self {
        self.destination_dir = destination_dir.into();
        self
    }

    pub fn non_interactive(mut self, non_interactive: bool) -> Self {
        self.non_interactive = non_interactive;
        self
    }
}

/// `~/.pytemplator`, or `.pytemplator` in the current directory when the home
/// directory is unknown.
pub fn default_base_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".pytemplator")
}
