//! Error handling for pytemplator.
//! Defines the single error channel used from template acquisition up to the
//! orchestration boundary.

use std::io;
use thiserror::Error;

use crate::vcs::VcsError;

/// All the failures pytemplator can signal.
///
/// The first four variants form the user-facing taxonomy: a broken template,
/// an input that cannot be honoured, a declined confirmation and a question
/// that needs a human in a non-interactive run. The remaining ones wrap
/// failures of the libraries the core delegates to.
#[derive(Error, Debug)]
pub enum Error {
    /// The template is structurally invalid (no initializer and no question
    /// file, an initializer that does not produce a context, a failed clone).
    #[error("Broken template: {0}.")]
    BrokenTemplate(String),

    /// A user-supplied parameter cannot be honoured.
    #[error("Invalid input: {0}.")]
    InvalidInput(String),

    /// The user declined a destructive confirmation.
    #[error("Operation cancelled by the user.")]
    UserCancellation,

    /// A question has no usable default while running without prompts.
    #[error("Question '{key}' requires an answer but no input is allowed and it has no default.")]
    NoInputUnsupported { key: String },

    /// An answer was rejected by the question's validators.
    #[error("Invalid answer for '{key}': {}.", errors.join(", "))]
    ValidationError { key: String, errors: Vec<String> },

    /// A template-supplied script exited unsuccessfully.
    #[error("Script '{script}' failed with status: {status}.")]
    HookError { script: String, status: String },

    /// A rendered path cannot be written safely.
    #[error("Template error: {0}.")]
    TemplateError(String),

    #[error("Version control error: {0}")]
    VcsError(#[from] VcsError),

    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("Template rendering error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("JSON error: {0}.")]
    JSONParseError(#[from] serde_json::Error),

    #[error("YAML error: {0}.")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Regular expression error: {0}.")]
    RegexError(#[from] regex::Error),

    #[error("Glob pattern error: {0}.")]
    GlobError(#[from] globset::Error),

    #[error("Directory traversal error: {0}.")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Prints the error to stderr and exits with status code 1.
///
/// A user cancellation is reported as a plain notice rather than an error.
pub fn default_error_handler(err: Error) -> ! {
    match err {
        Error::UserCancellation => eprintln!("Aborted, nothing was generated."),
        err => eprintln!("{err}"),
    }
    std::process::exit(1);
}
