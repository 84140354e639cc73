//! User input and interaction handling.
//!
//! Everything that talks to the terminal goes through [`Prompter`], so the
//! rest of the crate can be driven by scripted answers.

use dialoguer::{Confirm, Input, Select};

use crate::error::Result;

/// Source of answers for interactive runs.
pub trait Prompter {
    /// Asks a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Asks for free text. An empty reply returns `default` when one is given,
    /// otherwise an empty string.
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Asks to pick one of `choices`, returning its index.
    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize>;
}

/// [`Prompter`] reading from the terminal.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize> {
        Ok(Select::new().with_prompt(prompt).default(default).items(choices).interact()?)
    }
}

/// Turns a context key into the label shown to the user:
/// `project-name` and `project_name` both read `project name`.
pub fn humanize(key: &str) -> String {
    key.replace(['-', '_'], " ")
}
