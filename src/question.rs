//! Questions with validation and separate defaults for prompted and
//! unattended runs.
//!
//! Initializers written in Rust build a [`Questionnaire`], resolve it and hand
//! the answers back as the template context:
//!
//! ```ignore
//! let mut questions = Questionnaire::new(vec![
//!     Question::new("project_name").validator(NotEmpty),
//!     Question::new("license").default("MIT").no_input_default("Apache-2.0"),
//!     Question::new("layout").never_ask().default("src"),
//! ])?;
//! questions.resolve(non_interactive, prompter)?;
//! let answers = questions.as_dict();
//! ```

use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::prompt::{humanize, Prompter};

/// A default answer, either fixed or computed when it is needed.
pub enum DefaultValue {
    Value(Value),
    Lazy(Box<dyn Fn() -> Value>),
}

impl DefaultValue {
    fn get(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Lazy(generate) => generate(),
        }
    }
}

/// A check run against a candidate answer.
pub trait Validator {
    /// Returns a description of the problem when the answer is not acceptable.
    fn check(&self, question: &Question) -> std::result::Result<(), String>;
}

impl<F> Validator for F
where
    F: Fn(&Question) -> std::result::Result<(), String>,
{
    fn check(&self, question: &Question) -> std::result::Result<(), String> {
        self(question)
    }
}

/// Rejects empty strings and missing answers.
#[derive(Debug, Clone, Copy)]
pub struct NotEmpty;

impl Validator for NotEmpty {
    fn check(&self, question: &Question) -> std::result::Result<(), String> {
        match question.answer() {
            None | Some(Value::Null) => Err("an answer is required".to_string()),
            Some(Value::String(s)) if s.trim().is_empty() => {
                Err("an answer is required".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Requires the whole answer to match a regular expression.
#[derive(Debug, Clone)]
pub struct MatchesPattern {
    pattern: String,
    anchored: Regex,
}

impl MatchesPattern {
    /// Compiles `pattern`, anchored at both ends of the answer.
    pub fn new(pattern: &str) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self { pattern: pattern.to_string(), anchored })
    }
}

impl Validator for MatchesPattern {
    fn check(&self, question: &Question) -> std::result::Result<(), String> {
        let answer = question.answer_as_string();
        if self.anchored.is_match(&answer) {
            Ok(())
        } else {
            Err(format!("'{answer}' does not match {}", self.pattern))
        }
    }
}

/// Requires the answer to be one of a fixed list.
#[derive(Debug, Clone)]
pub struct OneOf(pub Vec<String>);

impl Validator for OneOf {
    fn check(&self, question: &Question) -> std::result::Result<(), String> {
        let answer = question.answer_as_string();
        if self.0.contains(&answer) {
            Ok(())
        } else {
            Err(format!("'{answer}' is not one of: {}", self.0.join(", ")))
        }
    }
}

/// A single prompt with its defaults and validators.
pub struct Question {
    key: String,
    prompt: Option<String>,
    default: Option<DefaultValue>,
    no_input_default: Option<DefaultValue>,
    validators: Vec<Box<dyn Validator>>,
    answer: Option<Value>,
}

impl fmt::Debug for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Question")
            .field("key", &self.key)
            .field("prompt", &self.prompt)
            .field("validators", &self.validators.len())
            .field("answer", &self.answer)
            .finish()
    }
}

impl Question {
    /// A question prompted with its humanized key and no default.
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = key.into();
        Self {
            prompt: Some(humanize(&key)),
            key,
            default: None,
            no_input_default: None,
            validators: Vec::new(),
            answer: None,
        }
    }

    pub fn prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// The answer always comes from the default, even in interactive runs.
    pub fn never_ask(mut self) -> Self {
        self.prompt = None;
        self
    }

    pub fn default<V: Into<Value>>(mut self, default: V) -> Self {
        self.default = Some(DefaultValue::Value(default.into()));
        self
    }

    pub fn default_with<F: Fn() -> Value + 'static>(mut self, generate: F) -> Self {
        self.default = Some(DefaultValue::Lazy(Box::new(generate)));
        self
    }

    /// Default used instead of [`Question::default`] when prompts are disabled.
    pub fn no_input_default<V: Into<Value>>(mut self, default: V) -> Self {
        self.no_input_default = Some(DefaultValue::Value(default.into()));
        self
    }

    pub fn no_input_default_with<F: Fn() -> Value + 'static>(mut self, generate: F) -> Self {
        self.no_input_default = Some(DefaultValue::Lazy(Box::new(generate)));
        self
    }

    pub fn validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn answer(&self) -> Option<&Value> {
        self.answer.as_ref()
    }

    /// The current answer as display text (strings unquoted).
    pub fn answer_as_string(&self) -> String {
        self.answer.as_ref().map(display_value).unwrap_or_default()
    }

    pub fn is_resolved(&self) -> bool {
        self.answer.is_some()
    }

    /// Obtains an answer, once.
    ///
    /// Questions that are never asked take their default. Otherwise the
    /// answer comes from the defaults in non-interactive runs and from the
    /// prompter in interactive ones, and is re-asked until every validator
    /// accepts it.
    pub fn resolve(&mut self, non_interactive: bool, prompter: &dyn Prompter) -> Result<&Value> {
        let answer = match self.answer.take() {
            Some(answer) => answer,
            None => self.obtain_answer(non_interactive, prompter)?,
        };
        let answer: &Value = self.answer.insert(answer);
        Ok(answer)
    }

    fn obtain_answer(&mut self, non_interactive: bool, prompter: &dyn Prompter) -> Result<Value> {
        let Some(prompt) = self.prompt.clone() else {
            return Ok(self.default.as_ref().map(DefaultValue::get).unwrap_or(Value::Null));
        };

        let mut errors: Vec<String> = Vec::new();
        loop {
            for error in &errors {
                warn!("Invalid answer for '{}': {}", self.key, error);
            }

            let candidate = if non_interactive {
                // Defaults do not change between attempts: a rejected one
                // would be rejected forever.
                if !errors.is_empty() {
                    return Err(Error::ValidationError { key: self.key.clone(), errors });
                }
                match self.no_input_default.as_ref().or(self.default.as_ref()) {
                    Some(default) => default.get(),
                    None => return Err(Error::NoInputUnsupported { key: self.key.clone() }),
                }
            } else {
                self.ask(&prompt, prompter)?
            };

            errors = self.validate(candidate.clone());
            if errors.is_empty() {
                return Ok(candidate);
            }
        }
    }

    fn ask(&self, prompt: &str, prompter: &dyn Prompter) -> Result<Value> {
        match self.default.as_ref().map(DefaultValue::get) {
            Some(Value::Bool(default)) => Ok(Value::Bool(prompter.confirm(prompt, default)?)),
            Some(default) => {
                let shown = display_value(&default);
                let reply = prompter.input(prompt, Some(&shown))?;
                if reply.is_empty() || reply == shown {
                    Ok(default)
                } else {
                    Ok(Value::String(reply))
                }
            }
            None => Ok(Value::String(prompter.input(prompt, None)?)),
        }
    }

    fn validate(&mut self, candidate: Value) -> Vec<String> {
        self.answer = Some(candidate);
        let errors: Vec<String> =
            self.validators.iter().filter_map(|v| v.check(self).err()).collect();
        self.answer = None;
        errors
    }
}

/// Ordered set of questions with unique keys.
#[derive(Debug, Default)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.key()) {
                return Err(Error::BrokenTemplate(format!(
                    "question '{}' is declared more than once",
                    question.key()
                )));
            }
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Resolves every question in declaration order.
    pub fn resolve(&mut self, non_interactive: bool, prompter: &dyn Prompter) -> Result<()> {
        for question in &mut self.questions {
            question.resolve(non_interactive, prompter)?;
        }
        Ok(())
    }

    /// The answers so far, keyed by question, in declaration order.
    pub fn as_dict(&self) -> IndexMap<String, Value> {
        self.questions
            .iter()
            .filter_map(|q| q.answer().map(|a| (q.key().to_string(), a.clone())))
            .collect()
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
