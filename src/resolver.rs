//! Derives the template context, either from template-supplied logic or from
//! the declarative question file.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::constants::{INITIALIZE_SCRIPT, QUESTION_FILE};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::hooks::{find_script, ContextGenerator, ScriptInitializer};
use crate::prompt::{humanize, Prompter};
use crate::question::display_value;
use crate::renderer::TemplateRenderer;

/// Builds the [`Context`] of a run.
pub struct ContextResolver<'a> {
    engine: &'a dyn TemplateRenderer,
    prompter: &'a dyn Prompter,
}

impl<'a> ContextResolver<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, prompter: &'a dyn Prompter) -> Self {
        Self { engine, prompter }
    }

    /// Resolves the context for `template_dir`.
    ///
    /// The first available strategy wins: the `initializer` supplied by the
    /// caller, the template's `initialize` script, then its question file.
    ///
    /// # Errors
    /// * `Error::BrokenTemplate` if the template offers none of them
    pub fn resolve(
        &self,
        template_dir: &Path,
        non_interactive: bool,
        initializer: Option<&dyn ContextGenerator>,
    ) -> Result<Context> {
        if let Some(initializer) = initializer {
            debug!("Generating the context with the supplied initializer");
            let answers = initializer.generate_context(non_interactive, self.prompter)?;
            return Ok(Context::from_map(answers));
        }

        if let Some(script) = find_script(template_dir, INITIALIZE_SCRIPT)? {
            let initializer = ScriptInitializer::new(script, template_dir.to_path_buf());
            let answers = initializer.generate_context(non_interactive, self.prompter)?;
            return Ok(Context::from_map(answers));
        }

        let question_file = template_dir.join(QUESTION_FILE);
        if question_file.is_file() {
            warn!(
                "The template has no {} script, falling back to {}.",
                INITIALIZE_SCRIPT, QUESTION_FILE
            );
            return self.resolve_question_file(&question_file, non_interactive);
        }

        Err(Error::BrokenTemplate(format!(
            "the template is missing an {INITIALIZE_SCRIPT} script or a {QUESTION_FILE} file"
        )))
    }

    /// Walks the question file in declaration order. Each default is rendered
    /// against the answers given so far, so later keys may reference earlier
    /// ones.
    pub fn resolve_question_file(&self, path: &Path, non_interactive: bool) -> Result<Context> {
        let content = fs::read_to_string(path)?;
        let questions: IndexMap<String, Value> = serde_json::from_str(&content)
            .map_err(|e| Error::BrokenTemplate(format!("{} is invalid: {e}", path.display())))?;

        let mut context = Context::new();
        for (key, raw_default) in questions {
            let answer = self.answer(&key, raw_default, &context, non_interactive)?;
            debug!("{} = {}", key, answer);
            context.insert(key, answer);
        }
        Ok(context)
    }

    fn answer(
        &self,
        key: &str,
        raw_default: Value,
        context: &Context,
        non_interactive: bool,
    ) -> Result<Value> {
        // Private keys are configuration for pytemplator itself.
        if key.starts_with('_') {
            return Ok(raw_default);
        }

        let current = context.to_value();
        let prompt = humanize(key);
        match raw_default {
            Value::Bool(default) if non_interactive => Ok(Value::Bool(default)),
            Value::Bool(default) => Ok(Value::Bool(self.prompter.confirm(&prompt, default)?)),
            Value::Array(choices) if !choices.is_empty() => {
                let choices = choices
                    .iter()
                    .map(|choice| self.engine.render(&display_value(choice), &current))
                    .collect::<Result<Vec<_>>>()?;
                let selected =
                    if non_interactive { 0 } else { self.prompter.select(&prompt, &choices, 0)? };
                let choice = choices.into_iter().nth(selected).ok_or_else(|| {
                    Error::InvalidInput(format!("no choice #{selected} for '{key}'"))
                })?;
                Ok(Value::String(choice))
            }
            other => {
                let default = self.engine.render(&display_value(&other), &current)?;
                if non_interactive {
                    return Ok(Value::String(default));
                }
                let reply = self.prompter.input(&prompt, Some(&default))?;
                Ok(Value::String(if reply.is_empty() { default } else { reply }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;
    use serde_json::json;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Returns empty replies and records the prompts it was shown.
    #[derive(Default)]
    struct RecordingPrompter {
        asked: RefCell<Vec<String>>,
    }

    impl Prompter for RecordingPrompter {
        fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
            self.asked.borrow_mut().push(prompt.to_string());
            Ok(default)
        }

        fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
            self.asked.borrow_mut().push(format!("{prompt} [{}]", default.unwrap_or_default()));
            Ok(String::new())
        }

        fn select(&self, prompt: &str, _choices: &[String], default: usize) -> Result<usize> {
            self.asked.borrow_mut().push(prompt.to_string());
            Ok(default)
        }
    }

    const QUESTIONS: &str = r#"{
        "project_name": "My Project",
        "project_slug": "{{ cookiecutter.project_name | lower | replace(' ', '_') }}",
        "module": "{{ project_slug }}_core",
        "license": ["MIT", "{{ project_slug }}-license"],
        "use_ci": false,
        "version": 1,
        "_copy_without_render": ["*.png"]
    }"#;

    fn template_with_questions() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(QUESTION_FILE), QUESTIONS).unwrap();
        tmp
    }

    #[test]
    fn test_question_file_renders_defaults_in_order() {
        let tmp = template_with_questions();
        let engine = MiniJinjaRenderer::new();
        let prompter = RecordingPrompter::default();
        let resolver = ContextResolver::new(&engine, &prompter);

        let context = resolver.resolve(tmp.path(), true, None).unwrap();
        assert_eq!(context.get("project_slug"), Some(&json!("my_project")));
        assert_eq!(context.get("module"), Some(&json!("my_project_core")));
        assert_eq!(context.get("license"), Some(&json!("MIT")));
        assert_eq!(context.get("use_ci"), Some(&json!(false)));
        assert_eq!(context.get("version"), Some(&json!("1")));
        assert_eq!(context.copy_without_render(), vec!["*.png"]);
        assert!(prompter.asked.borrow().is_empty());
    }

    #[test]
    fn test_question_file_is_deterministic_without_input() {
        let tmp = template_with_questions();
        let engine = MiniJinjaRenderer::new();
        let prompter = RecordingPrompter::default();
        let resolver = ContextResolver::new(&engine, &prompter);

        let first = resolver.resolve(tmp.path(), true, None).unwrap();
        let second = resolver.resolve(tmp.path(), true, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_question_file_prompts_with_rendered_defaults() {
        let tmp = template_with_questions();
        let engine = MiniJinjaRenderer::new();
        let prompter = RecordingPrompter::default();
        let resolver = ContextResolver::new(&engine, &prompter);

        let context = resolver.resolve(tmp.path(), false, None).unwrap();
        assert_eq!(context.get("project_slug"), Some(&json!("my_project")));
        assert_eq!(
            *prompter.asked.borrow(),
            vec![
                "project name [My Project]",
                "project slug [my_project]",
                "module [my_project_core]",
                "license",
                "use ci",
                "version [1]",
            ]
        );
    }

    #[test]
    fn test_supplied_initializer_takes_precedence() {
        let tmp = template_with_questions();
        let engine = MiniJinjaRenderer::new();
        let prompter = RecordingPrompter::default();
        let resolver = ContextResolver::new(&engine, &prompter);
        let initializer = |_non_interactive: bool,
                           _prompter: &dyn Prompter|
         -> Result<IndexMap<String, Value>> {
            Ok(IndexMap::from([("main_file_name".to_string(), json!("test2"))]))
        };

        let context = resolver
            .resolve(tmp.path(), true, Some(&initializer as &dyn ContextGenerator))
            .unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context.get("main_file_name"), Some(&json!("test2")));
    }

    #[test]
    fn test_template_without_context_source_is_broken() {
        let tmp = TempDir::new().unwrap();
        let engine = MiniJinjaRenderer::new();
        let prompter = RecordingPrompter::default();
        let resolver = ContextResolver::new(&engine, &prompter);
        let result = resolver.resolve(tmp.path(), true, None);
        assert!(matches!(result, Err(Error::BrokenTemplate(_))));
    }

    #[test]
    fn test_invalid_question_file_is_broken() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(QUESTION_FILE), "[1, 2]").unwrap();
        let engine = MiniJinjaRenderer::new();
        let prompter = RecordingPrompter::default();
        let resolver = ContextResolver::new(&engine, &prompter);
        let result = resolver.resolve(tmp.path(), true, None);
        assert!(matches!(result, Err(Error::BrokenTemplate(_))));
    }
}
