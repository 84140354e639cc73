//! Template rendering for file names, file contents and question defaults.
use crate::error::Result;
use minijinja::{Environment, ErrorKind, UndefinedBehavior, Value};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, template: &str, context: &Value) -> Result<String>;

    /// Renders the template file `name` found under `root`. The file may
    /// include, extend or import any other template under the same root.
    ///
    /// # Arguments
    /// * `root` - Directory template names are resolved against
    /// * `name` - `/`-separated path of the template relative to `root`
    /// * `context` - Context variables for rendering
    fn render_file(&self, root: &Path, name: &str, context: &Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
///
/// Referencing a variable missing from the context is an error rather than an
/// empty string, and a trailing newline in the source is kept as is.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
    /// Environment loading templates from the last root rendered from.
    files: RefCell<Option<(PathBuf, Environment<'static>)>>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self { env: environment(), files: RefCell::new(None) }
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

/// Loads templates by `/`-separated name from `root`. Unlike
/// `minijinja::path_loader`, dotfiles such as `.gitignore` are loadable; only
/// `.` and `..` segments are refused.
fn template_loader(
    root: PathBuf,
) -> impl Fn(&str) -> std::result::Result<Option<String>, minijinja::Error> + Send + Sync + 'static
{
    move |name| {
        let mut path = root.clone();
        for segment in name.split('/') {
            if matches!(segment, "" | "." | "..") || segment.contains('\\') {
                return Ok(None);
            }
            path.push(segment);
        }
        match fs::read_to_string(&path) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template '{}'", path.display()),
            )
            .with_source(e)),
        }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String> {
        Ok(self.env.render_str(template, context)?)
    }

    fn render_file(&self, root: &Path, name: &str, context: &Value) -> Result<String> {
        let mut files = self.files.borrow_mut();
        if !matches!(&*files, Some((cached, _)) if cached == root) {
            *files = None;
        }
        let (_, env) = files.get_or_insert_with(|| {
            let mut env = environment();
            env.set_loader(template_loader(root.to_path_buf()));
            (root.to_path_buf(), env)
        });
        Ok(env.get_template(name)?.render(context)?)
    }
}
