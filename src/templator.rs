//! Orchestration of a templating run: acquisition, context resolution,
//! rendering, finalization and the manifest, in that order.

use log::{debug, info};
use std::cell::OnceCell;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::constants::FINALIZE_SCRIPT;
use crate::context::Context;
use crate::error::Result;
use crate::hooks::{find_script, ContextGenerator, Finalizer, ScriptFinalizer};
use crate::loader::{acquire, AcquireOptions, TemplateSource};
use crate::manifest;
use crate::processor::Processor;
use crate::prompt::{DialoguerPrompter, Prompter};
use crate::renderer::MiniJinjaRenderer;
use crate::resolver::ContextResolver;
use crate::vcs::{Git2Client, VcsClient};

/// Progress of a [`Templator`]. Stages only move forward; any failure moves
/// the run to `Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Configured, template not acquired yet: the state of a [`TemplatorBuilder`].
    Initialized,
    Acquired,
    ContextResolved,
    Rendered,
    Finalized,
    MetadataWritten,
    Aborted,
}

/// Assembles a [`Templator`] with non-default collaborators.
pub struct TemplatorBuilder {
    config: Config,
    prompter: Box<dyn Prompter>,
    vcs: Box<dyn VcsClient>,
    initializer: Option<Box<dyn ContextGenerator>>,
    finalizer: Option<Box<dyn Finalizer>>,
}

impl TemplatorBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            prompter: Box::new(DialoguerPrompter::new()),
            vcs: Box::new(Git2Client::new()),
            initializer: None,
            finalizer: None,
        }
    }

    pub fn prompter<P: Prompter + 'static>(mut self, prompter: P) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn vcs<V: VcsClient + 'static>(mut self, vcs: V) -> Self {
        self.vcs = Box::new(vcs);
        self
    }

    /// Context generation used instead of the template's own.
    pub fn initializer<G: ContextGenerator + 'static>(mut self, initializer: G) -> Self {
        self.initializer = Some(Box::new(initializer));
        self
    }

    /// Finalization used instead of the template's own.
    pub fn finalizer<F: Finalizer + 'static>(mut self, finalizer: F) -> Self {
        self.finalizer = Some(Box::new(finalizer));
        self
    }

    pub fn stage(&self) -> Stage {
        Stage::Initialized
    }

    /// Acquires the template and returns a templator ready to resolve its
    /// context.
    pub fn build(self) -> Result<Templator> {
        debug!("Templator configuration: {:?}", self.config);
        let template = acquire(
            self.vcs.as_ref(),
            self.prompter.as_ref(),
            &self.config.template_location,
            &AcquireOptions {
                base_dir: &self.config.base_dir,
                checkout_ref: &self.config.checkout_ref,
                non_interactive: self.config.non_interactive,
            },
        )?;
        debug!("Template acquired in '{}'", template.local_directory.display());

        Ok(Templator {
            config: self.config,
            template,
            prompter: self.prompter,
            vcs: self.vcs,
            engine: MiniJinjaRenderer::new(),
            initializer: self.initializer,
            finalizer: self.finalizer,
            context: None,
            template_commit: OnceCell::new(),
            stage: Stage::Acquired,
        })
    }
}

/// A single templating run.
pub struct Templator {
    config: Config,
    template: TemplateSource,
    prompter: Box<dyn Prompter>,
    vcs: Box<dyn VcsClient>,
    engine: MiniJinjaRenderer,
    initializer: Option<Box<dyn ContextGenerator>>,
    finalizer: Option<Box<dyn Finalizer>>,
    context: Option<Context>,
    template_commit: OnceCell<Option<String>>,
    stage: Stage,
}

impl Templator {
    /// Acquires the template described by `config` using git and terminal
    /// prompts.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> TemplatorBuilder {
        TemplatorBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn template(&self) -> &TemplateSource {
        &self.template
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The resolved context, once [`Templator::generate_context`] has run.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Commit of the template checkout, if the template is a git repository.
    /// Read once, then cached.
    pub fn template_commit(&self) -> Option<&str> {
        self.template_commit
            .get_or_init(|| match self.vcs.head_commit(&self.template.local_directory) {
                Ok(commit) => Some(commit),
                Err(e) => {
                    debug!("No template commit available: {}", e);
                    None
                }
            })
            .as_deref()
    }

    /// Resolves the template context. A context already resolved is returned
    /// as is.
    pub fn generate_context(&mut self) -> Result<&Context> {
        if self.context.is_none() {
            let result = {
                let resolver = ContextResolver::new(&self.engine, self.prompter.as_ref());
                resolver.resolve(
                    &self.template.local_directory,
                    self.config.non_interactive,
                    self.initializer.as_deref(),
                )
            };
            let context = self.track(result)?;
            debug!("Context: {:?}", context);
            self.stage = Stage::ContextResolved;
            self.context = Some(context);
        }
        let context: &Context = self.context.get_or_insert_with(Context::new);
        Ok(context)
    }

    /// Generates the project: renders the template, finalizes the output and
    /// records the manifest. The context is resolved first if needed.
    pub fn render(&mut self) -> Result<()> {
        let context = self.generate_context()?.clone();
        let result = self.generate(&context);
        self.track(result)
    }

    fn generate(&mut self, context: &Context) -> Result<()> {
        let destination_dir = &self.config.destination_dir;
        fs::create_dir_all(destination_dir)?;
        let destination_dir = destination_dir.canonicalize()?;

        let operations = Processor::new(&self.engine, self.prompter.as_ref()).render_template(
            &self.template.local_directory,
            context,
            &destination_dir,
            self.config.non_interactive,
        )?;
        debug!("{} files written", operations.len());
        self.stage = Stage::Rendered;

        self.finalize(context, &destination_dir)?;
        self.stage = Stage::Finalized;

        let commit = self.template_commit().map(str::to_string);
        manifest::record(
            &destination_dir,
            env!("CARGO_PKG_VERSION"),
            &self.template.location,
            &self.config.checkout_ref,
            commit.as_deref(),
            context,
        )?;
        self.stage = Stage::MetadataWritten;
        info!("Project generated in '{}'", destination_dir.display());
        Ok(())
    }

    fn finalize(&self, context: &Context, output_dir: &Path) -> Result<()> {
        if let Some(finalizer) = &self.finalizer {
            debug!("Finalizing with the supplied finalizer");
            return finalizer.finalize(context, output_dir);
        }
        match find_script(&self.template.local_directory, FINALIZE_SCRIPT)? {
            Some(script) => ScriptFinalizer::new(script, self.template.local_directory.clone())
                .finalize(context, output_dir),
            None => {
                debug!("The template has no {} script", FINALIZE_SCRIPT);
                Ok(())
            }
        }
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.stage = Stage::Aborted;
        }
        result
    }
}
