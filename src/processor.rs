//! Rendering of a template tree into the destination directory.
//!
//! Rendering happens in three steps: the renderable tree is staged, the
//! top-level directories it would create are checked against the destination,
//! and only then is every file rendered (or copied verbatim) in lexical order.

use log::{debug, info, warn};
use minijinja::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::constants::{RESERVED_DIR_NAMES, TEMPLATES_DIR};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;
use crate::verbatim::build_verbatim_set;

/// The renderable part of a template, ready to be walked.
#[derive(Debug)]
pub struct StagedTemplate {
    /// Root of the tree handed to the renderer.
    pub root: PathBuf,
    /// Top-level directories of the template, as found in the template itself.
    pub top_level_dirs: Vec<PathBuf>,
    /// Scratch directory holding the symlinks; removed on drop.
    _scratch: Option<TempDir>,
}

/// Everything a single render call needs.
#[derive(Debug)]
pub struct RenderJob<'a> {
    pub template_root: &'a Path,
    pub top_level_dirs: &'a [PathBuf],
    pub context: &'a Context,
    pub destination_dir: &'a Path,
    pub non_interactive: bool,
}

/// What happened to a single template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    /// Content rendered through the template engine.
    Write { target: PathBuf },
    /// Content copied byte-for-byte.
    Copy { target: PathBuf },
}

impl FileOperation {
    pub fn target(&self) -> &Path {
        match self {
            FileOperation::Write { target } | FileOperation::Copy { target } => target,
        }
    }
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Write { target } => write!(f, "Rendering: '{}'", target.display()),
            FileOperation::Copy { target } => write!(f, "Copying: '{}'", target.display()),
        }
    }
}

/// Lists the directories directly under `dir`, skipping `excluded` names.
fn list_dirs(dir: &Path, excluded: &[&str]) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if excluded.iter().any(|excluded| name == *excluded) {
            debug!("Skipping reserved directory '{}'", entry.path().display());
            continue;
        }
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(unix)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}

/// Prepares the tree to render.
///
/// A `templates/` sub-directory is used directly. Otherwise every top-level
/// directory of the template except the reserved ones is symlinked into a
/// scratch directory, so that loose files next to them (scripts, question
/// file, README) are never rendered.
pub fn stage_template(template_dir: &Path) -> Result<StagedTemplate> {
    let templates = template_dir.join(TEMPLATES_DIR);
    if templates.is_dir() {
        debug!("Rendering from '{}'", templates.display());
        let top_level_dirs = list_dirs(&templates, &[])?;
        return Ok(StagedTemplate { root: templates, top_level_dirs, _scratch: None });
    }

    let top_level_dirs = list_dirs(template_dir, &RESERVED_DIR_NAMES)?;
    let scratch = tempfile::tempdir()?;
    for dir in &top_level_dirs {
        if let Some(name) = dir.file_name() {
            symlink_dir(dir, &scratch.path().join(name))?;
        }
    }
    debug!("Staged {} directories in '{}'", top_level_dirs.len(), scratch.path().display());
    Ok(StagedTemplate {
        root: scratch.path().to_path_buf(),
        top_level_dirs,
        _scratch: Some(scratch),
    })
}

/// Renders staged templates into a destination directory.
pub struct Processor<'a> {
    engine: &'a dyn TemplateRenderer,
    prompter: &'a dyn Prompter,
}

impl<'a> Processor<'a> {
    pub fn new(engine: &'a dyn TemplateRenderer, prompter: &'a dyn Prompter) -> Self {
        Self { engine, prompter }
    }

    /// Stages `template_dir` and renders it into `destination_dir`.
    pub fn render_template(
        &self,
        template_dir: &Path,
        context: &Context,
        destination_dir: &Path,
        non_interactive: bool,
    ) -> Result<Vec<FileOperation>> {
        let staged = stage_template(template_dir)?;
        self.render(&RenderJob {
            template_root: &staged.root,
            top_level_dirs: &staged.top_level_dirs,
            context,
            destination_dir,
            non_interactive,
        })
    }

    /// Runs the collision check, then writes every file of the job.
    pub fn render(&self, job: &RenderJob<'_>) -> Result<Vec<FileOperation>> {
        let context = job.context.to_value();
        let patterns = job
            .context
            .copy_without_render()
            .iter()
            .map(|pattern| self.engine.render(pattern, &context))
            .collect::<Result<Vec<_>>>()?;
        let verbatim = build_verbatim_set(&patterns)?;
        self.check_collisions(job, &context)?;

        let mut operations = Vec::new();
        let walker =
            WalkDir::new(job.template_root).min_depth(1).follow_links(true).sort_by_file_name();
        for entry in walker {
            let entry = entry?;
            let source = entry.path();
            let relative = source.strip_prefix(job.template_root).map_err(|e| {
                Error::TemplateError(format!("'{}': {e}", source.display()))
            })?;

            let Some(rendered) = self.render_path(relative, &context)? else {
                debug!("Skipping '{}' as its rendered path is empty", relative.display());
                continue;
            };
            let target = job.destination_dir.join(&rendered);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }

            let operation = if verbatim.is_match(&rendered) {
                copy_file(source, &target)?
            } else {
                self.render_file(job.template_root, relative, &target, &context)?
            };
            info!("{}", operation);
            operations.push(operation);
        }
        Ok(operations)
    }

    /// Makes sure no top-level directory about to be generated clobbers
    /// existing content without consent.
    ///
    /// Colliding paths are removed only after the user agreed (or right away
    /// when prompts are disabled). Declining leaves the destination untouched.
    ///
    /// # Returns
    /// * `Result<Vec<PathBuf>>` - The paths that were removed
    pub fn check_collisions(&self, job: &RenderJob<'_>, context: &Value) -> Result<Vec<PathBuf>> {
        let mut existing = Vec::new();
        for dir in job.top_level_dirs {
            let Some(name) = dir.file_name() else { continue };
            let Some(rendered) = self.render_path(Path::new(name), context)? else { continue };
            let target = job.destination_dir.join(rendered);
            if target.exists() {
                existing.push(target);
            }
        }
        if existing.is_empty() {
            return Ok(existing);
        }

        let listing: Vec<String> = existing.iter().map(|p| p.display().to_string()).collect();
        if job.non_interactive {
            warn!("Overwriting existing directories:\n\t{}", listing.join("\n\t"));
        } else {
            warn!("The following directories already exist:\n\t{}", listing.join("\n\t"));
            if !self.prompter.confirm("Overwrite those directories?", true)? {
                return Err(Error::UserCancellation);
            }
        }

        for path in &existing {
            if path.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
        }
        Ok(existing)
    }

    /// Renders every segment of a relative path.
    ///
    /// Returns `None` when a segment renders to nothing, which drops the file.
    fn render_path(&self, relative: &Path, context: &Value) -> Result<Option<PathBuf>> {
        let mut rendered = PathBuf::new();
        for component in relative.components() {
            let segment = component.as_os_str().to_str().ok_or_else(|| {
                Error::TemplateError(format!("'{}' is not valid UTF-8", relative.display()))
            })?;
            let segment = self.engine.render(segment, context)?;
            if segment.trim().is_empty() {
                return Ok(None);
            }
            if segment == "." || segment == ".." || segment.contains(['/', '\\']) {
                return Err(Error::TemplateError(format!(
                    "'{}' renders to the invalid path segment '{}'",
                    relative.display(),
                    segment
                )));
            }
            rendered.push(segment);
        }
        Ok(Some(rendered))
    }

    /// Renders `relative` through the engine's loader, so that it may include
    /// other files of the template.
    fn render_file(
        &self,
        root: &Path,
        relative: &Path,
        target: &Path,
        context: &Value,
    ) -> Result<FileOperation> {
        let source = root.join(relative);
        if std::str::from_utf8(&fs::read(&source)?).is_err() {
            debug!("'{}' is not text, copying it as is", source.display());
            return copy_file(&source, target);
        }
        let rendered = self.engine.render_file(root, &template_name(relative)?, context)?;
        fs::write(target, rendered)?;
        fs::set_permissions(target, fs::metadata(&source)?.permissions())?;
        Ok(FileOperation::Write { target: target.to_path_buf() })
    }
}

/// Loader name of a template file: its relative path with `/` separators.
fn template_name(relative: &Path) -> Result<String> {
    let segments = relative
        .components()
        .map(|component| {
            component.as_os_str().to_str().ok_or_else(|| {
                Error::TemplateError(format!("'{}' is not valid UTF-8", relative.display()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("/"))
}

fn copy_file(source: &Path, target: &Path) -> Result<FileOperation> {
    fs::copy(source, target)?;
    Ok(FileOperation::Copy { target: target.to_path_buf() })
}
