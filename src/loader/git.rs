use crate::constants::GIT_URL_REGEX;
use crate::error::{Error, Result};
use crate::loader::interface::TemplateLoader;
use crate::prompt::Prompter;
use crate::vcs::VcsClient;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Loader for templates kept as git checkouts under the base directory.
///
/// The checkout is cloned on first use and fetched on later ones; a failed
/// fetch falls back to the cached copy.
pub struct GitLoader<'a, S: AsRef<str>> {
    vcs: &'a dyn VcsClient,
    prompter: &'a dyn Prompter,
    repo: S,
    base_dir: &'a Path,
    checkout_ref: &'a str,
    non_interactive: bool,
}

impl<'a, S: AsRef<str>> GitLoader<'a, S> {
    /// Creates a new GitLoader instance.
    pub fn new(
        vcs: &'a dyn VcsClient,
        prompter: &'a dyn Prompter,
        repo: S,
        base_dir: &'a Path,
        checkout_ref: &'a str,
        non_interactive: bool,
    ) -> Self {
        Self { vcs, prompter, repo, base_dir, checkout_ref, non_interactive }
    }

    /// Checks if the given string is a git repository URL.
    pub fn is_git_url(s: &str) -> bool {
        GIT_URL_REGEX.is_match(s)
    }

    /// Name of the cached checkout: the last path segment of the URL without
    /// trailing slashes or `.git` suffix.
    pub fn repo_name(url: &str) -> String {
        let trimmed = url.trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let name = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
        if name.is_empty() {
            "template".to_string()
        } else {
            name.to_string()
        }
    }

    fn update_cached(&self, repo_url: &str, clone_path: &Path) -> Result<()> {
        let Err(e) = self.vcs.fetch(clone_path) else {
            return Ok(());
        };
        warn!("Could not fetch '{}': {}", repo_url, e);
        if self.non_interactive {
            warn!("Continuing with the cached version of the template.");
            return Ok(());
        }
        let use_cached = self.prompter.confirm(
            "Could not fetch from the repo url. Continue with the cached version?",
            true,
        )?;
        if use_cached {
            Ok(())
        } else {
            Err(Error::UserCancellation)
        }
    }

    fn checkout(&self, clone_path: &Path) -> Result<()> {
        let reference = self.checkout_ref;
        let Err(e) = self.vcs.checkout(clone_path, reference) else {
            return Ok(());
        };
        warn!("Could not check out '{}' ({}), resetting to the remote.", reference, e);
        self.vcs
            .reset_hard(clone_path, reference)
            .and_then(|()| self.vcs.checkout(clone_path, reference))
            .map_err(|e| {
                Error::InvalidInput(format!("the ref '{reference}' cannot be checked out: {e}"))
            })
    }
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<'_, S> {
    /// Clones or updates the cached checkout, then checks out the requested ref.
    ///
    /// # Errors
    /// * `Error::BrokenTemplate` if there is no cached copy and the clone fails
    /// * `Error::UserCancellation` if the user refuses the cached copy
    /// * `Error::InvalidInput` if the ref cannot be checked out
    fn load(&self) -> Result<PathBuf> {
        let repo_url = self.repo.as_ref();
        let clone_path = self.base_dir.join(Self::repo_name(repo_url));

        if clone_path.exists() {
            debug!("Updating cached template '{}'.", clone_path.display());
            self.update_cached(repo_url, &clone_path)?;
        } else {
            info!("Cloning '{}' into '{}'.", repo_url, clone_path.display());
            self.vcs.clone_repo(repo_url, &clone_path).map_err(|e| {
                Error::BrokenTemplate(format!(
                    "the template could not be cloned from {repo_url}: {e}"
                ))
            })?;
        }

        self.checkout(&clone_path)?;
        Ok(clone_path)
    }
}
