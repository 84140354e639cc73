//! Version control operations needed to keep a cached template checkout in sync.
//!
//! Every operation receives the repository directory explicitly, so nothing
//! here ever changes the process working directory.

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    BranchType, Cred, ErrorCode, FetchOptions, FetchPrune, RemoteCallbacks, Repository, ResetType,
};
use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::DEFAULT_REMOTE;

/// Failure of a version control operation.
#[derive(Error, Debug)]
pub enum VcsError {
    /// The repository, remote or ref does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation was attempted and failed.
    #[error("command failed: {0}")]
    Failed(String),
}

impl From<git2::Error> for VcsError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            ErrorCode::NotFound => VcsError::NotFound(err.message().to_string()),
            _ => VcsError::Failed(err.message().to_string()),
        }
    }
}

pub type VcsResult<T> = std::result::Result<T, VcsError>;

/// The version control capabilities the template acquirer relies on.
pub trait VcsClient {
    /// Fetches every configured refspec of the default remote, pruning
    /// deleted remote branches.
    fn fetch(&self, repo_dir: &Path) -> VcsResult<()>;

    /// Clones `url` into `into_dir`.
    fn clone_repo(&self, url: &str, into_dir: &Path) -> VcsResult<()>;

    /// Checks out `reference` (branch, tag or commit).
    fn checkout(&self, repo_dir: &Path, reference: &str) -> VcsResult<()>;

    /// Hard resets the working tree to `origin/<reference>`.
    fn reset_hard(&self, repo_dir: &Path, reference: &str) -> VcsResult<()>;

    /// Returns the commit hash HEAD points to.
    fn head_commit(&self, repo_dir: &Path) -> VcsResult<String>;
}

/// [`VcsClient`] backed by libgit2.
#[derive(Debug)]
pub struct Git2Client {
    ssh_key: Option<PathBuf>,
}

impl Default for Git2Client {
    fn default() -> Self {
        Git2Client::new()
    }
}

impl Git2Client {
    pub fn new() -> Self {
        Self { ssh_key: dirs::home_dir().map(|home| home.join(".ssh").join("id_rsa")) }
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut callbacks = RemoteCallbacks::new();
        let mut credentials = CredentialProvider::new(self.ssh_key.as_deref());
        callbacks.credentials(move |_url, username_from_url, _allowed_types| {
            credentials.next(username_from_url.unwrap_or("git"))
        });

        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);
        fetch_opts
    }
}

/// Hands out credentials to libgit2, which asks again after every rejection.
/// Only one attempt is made so a rejected key fails instead of looping.
struct CredentialProvider<'a> {
    ssh_key: Option<&'a Path>,
    attempts: u32,
}

impl<'a> CredentialProvider<'a> {
    fn new(ssh_key: Option<&'a Path>) -> Self {
        Self { ssh_key, attempts: 0 }
    }

    fn next(&mut self, username: &str) -> Result<Cred, git2::Error> {
        self.attempts += 1;
        if self.attempts > 1 {
            return Err(git2::Error::from_str("authentication failed: credentials were rejected"));
        }
        match self.ssh_key {
            Some(key) => Cred::ssh_key(username, None, key, None),
            None => Cred::default(),
        }
    }
}

impl VcsClient for Git2Client {
    fn fetch(&self, repo_dir: &Path) -> VcsResult<()> {
        debug!("Fetching '{}'.", repo_dir.display());
        let repo = Repository::open(repo_dir)?;
        let mut remote = repo.find_remote(DEFAULT_REMOTE)?;
        let mut fetch_opts = self.fetch_options();
        fetch_opts.prune(FetchPrune::On);
        remote.fetch(&[] as &[&str], Some(&mut fetch_opts), None)?;
        Ok(())
    }

    fn clone_repo(&self, url: &str, into_dir: &Path) -> VcsResult<()> {
        debug!("Cloning '{}' to '{}'.", url, into_dir.display());
        let mut builder = RepoBuilder::new();
        builder.fetch_options(self.fetch_options());
        builder.clone(url, into_dir)?;
        Ok(())
    }

    fn checkout(&self, repo_dir: &Path, reference: &str) -> VcsResult<()> {
        debug!("Checking out '{}' in '{}'.", reference, repo_dir.display());
        let repo = Repository::open(repo_dir)?;

        let (object, reference) = match repo.revparse_ext(reference) {
            Ok(found) => found,
            // Like `git checkout <branch>`, create a local branch tracking
            // the remote one when only the latter exists.
            Err(err) if err.code() == ErrorCode::NotFound => {
                let remote_name = format!("{DEFAULT_REMOTE}/{reference}");
                let remote_branch = repo.find_branch(&remote_name, BranchType::Remote)?;
                let commit = remote_branch.get().peel_to_commit()?;
                let mut branch = repo.branch(reference, &commit, false)?;
                branch.set_upstream(Some(&remote_name))?;
                (commit.into_object(), Some(branch.into_reference()))
            }
            Err(err) => return Err(err.into()),
        };

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        repo.checkout_tree(&object, Some(&mut checkout))?;

        match reference.as_ref().and_then(|r| r.name()) {
            Some(name) => repo.set_head(name)?,
            None => repo.set_head_detached(object.id())?,
        }
        Ok(())
    }

    fn reset_hard(&self, repo_dir: &Path, reference: &str) -> VcsResult<()> {
        debug!("Resetting '{}' to '{DEFAULT_REMOTE}/{reference}'.", repo_dir.display());
        let repo = Repository::open(repo_dir)?;
        let target = repo.revparse_single(&format!("{DEFAULT_REMOTE}/{reference}"))?;
        repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }

    fn head_commit(&self, repo_dir: &Path) -> VcsResult<String> {
        let repo = Repository::open(repo_dir)?;
        let commit = repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}
