//! Template acquisition: turns a template location (git URL or local path)
//! into a directory that can be rendered.

use crate::error::Result;
use crate::loader::git::GitLoader;
use crate::loader::interface::TemplateLoader;
use crate::loader::local::LocalLoader;
use crate::prompt::Prompter;
use crate::vcs::VcsClient;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub mod git;
pub mod interface;
pub mod local;

/// Represents the location a template is loaded from.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateLocation {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS, SSH or git protocol)
    Git(String),
}

impl std::fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateLocation::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            TemplateLocation::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl TemplateLocation {
    pub fn parse(s: &str) -> Self {
        if GitLoader::<&str>::is_git_url(s) {
            Self::Git(s.to_string())
        } else {
            Self::FileSystem(PathBuf::from(s))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, TemplateLocation::Git(_))
    }
}

/// An acquired template. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    /// Location as given by the user.
    pub location: String,
    /// Whether the template was fetched with git.
    pub is_remote: bool,
    /// Existing, absolute directory holding the template.
    pub local_directory: PathBuf,
}

/// Options controlling how a template is acquired.
pub struct AcquireOptions<'a> {
    pub base_dir: &'a Path,
    pub checkout_ref: &'a str,
    pub non_interactive: bool,
}

/// Resolves `location` into a usable local directory.
///
/// Git templates are cached under `base_dir` (created if needed) and synced
/// to `checkout_ref`; local directories are used untouched.
pub fn acquire(
    vcs: &dyn VcsClient,
    prompter: &dyn Prompter,
    location: &str,
    options: &AcquireOptions<'_>,
) -> Result<TemplateSource> {
    fs::create_dir_all(options.base_dir)?;

    let template_location = TemplateLocation::parse(location);
    info!("Using template from the {}", template_location);

    let is_remote = template_location.is_remote();
    let loader: Box<dyn TemplateLoader + '_> = match template_location {
        TemplateLocation::Git(repo) => Box::new(GitLoader::new(
            vcs,
            prompter,
            repo,
            options.base_dir,
            options.checkout_ref,
            options.non_interactive,
        )),
        TemplateLocation::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };

    let local_directory = loader.load()?;
    Ok(TemplateSource { location: location.to_string(), is_remote, local_directory })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_location_display() {
        let fs_source = TemplateLocation::FileSystem(PathBuf::from("/path/to/template"));
        assert_eq!(format!("{}", fs_source), "local path: '/path/to/template'");

        let git_source = TemplateLocation::Git("git@github.com:user/repo".to_string());
        assert_eq!(format!("{}", git_source), "git repository: 'git@github.com:user/repo'");
    }

    #[test]
    fn test_template_location_parse() {
        assert_eq!(
            TemplateLocation::parse("https://github.com/user/repo.git"),
            TemplateLocation::Git("https://github.com/user/repo.git".to_string())
        );
        assert_eq!(
            TemplateLocation::parse("./local/path"),
            TemplateLocation::FileSystem(PathBuf::from("./local/path"))
        );
    }
}
