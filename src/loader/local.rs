use crate::error::{Error, Result};
use crate::loader::interface::TemplateLoader;
use log::debug;
use std::path::{Path, PathBuf};

/// Loader for templates from the local filesystem.
///
/// The directory is used as it is: no version control operation is ever run
/// against it, since it may be the user's own working tree.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    /// Creates a new LocalLoader instance.
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    /// Resolves the template directory to an absolute path.
    ///
    /// # Errors
    /// * `Error::InvalidInput` if the path doesn't exist or is not a directory
    fn load(&self) -> Result<PathBuf> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(Error::InvalidInput(format!(
                "the template directory '{}' does not exist",
                path.display()
            )));
        }
        let path = path.canonicalize()?;
        debug!("Using local template '{}'.", path.display());
        Ok(path)
    }
}
