use crate::error::Result;
use std::path::PathBuf;

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Makes the template available locally.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Absolute path to the usable template directory
    fn load(&self) -> Result<PathBuf>;
}
