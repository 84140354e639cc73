//! Record of a templating run, written at the root of the generated project
//! so it can be re-templated later.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::MANIFEST_FILE;
use crate::context::Context;
use crate::error::Result;

const HEADER: &str = "\
# Generated by pytemplator. This file records the template and the answers
# used to generate this project, so it can be re-templated later.
# Edit it only if you know what you are doing.
";

/// Persisted parameters of a templating run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub pytemplator_version: String,
    pub template_location: String,
    pub checkout_branch: String,
    pub template_commit: Option<String>,
    pub context: Context,
}

impl Manifest {
    /// Path of the manifest inside `destination_dir`.
    pub fn path<P: AsRef<Path>>(destination_dir: P) -> PathBuf {
        destination_dir.as_ref().join(MANIFEST_FILE)
    }

    /// Reads the manifest stored in `destination_dir`.
    pub fn load<P: AsRef<Path>>(destination_dir: P) -> Result<Self> {
        let content = fs::read_to_string(Self::path(destination_dir))?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Writes the manifest into `destination_dir`, replacing any previous one.
    pub fn write<P: AsRef<Path>>(&self, destination_dir: P) -> Result<PathBuf> {
        let path = Self::path(destination_dir);
        let body = serde_yaml::to_string(self)?;
        fs::write(&path, format!("{HEADER}{body}"))?;
        debug!("Manifest written to '{}'", path.display());
        Ok(path)
    }
}

/// Writes the manifest of a finished run. The context is stored without its
/// alias namespaces.
pub fn record(
    destination_dir: &Path,
    tool_version: &str,
    template_location: &str,
    checkout_ref: &str,
    template_commit: Option<&str>,
    context: &Context,
) -> Result<PathBuf> {
    Manifest {
        pytemplator_version: tool_version.to_string(),
        template_location: template_location.to_string(),
        checkout_branch: checkout_ref.to_string(),
        template_commit: template_commit.map(str::to_string),
        context: context.clone(),
    }
    .write(destination_dir)
}
