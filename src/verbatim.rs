//! Files copied byte-for-byte instead of being rendered.
//! Templates list them as glob patterns under the `_copy_without_render`
//! context key, typically for binary assets or files that contain template
//! syntax of their own.

use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

/// Compiles the copy-without-render patterns into a set.
///
/// Patterns may contain template expressions; callers render them against the
/// context first, since `{` and `}` are glob alternation syntax. The set is
/// then matched against rendered output paths.
///
/// # Arguments
/// * `patterns` - Rendered glob patterns, relative to the template root
///
/// # Returns
/// * `Result<GlobSet>` - Compiled set; empty when there are no patterns
///
/// # Example
/// ```ignore
/// "_copy_without_render": ["*.png", "static/**", "{{ project }}/vendor/*"]
/// ```
pub fn build_verbatim_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        debug!("Copying without rendering: {}", pattern);
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
