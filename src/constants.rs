//! Common constants used throughout pytemplator.

use regex::Regex;
use std::sync::LazyLock;

/// Matches template locations that must be fetched with git: `git://`,
/// `ssh://`, `http(s)://` URLs and the scp-like `user@host:path` form.
pub static GIT_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((git|ssh|https?)|([\w.\-]+@[\w.\-]+))(:(//)?)([\w.@:/\-~]+)(\.git)?(/)?$")
        .expect("git url pattern is valid")
});

/// Top-level template directories that are never rendered.
pub const RESERVED_DIR_NAMES: [&str; 3] = ["hooks", "__pycache__", ".git"];

/// Sub-directory holding the renderable tree, when the template provides one.
pub const TEMPLATES_DIR: &str = "templates";

/// Declarative question file used when no initializer script exists.
pub const QUESTION_FILE: &str = "cookiecutter.json";

/// Stem of the context-generation script.
pub const INITIALIZE_SCRIPT: &str = "initialize";

/// Stem of the post-render script.
pub const FINALIZE_SCRIPT: &str = "finalize";

/// Namespaces under which the whole context is visible to templates.
pub const CONTEXT_ALIASES: [&str; 2] = ["pytemplator", "cookiecutter"];

/// Context key holding the globs of files copied without rendering.
pub const COPY_WITHOUT_RENDER_KEY: &str = "_copy_without_render";

/// Manifest written at the root of the destination directory.
pub const MANIFEST_FILE: &str = ".pytemplator.yml";

/// Environment variable telling an initializer script whether it may prompt.
pub const NO_INPUT_ENV: &str = "PYTEMPLATOR_NO_INPUT";

/// Remote the checkout recovery resets against.
pub const DEFAULT_REMOTE: &str = "origin";

/// Ref checked out when none is supplied.
pub const DEFAULT_CHECKOUT_REF: &str = "master";
