//! Pytemplator is a project scaffolding system.
//! It fetches a template (git repository or local directory), resolves its
//! context from template-supplied logic or a declarative question file,
//! renders the template tree and records how the project was generated.

/// Command-line interface module for pytemplator
pub mod cli;

/// Run configuration shared by the command line and library callers
pub mod config;

/// Names and patterns pytemplator reserves
pub mod constants;

/// The answers a template is rendered with
pub mod context;

/// Error types and handling for pytemplator
pub mod error;

/// Template-supplied logic run before and after rendering
/// Handles execution of the `initialize` and `finalize` scripts
pub mod hooks;

/// Template acquisition from git repositories or local paths
pub mod loader;

/// Logging setup for the binary
pub mod logger;

/// The `.pytemplator.yml` record written into generated projects
pub mod manifest;

/// Rendering of the template tree into the destination directory
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Question primitives for programmatic context generation
pub mod question;

/// Template engine abstraction
pub mod renderer;

/// Context resolution strategies
pub mod resolver;

/// Orchestration of a whole templating run
pub mod templator;

/// Version control operations used by the git loader
pub mod vcs;

/// Copy-without-render pattern handling
pub mod verbatim;
