//! Template-supplied logic: context generation before rendering and
//! finalization after it.
//!
//! Both are narrow traits. A template provides them as executable scripts
//! next to its tree (`initialize`, `finalize`, with any extension); library
//! users may plug in Rust implementations instead.

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::constants::NO_INPUT_ENV;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Produces the template context.
pub trait ContextGenerator {
    fn generate_context(
        &self,
        non_interactive: bool,
        prompter: &dyn Prompter,
    ) -> Result<IndexMap<String, serde_json::Value>>;
}

impl<F> ContextGenerator for F
where
    F: Fn(bool, &dyn Prompter) -> Result<IndexMap<String, serde_json::Value>>,
{
    fn generate_context(
        &self,
        non_interactive: bool,
        prompter: &dyn Prompter,
    ) -> Result<IndexMap<String, serde_json::Value>> {
        self(non_interactive, prompter)
    }
}

/// Adjusts the generated tree once every file has been written.
pub trait Finalizer {
    fn finalize(&self, context: &Context, output_dir: &Path) -> Result<()>;
}

impl<F> Finalizer for F
where
    F: Fn(&Context, &Path) -> Result<()>,
{
    fn finalize(&self, context: &Context, output_dir: &Path) -> Result<()> {
        self(context, output_dir)
    }
}

/// Payload written to the finalize script's stdin.
#[derive(Serialize)]
pub struct Output<'a> {
    pub template_dir: &'a str,
    pub output_dir: &'a str,
    pub context: &'a Context,
}

/// Locates the script named `stem` (`initialize`, `initialize.py`, ...) at the
/// root of the template. The first match in lexical order wins.
///
/// Only executable files count: on unix a file needs an execute bit, so a
/// `finalize.md` next to the real script is ignored. Elsewhere the file needs
/// an `exe`, `bat` or `cmd` extension.
pub fn find_script<P: AsRef<Path>>(template_dir: P, stem: &str) -> Result<Option<PathBuf>> {
    let template_dir = template_dir.as_ref();
    let mut candidates: Vec<PathBuf> = fs::read_dir(template_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.file_stem().and_then(|s| s.to_str()) == Some(stem))
        .filter(|path| {
            let executable = is_executable(path);
            if !executable {
                debug!("Ignoring '{}': it is not executable.", path.display());
            }
            executable
        })
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ["exe", "bat", "cmd"].contains(&ext.to_ascii_lowercase().as_str()))
}

fn script_name(script: &Path) -> String {
    script.display().to_string()
}

/// Runs a template's `initialize` script.
///
/// The script inherits stdin and stderr so it can talk to the user, learns
/// whether that is allowed from the `PYTEMPLATOR_NO_INPUT` variable, and
/// prints the context as a JSON object on stdout.
#[derive(Debug)]
pub struct ScriptInitializer {
    script: PathBuf,
    template_dir: PathBuf,
}

impl ScriptInitializer {
    pub fn new<P: Into<PathBuf>>(script: P, template_dir: P) -> Self {
        Self { script: script.into(), template_dir: template_dir.into() }
    }
}

impl ContextGenerator for ScriptInitializer {
    fn generate_context(
        &self,
        non_interactive: bool,
        _prompter: &dyn Prompter,
    ) -> Result<IndexMap<String, serde_json::Value>> {
        debug!("Running initializer '{}'.", self.script.display());
        let child = Command::new(&self.script)
            .current_dir(&self.template_dir)
            .env(NO_INPUT_ENV, if non_interactive { "1" } else { "0" })
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                Error::BrokenTemplate(format!(
                    "the initializer '{}' could not be executed: {e}",
                    script_name(&self.script)
                ))
            })?;

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::HookError {
                script: script_name(&self.script),
                status: output.status.to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            Error::BrokenTemplate(format!(
                "the initializer '{}' did not print a JSON object: {e}",
                script_name(&self.script)
            ))
        })
    }
}

/// Runs a template's `finalize` script inside the output directory.
///
/// The script receives the output directory as its first argument and an
/// [`Output`] document on stdin.
#[derive(Debug)]
pub struct ScriptFinalizer {
    script: PathBuf,
    template_dir: PathBuf,
}

impl ScriptFinalizer {
    pub fn new<P: Into<PathBuf>>(script: P, template_dir: P) -> Self {
        Self { script: script.into(), template_dir: template_dir.into() }
    }
}

impl Finalizer for ScriptFinalizer {
    fn finalize(&self, context: &Context, output_dir: &Path) -> Result<()> {
        debug!("Running finalizer '{}'.", self.script.display());
        let template_dir = self.template_dir.display().to_string();
        let output_dir_str = output_dir.display().to_string();
        let payload = serde_json::to_vec(&Output {
            template_dir: &template_dir,
            output_dir: &output_dir_str,
            context,
        })?;

        let mut child = Command::new(&self.script)
            .arg(output_dir)
            .current_dir(output_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A script that ignores its input may exit before reading it.
            if let Err(e) = stdin.write_all(&payload) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(Error::HookError {
                script: script_name(&self.script),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_serialization() {
        let mut context = Context::new();
        context.insert("key", serde_json::json!("value"));
        let output = Output {
            template_dir: "/path/to/template",
            output_dir: "/path/to/output",
            context: &context,
        };

        let serialized = serde_json::to_string(&output).unwrap();
        assert_eq!(
            serialized,
            r#"{"template_dir":"/path/to/template","output_dir":"/path/to/output","context":{"key":"value"}}"#
        );
    }

    #[cfg(unix)]
    mod scripts {
        use super::*;
        use crate::prompt::DialoguerPrompter;
        use std::os::unix::fs::PermissionsExt;

        fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_find_script_matches_executable_stem() {
            let tmp = TempDir::new().unwrap();
            assert!(find_script(tmp.path(), "initialize").unwrap().is_none());

            write_script(tmp.path(), "initialize.sh", "");
            write_script(tmp.path(), "initialize.py", "");
            fs::create_dir(tmp.path().join("finalize")).unwrap();

            assert_eq!(
                find_script(tmp.path(), "initialize").unwrap(),
                Some(tmp.path().join("initialize.py"))
            );
            assert!(find_script(tmp.path(), "finalize").unwrap().is_none());
        }

        #[test]
        fn test_find_script_skips_non_executable_files() {
            let tmp = TempDir::new().unwrap();
            fs::write(tmp.path().join("finalize.md"), "# Notes").unwrap();
            assert!(find_script(tmp.path(), "finalize").unwrap().is_none());

            write_script(tmp.path(), "finalize.sh", "#!/bin/sh\n");
            assert_eq!(
                find_script(tmp.path(), "finalize").unwrap(),
                Some(tmp.path().join("finalize.sh"))
            );
        }

        #[test]
        fn test_initializer_output_becomes_context() {
            let tmp = TempDir::new().unwrap();
            let script = write_script(
                tmp.path(),
                "initialize",
                "#!/bin/sh\necho \"{\\\"b\\\": \\\"$PYTEMPLATOR_NO_INPUT\\\", \\\"a\\\": 1}\"\n",
            );
            let initializer = ScriptInitializer::new(script, tmp.path().to_path_buf());
            let context = initializer.generate_context(true, &DialoguerPrompter::new()).unwrap();
            let keys: Vec<&str> = context.keys().map(String::as_str).collect();
            assert_eq!(keys, ["b", "a"]);
            assert_eq!(context["b"], serde_json::json!("1"));
        }

        #[test]
        fn test_initializer_without_json_is_broken() {
            let tmp = TempDir::new().unwrap();
            let script = write_script(tmp.path(), "initialize", "#!/bin/sh\necho nope\n");
            let initializer = ScriptInitializer::new(script, tmp.path().to_path_buf());
            let result = initializer.generate_context(true, &DialoguerPrompter::new());
            assert!(matches!(result, Err(Error::BrokenTemplate(_))));
        }

        #[test]
        fn test_failing_finalizer_reports_status() {
            let tmp = TempDir::new().unwrap();
            let script = write_script(tmp.path(), "finalize", "#!/bin/sh\nexit 3\n");
            let finalizer = ScriptFinalizer::new(script, tmp.path().to_path_buf());
            let result = finalizer.finalize(&Context::new(), tmp.path());
            assert!(matches!(result, Err(Error::HookError { .. })));
        }

        #[test]
        fn test_finalizer_runs_in_output_dir() {
            let tmp = TempDir::new().unwrap();
            let output = TempDir::new().unwrap();
            let script = write_script(
                tmp.path(),
                "finalize",
                "#!/bin/sh\ncat > received.json\ntouch \"$1/done\"\n",
            );
            let finalizer = ScriptFinalizer::new(script, tmp.path().to_path_buf());
            let mut context = Context::new();
            context.insert("remove_test1_file", serde_json::json!(true));
            finalizer.finalize(&context, output.path()).unwrap();

            assert!(output.path().join("done").exists());
            let received = fs::read_to_string(output.path().join("received.json")).unwrap();
            assert!(received.contains(r#""context":{"remove_test1_file":true}"#));
        }
    }
}
