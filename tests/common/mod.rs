#![allow(dead_code)]

use pytemplator::error::Result;
use pytemplator::prompt::Prompter;
use pytemplator::vcs::{VcsClient, VcsError, VcsResult};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub fn fixture<P: AsRef<Path>>(name: P) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Replies from queues and falls back to the offered default once a queue is
/// exhausted. Every prompt shown is recorded.
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    pub confirms: Rc<RefCell<VecDeque<bool>>>,
    pub inputs: Rc<RefCell<VecDeque<String>>>,
    pub asked: Rc<RefCell<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn with_confirms(replies: &[bool]) -> Self {
        let prompter = Self::default();
        prompter.confirms.borrow_mut().extend(replies.iter().copied());
        prompter
    }

    pub fn with_inputs(replies: &[&str]) -> Self {
        let prompter = Self::default();
        prompter.inputs.borrow_mut().extend(replies.iter().map(|r| r.to_string()));
        prompter
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self.confirms.borrow_mut().pop_front().unwrap_or(default))
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(self
            .inputs
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| default.unwrap_or_default().to_string()))
    }

    fn select(&self, prompt: &str, _choices: &[String], default: usize) -> Result<usize> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok(default)
    }
}

/// Version control double. `clone_repo` copies `source` into the target
/// directory; every call is logged as `"<operation> <argument>"`.
#[derive(Clone, Default)]
pub struct MockVcs {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub source: Option<PathBuf>,
    pub fail_fetch: bool,
    pub fail_clone: bool,
    pub fail_reset: bool,
    /// Number of upcoming checkouts that fail.
    pub failing_checkouts: Rc<Cell<usize>>,
    pub commit: Option<String>,
}

impl MockVcs {
    pub fn cloning(source: PathBuf) -> Self {
        Self { source: Some(source), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl VcsClient for MockVcs {
    fn fetch(&self, repo_dir: &Path) -> VcsResult<()> {
        self.log(format!("fetch {}", dir_name(repo_dir)));
        if self.fail_fetch {
            return Err(VcsError::Failed("network unreachable".to_string()));
        }
        Ok(())
    }

    fn clone_repo(&self, url: &str, into_dir: &Path) -> VcsResult<()> {
        self.log(format!("clone {url}"));
        if self.fail_clone {
            return Err(VcsError::NotFound(url.to_string()));
        }
        match &self.source {
            Some(source) => copy_dir(source, into_dir)
                .map_err(|e| VcsError::Failed(e.to_string())),
            None => fs::create_dir_all(into_dir).map_err(|e| VcsError::Failed(e.to_string())),
        }
    }

    fn checkout(&self, _repo_dir: &Path, reference: &str) -> VcsResult<()> {
        self.log(format!("checkout {reference}"));
        let failing = self.failing_checkouts.get();
        if failing > 0 {
            self.failing_checkouts.set(failing - 1);
            return Err(VcsError::NotFound(reference.to_string()));
        }
        Ok(())
    }

    fn reset_hard(&self, _repo_dir: &Path, reference: &str) -> VcsResult<()> {
        self.log(format!("reset origin/{reference}"));
        if self.fail_reset {
            return Err(VcsError::NotFound(format!("origin/{reference}")));
        }
        Ok(())
    }

    fn head_commit(&self, repo_dir: &Path) -> VcsResult<String> {
        self.log(format!("head {}", dir_name(repo_dir)));
        self.commit.clone().ok_or_else(|| VcsError::NotFound("HEAD".to_string()))
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

pub fn copy_dir(source: &Path, target: &Path) -> std::io::Result<()> {
    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let destination = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &destination)?;
        } else {
            fs::copy(entry.path(), destination)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}
