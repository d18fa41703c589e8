//! Checklist artifact storage.
//!
//! # Responsibility
//! - Read, overwrite and remove the single checklist document shared between
//!   runs and the human editor.
//!
//! # Invariants
//! - An absent document reads as `None`, never as an error.
//! - Overwrites are whole-file and atomic (temp file + rename).
//! - I/O failures are returned unchanged; nothing is retried.

use log::{error, info};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Storage contract for the checklist document.
pub trait ChecklistStore {
    /// Returns current contents, or `None` when no checklist exists.
    fn read(&self) -> io::Result<Option<String>>;
    /// Replaces the whole document.
    fn write(&self, contents: &str) -> io::Result<()>;
    /// Deletes the document. Removing an absent document is not an error.
    fn remove(&self) -> io::Result<()>;
    /// Human-readable location used in messages.
    fn location(&self) -> String;
}

impl<S: ChecklistStore + ?Sized> ChecklistStore for &S {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        (**self).write(contents)
    }

    fn remove(&self) -> io::Result<()> {
        (**self).remove()
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Checklist stored as one markdown file on disk.
#[derive(Debug, Clone)]
pub struct FileChecklistStore {
    path: PathBuf,
}

impl FileChecklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|value| value.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ChecklistStore for FileChecklistStore {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                error!(
                    "event=checklist_read module=repo status=error path={} error={}",
                    self.path.display(),
                    err
                );
                Err(err)
            }
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        let result = fs::write(&temp, contents).and_then(|()| fs::rename(&temp, &self.path));
        match &result {
            Ok(()) => info!(
                "event=checklist_write module=repo status=ok path={} bytes={}",
                self.path.display(),
                contents.len()
            ),
            Err(err) => {
                let _ = fs::remove_file(&temp);
                error!(
                    "event=checklist_write module=repo status=error path={} error={}",
                    self.path.display(),
                    err
                );
            }
        }
        result
    }

    fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(
                    "event=checklist_remove module=repo status=ok path={}",
                    self.path.display()
                );
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process checklist used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryChecklistStore {
    contents: RefCell<Option<String>>,
}

impl MemoryChecklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store as if a human had saved `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    /// Current contents without going through the trait.
    pub fn snapshot(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Replaces contents, simulating a human edit.
    pub fn edit(&self, contents: impl Into<String>) {
        *self.contents.borrow_mut() = Some(contents.into());
    }
}

impl ChecklistStore for MemoryChecklistStore {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> io::Result<()> {
        *self.contents.borrow_mut() = None;
        Ok(())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
