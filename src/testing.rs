//! Test doubles for the external collaborators: attribute store, status surface, clipboard.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::anyhow;

use crate::attrs::{AttributeStore, SUMMARY_ATTR, TYPE_ATTR};
use crate::clipboard::Clipboard;
use crate::surface::StatusSurface;

/// Attribute store backed by a map instead of xattrs.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<(PathBuf, String), Vec<u8>>>,
    failing: Mutex<HashSet<PathBuf>>,
}

impl MemoryStore {
    pub fn set(&self, path: &Path, name: &str, value: &str) {
        self.set_bytes(path, name, value.as_bytes());
    }

    pub fn set_bytes(&self, path: &Path, name: &str, value: &[u8]) {
        self.values
            .lock()
            .unwrap()
            .insert((path.to_path_buf(), name.to_string()), value.to_vec());
    }

    /// Tag `path` as a code artifact with the given summary.
    pub fn tag_code(&self, path: &Path, summary: &str) {
        self.set(path, TYPE_ATTR, "code");
        self.set(path, SUMMARY_ATTR, summary);
    }

    pub fn fail_reads(&self, path: &Path) {
        self.failing.lock().unwrap().insert(path.to_path_buf());
    }
}

impl AttributeStore for MemoryStore {
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        if self.failing.lock().unwrap().contains(path) {
            return Err(io::Error::other("simulated attribute failure"));
        }
        Ok(self
            .values
            .lock()
            .unwrap()
            .get(&(path.to_path_buf(), name.to_string()))
            .cloned())
    }
}

/// Status surface that records every label it was given.
#[derive(Default)]
pub struct RecordingSurface {
    labels: Mutex<Vec<String>>,
}

impl RecordingSurface {
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().unwrap().clone()
    }

    pub fn last_label(&self) -> Option<String> {
        self.labels.lock().unwrap().last().cloned()
    }
}

impl StatusSurface for RecordingSurface {
    fn set_label(&self, text: &str) {
        self.labels.lock().unwrap().push(text.to_string());
    }
}

/// In-process clipboard that counts writes.
#[derive(Default)]
pub struct FakeClipboard {
    contents: Mutex<String>,
    writes: Mutex<Vec<String>>,
}

impl FakeClipboard {
    pub fn contents(&self) -> String {
        self.contents.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    /// Simulate another application replacing the clipboard contents.
    pub fn replace_externally(&self, text: &str) {
        *self.contents.lock().unwrap() = text.to_string();
    }
}

impl Clipboard for FakeClipboard {
    fn write_text(&self, text: &str) -> anyhow::Result<()> {
        *self.contents.lock().unwrap() = text.to_string();
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn read_text(&self) -> anyhow::Result<String> {
        Ok(self.contents())
    }
}

/// Clipboard whose every operation fails.
pub struct BrokenClipboard;

impl Clipboard for BrokenClipboard {
    fn write_text(&self, _text: &str) -> anyhow::Result<()> {
        Err(anyhow!("no clipboard"))
    }

    fn read_text(&self) -> anyhow::Result<String> {
        Err(anyhow!("no clipboard"))
    }
}
