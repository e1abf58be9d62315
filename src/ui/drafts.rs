//! Best-effort local copies of unsaved form input.
//!
//! One JSON file per form. Failures are logged and otherwise ignored:
//! a lost draft never blocks the form.

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::UserId;

use super::editor::UserForm;

/// Which form a draft belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DraftKey {
    New,
    Edit(UserId),
}

impl DraftKey {
    fn file_name(&self) -> String {
        match self {
            Self::New => "new.json".to_string(),
            Self::Edit(id) => format!("edit-{}.json", encode_id(id.as_str())),
        }
    }
}

/// Ids are opaque; keep file names portable.
fn encode_id(id: &str) -> String {
    id.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: Option<PathBuf>,
}

impl DraftStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir: Some(dir) }
    }

    /// A store that keeps nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn path(&self, key: &DraftKey) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(key.file_name()))
    }

    pub fn load(&self, key: &DraftKey) -> Option<UserForm> {
        let path = self.path(key)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read draft");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(form) => {
                tracing::debug!(path = %path.display(), "Restored draft");
                Some(form)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Ignoring corrupt draft");
                None
            }
        }
    }

    pub fn save(&self, key: &DraftKey, form: &UserForm) {
        let Some(path) = self.path(key) else {
            return;
        };
        let result = serde_json::to_string_pretty(form)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, json)
            });
        if let Err(err) = result {
            tracing::warn!(path = %path.display(), error = %err, "Failed to save draft");
        }
    }

    pub fn clear(&self, key: &DraftKey) {
        let Some(path) = self.path(key) else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Cleared draft"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to clear draft");
            }
        }
    }
}
