//! Per-workspace session state persisted between hook invocations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::common::debug::debug_log;

/// State carried across hook processes for one workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredState")]
pub struct SessionState {
    /// The session-start signal has been sent
    pub session_started: bool,
    /// Last title pushed via rename-workspace
    pub last_title: Option<String>,
}

/// On-disk shape, accepting the legacy `started`/`title` keys alongside the
/// current ones. Current keys win when both are present.
#[derive(Deserialize, Default)]
#[serde(default)]
struct StoredState {
    #[serde(rename = "sessionStarted")]
    session_started: Option<bool>,
    started: Option<bool>,
    #[serde(rename = "lastTitle")]
    last_title: Option<String>,
    title: Option<String>,
}

impl From<StoredState> for SessionState {
    fn from(stored: StoredState) -> Self {
        Self {
            session_started: stored.session_started.or(stored.started).unwrap_or(false),
            last_title: stored.last_title.or(stored.title),
        }
    }
}

/// Load/save of [`SessionState`], keyed by workspace id.
pub trait StateStore {
    /// Missing or unreadable state loads as a fresh default.
    fn load(&self, workspace: &str) -> SessionState;
    fn save(&self, workspace: &str, state: &SessionState) -> Result<()>;
    /// Removing state that does not exist is not an error.
    fn remove(&self, workspace: &str) -> Result<()>;
}

/// Stores state as `cmux-copilot-<id>.json` files in one directory.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the state file for a workspace
    pub fn path_for(&self, workspace: &str) -> PathBuf {
        self.dir
            .join(format!("cmux-copilot-{}.json", sanitize_workspace_id(workspace)))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, workspace: &str) -> SessionState {
        let path = self.path_for(workspace);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    debug_log(&format!("state read failed for {}: {}", path.display(), err));
                }
                return SessionState::default();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|err| {
            debug_log(&format!("ignoring corrupt state {}: {}", path.display(), err));
            SessionState::default()
        })
    }

    fn save(&self, workspace: &str, state: &SessionState) -> Result<()> {
        let path = self.path_for(workspace);
        let json = serde_json::to_string(state).context("Failed to serialize session state")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write state to {}", path.display()))
    }

    fn remove(&self, workspace: &str) -> Result<()> {
        let path = self.path_for(workspace);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove state {}", path.display()))
            }
        }
    }
}

/// Map a workspace id to a filename-safe fragment
pub fn sanitize_workspace_id(workspace: &str) -> String {
    workspace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
pub mod memory {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store for handler tests
    #[derive(Default)]
    pub struct MemoryStateStore {
        pub states: RefCell<HashMap<String, SessionState>>,
        pub removals: RefCell<Vec<String>>,
    }

    impl MemoryStateStore {
        pub fn get(&self, workspace: &str) -> Option<SessionState> {
            self.states.borrow().get(workspace).cloned()
        }

        pub fn insert(&self, workspace: &str, state: SessionState) {
            self.states.borrow_mut().insert(workspace.to_string(), state);
        }
    }

    impl StateStore for MemoryStateStore {
        fn load(&self, workspace: &str) -> SessionState {
            self.get(workspace).unwrap_or_default()
        }

        fn save(&self, workspace: &str, state: &SessionState) -> Result<()> {
            self.insert(workspace, state.clone());
            Ok(())
        }

        fn remove(&self, workspace: &str) -> Result<()> {
            self.states.borrow_mut().remove(workspace);
            self.removals.borrow_mut().push(workspace.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_sanitize_workspace_id() {
        assert_eq!(sanitize_workspace_id("workspace:1"), "workspace_1");
        assert_eq!(sanitize_workspace_id("a/b c"), "a_b_c");
        assert_eq!(sanitize_workspace_id("../etc"), ".._etc");
        assert_eq!(sanitize_workspace_id("AB-12_x.y"), "AB-12_x.y");
    }

    #[test]
    fn test_path_stays_in_dir() {
        let (dir, store) = store();
        let path = store.path_for("../../escape");
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn test_missing_state_is_default() {
        let (_dir, store) = store();
        assert_eq!(store.load("ws"), SessionState::default());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        let state = SessionState {
            session_started: true,
            last_title: Some("myapp — Refactor".to_string()),
        };
        store.save("workspace:7", &state).unwrap();
        assert_eq!(store.load("workspace:7"), state);
    }

    #[test]
    fn test_saved_keys_are_camel_case() {
        let (_dir, store) = store();
        let state = SessionState {
            session_started: true,
            last_title: None,
        };
        store.save("ws", &state).unwrap();
        let raw = fs::read_to_string(store.path_for("ws")).unwrap();
        assert!(raw.contains("\"sessionStarted\":true"));
        assert!(raw.contains("\"lastTitle\":null"));
    }

    #[test]
    fn test_legacy_keys_accepted() {
        let (_dir, store) = store();
        fs::write(store.path_for("ws"), r#"{"started": true, "title": "old"}"#).unwrap();
        let state = store.load("ws");
        assert!(state.session_started);
        assert_eq!(state.last_title.as_deref(), Some("old"));
    }

    #[test]
    fn test_mixed_legacy_and_current_keys() {
        let (_dir, store) = store();
        fs::write(
            store.path_for("ws"),
            r#"{"started": false, "sessionStarted": true, "title": "old", "lastTitle": "new"}"#,
        )
        .unwrap();
        assert_eq!(
            store.load("ws"),
            SessionState {
                session_started: true,
                last_title: Some("new".to_string()),
            }
        );

        fs::write(
            store.path_for("ws"),
            r#"{"started": true, "sessionStarted": true, "title": "old", "lastTitle": null}"#,
        )
        .unwrap();
        let state = store.load("ws");
        assert!(state.session_started);
        assert_eq!(state.last_title.as_deref(), Some("old"));
    }

    #[test]
    fn test_corrupt_state_is_default() {
        let (_dir, store) = store();
        fs::write(store.path_for("ws"), "{truncated").unwrap();
        assert_eq!(store.load("ws"), SessionState::default());
        fs::write(store.path_for("ws"), "[]").unwrap();
        assert_eq!(store.load("ws"), SessionState::default());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let (_dir, store) = store();
        assert!(store.remove("never-written").is_ok());
    }

    #[test]
    fn test_remove_deletes_file() {
        let (_dir, store) = store();
        store.save("ws", &SessionState::default()).unwrap();
        assert!(store.path_for("ws").exists());
        store.remove("ws").unwrap();
        assert!(!store.path_for("ws").exists());
    }
}
