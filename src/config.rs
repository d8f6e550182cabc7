//! Runtime configuration resolved from arguments and environment.

use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_BUNDLE_ID: &str = "com.cmuxterm.app";

/// Where the cmux app bundle installs its CLI
pub const BUNDLED_CMUX_PATH: &str = "/Applications/cmux.app/Contents/Resources/bin/cmux";

/// When the caller surface counts as already focused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FocusPolicy {
    /// cmux is the frontmost app and its focused surface is the caller's
    #[default]
    Surface,
    /// cmux reports the caller's surface as focused, regardless of app focus
    SurfaceOnly,
    /// Never suppress notifications
    Never,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Namespaces persisted state; nothing is persisted without it
    pub workspace: Option<String>,
    /// Explicit cmux binary, bypassing discovery
    pub cmux_path: Option<PathBuf>,
    pub bundle_id: String,
    pub focus_policy: FocusPolicy,
    pub state_dir: PathBuf,
    /// Used for the project name when the payload has no directory
    pub fallback_cwd: Option<String>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            cmux_path: None,
            bundle_id: DEFAULT_BUNDLE_ID.to_string(),
            focus_policy: FocusPolicy::default(),
            state_dir: std::env::temp_dir(),
            fallback_cwd: None,
            debug: false,
        }
    }
}

impl Config {
    /// Defaults plus whatever the environment provides directly, for when
    /// argument parsing fails.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an environment lookup. Blank values count as unset and
    /// unrecognized values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            workspace: pick_workspace(var("CMUX_WORKSPACE_ID"), var("CMUX_WORKSPACE_REF")),
            cmux_path: var("CMUX_NOTIFY_BIN").map(PathBuf::from),
            bundle_id: var("CMUX_BUNDLE_ID").unwrap_or_else(|| DEFAULT_BUNDLE_ID.to_string()),
            state_dir: var("CMUX_NOTIFY_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            focus_policy: var("CMUX_NOTIFY_FOCUS")
                .and_then(|v| FocusPolicy::from_str(&v, true).ok())
                .unwrap_or_default(),
            fallback_cwd: current_directory(),
            debug: var("CMUX_NOTIFY_DEBUG")
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        }
    }
}

/// Prefer the workspace id over the workspace ref, ignoring blank values.
pub fn pick_workspace(id: Option<String>, reference: Option<String>) -> Option<String> {
    [id, reference]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// `$PWD`, falling back to the process working directory
pub fn current_directory() -> Option<String> {
    std::env::var("PWD")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            std::env::current_dir()
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
}
