//! Debug logging utilities.
//!
//! The handler runs once per hook event, so the log is appended to rather than
//! truncated on startup. Nothing here may fail the caller.

use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Initialize debug logging
pub fn init_debug(enabled: bool) {
    let _ = DEBUG_ENABLED.set(enabled);
    if enabled {
        if let Some(parent) = debug_log_path().as_ref().and_then(|p| p.parent()) {
            let _ = fs::create_dir_all(parent);
        }
    }
}

/// Get the path to the debug log file
pub fn debug_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|c| c.join("cmux-notify").join("debug.log"))
}

/// Check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    *DEBUG_ENABLED.get().unwrap_or(&false)
}

/// Write a debug log message
pub fn debug_log(msg: &str) {
    if is_debug_enabled() {
        if let Some(path) = debug_log_path() {
            if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
                let timestamp = Utc::now().format("%H:%M:%S%.3f");
                let _ = writeln!(file, "[{}] [pid {}] {}", timestamp, std::process::id(), msg);
            }
        }
    }
}

/// Report a soft failure on stderr and in the debug log.
pub fn warn(msg: &str) {
    eprintln!("cmux-notify: {}", msg);
    debug_log(&format!("WARN {}", msg));
}
