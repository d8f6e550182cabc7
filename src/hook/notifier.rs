//! Popup delivery: cmux first, then the platform notifier.

use crate::cmux::Cmux;
use crate::common::debug::debug_log;
use crate::common::runner::{CommandRunner, Invocation};
use crate::hook::messages::Notification;

/// Deliver `notification`, returning whether any notifier accepted it.
pub fn notify(runner: &dyn CommandRunner, cmux: Option<&Cmux>, notification: &Notification) -> bool {
    if let Some(cmux) = cmux {
        if cmux.notify(&notification.title, &notification.subtitle, &notification.body) {
            return true;
        }
        debug_log("cmux notify failed, trying platform notifier");
    }

    if notify_macos(runner, notification) {
        return true;
    }
    if notify_linux(runner, notification) {
        return true;
    }

    debug_log("no notifier available");
    false
}

/// macOS notification using osascript
fn notify_macos(runner: &dyn CommandRunner, notification: &Notification) -> bool {
    let Some(osascript) = runner.locate("osascript") else {
        return false;
    };
    runner.run(&Invocation::new(osascript, ["-e".to_string(), display_script(notification)]))
}

/// Linux notification using notify-send
fn notify_linux(runner: &dyn CommandRunner, notification: &Notification) -> bool {
    let Some(notify_send) = runner.locate("notify-send") else {
        return false;
    };
    let body = if notification.subtitle.is_empty() {
        notification.body.clone()
    } else {
        format!("{}: {}", notification.subtitle, notification.body)
    };
    runner.run(&Invocation::new(notify_send, [notification.title.clone(), body]))
}

/// AppleScript `display notification` with JSON-escaped string literals
fn display_script(notification: &Notification) -> String {
    let quote = |s: &str| serde_json::Value::from(s).to_string();
    let mut script = format!(
        "display notification {} with title {}",
        quote(&notification.body),
        quote(&notification.title)
    );
    if !notification.subtitle.is_empty() {
        script.push_str(&format!(" subtitle {}", quote(&notification.subtitle)));
    }
    script
}
