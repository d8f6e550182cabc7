//! Titles, labels, and notification text.

use crate::common::payload::{project_name_from_dir, Payload, ToolArgs};
use crate::hook::events::EndReason;

pub const APP_TITLE: &str = "Copilot CLI";
pub const MAX_BODY_LENGTH: usize = 180;

/// A popup to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub subtitle: String,
    pub body: String,
}

/// Session title and project name derived from one payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub session_title: Option<String>,
    pub project_name: Option<String>,
}

impl SessionContext {
    /// `fallback_cwd` stands in when the payload names no directory.
    pub fn from_payload(payload: &Payload, fallback_cwd: Option<&str>) -> Self {
        let directory = payload
            .working_directory()
            .or_else(|| fallback_cwd.map(str::to_string));
        Self {
            session_title: payload.session_title(),
            project_name: directory.as_deref().and_then(project_name_from_dir),
        }
    }

    /// `"<project> — <session title>"` for the sidebar
    pub fn workspace_title(&self) -> Option<String> {
        match (&self.project_name, &self.session_title) {
            (Some(project), Some(title)) => Some(format!("{} — {}", project, title)),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }

    /// `"<session title> — <project>"` for popups
    pub fn subtitle(&self) -> Option<String> {
        match (&self.session_title, &self.project_name) {
            (Some(title), Some(project)) => Some(normalize_body(&format!("{} — {}", title, project))),
            (Some(only), None) | (None, Some(only)) => Some(normalize_body(only)),
            (None, None) => None,
        }
    }
}

/// Collapse whitespace and cap the length in characters
pub fn normalize_body(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_BODY_LENGTH)
        .collect()
}

/// First meaningful line of a plan summary, with list bullets stripped
pub fn summary_hint(args: &ToolArgs) -> Option<String> {
    args.summary()?
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).trim())
        .find(|line| !line.is_empty())
        .map(normalize_body)
}

/// Sidebar label for a tool waiting on the user
pub fn attention_label(tool_name: &str) -> &'static str {
    match tool_name {
        "ask_user" => "Needs answer",
        "exit_plan_mode" => "Needs approval",
        _ => "Needs input",
    }
}

pub fn interaction_body(tool_name: &str, args: &ToolArgs) -> String {
    let question = args.question().map(|q| normalize_body(&q));

    if tool_name == "ask_user" {
        return question.unwrap_or_else(|| "Copilot needs your input.".to_string());
    }

    let hint = summary_hint(args);
    if tool_name == "exit_plan_mode" {
        return match hint {
            Some(hint) => normalize_body(&format!("Plan is ready for approval: {}", hint)),
            None => "Plan is ready for your approval.".to_string(),
        };
    }

    if let Some(question) = question {
        return question;
    }
    if let Some(hint) = hint {
        return normalize_body(&format!("Action needed: {}", hint));
    }
    if args.has_actions() {
        return "Copilot is waiting for your action.".to_string();
    }
    "Copilot needs your input.".to_string()
}

pub fn attention_notification(tool_name: &str, args: &ToolArgs, context: &SessionContext) -> Notification {
    Notification {
        title: APP_TITLE.to_string(),
        subtitle: context
            .subtitle()
            .unwrap_or_else(|| attention_label(tool_name).to_string()),
        body: interaction_body(tool_name, args),
    }
}

/// Sidebar intent line once a session ends
pub fn end_status(reason: &EndReason) -> String {
    match reason {
        EndReason::Complete => "Task finished".to_string(),
        other => format!("Task stopped ({})", other.as_str()),
    }
}

pub fn end_notification(reason: &EndReason, context: &SessionContext) -> Notification {
    Notification {
        title: APP_TITLE.to_string(),
        subtitle: context.subtitle().unwrap_or_else(|| "Session ended".to_string()),
        body: format!("{}.", end_status(reason)),
    }
}
