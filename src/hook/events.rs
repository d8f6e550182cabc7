//! Hook event names and what each event means for the session.

use crate::common::payload::Payload;

pub const REPORT_INTENT_TOOL: &str = "report_intent";
pub const INTERACTIVE_TOOLS: &[&str] = &["ask_user", "exit_plan_mode"];

/// Hook events the host CLI invokes the handler with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEventName {
    SessionStart,
    PreToolUse,
    PostToolUse,
    SessionEnd,
}

impl HookEventName {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "sessionStart" => Some(Self::SessionStart),
            "preToolUse" => Some(Self::PreToolUse),
            "postToolUse" => Some(Self::PostToolUse),
            "sessionEnd" => Some(Self::SessionEnd),
            _ => None,
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    Complete,
    Error,
    Abort,
    Timeout,
    UserExit,
    Other(String),
}

impl EndReason {
    pub fn parse(reason: &str) -> Self {
        match reason {
            "complete" => Self::Complete,
            "error" => Self::Error,
            "abort" => Self::Abort,
            "timeout" => Self::Timeout,
            "user_exit" => Self::UserExit,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Abort => "abort",
            Self::Timeout => "timeout",
            Self::UserExit => "user_exit",
            Self::Other(other) => other.as_str(),
        }
    }

    /// Reasons worth a popup; anything else only cleans up.
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

/// What the handler should do for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reset sidebar and state for a new session
    StartSession,
    /// Silent sidebar update from a `report_intent` call
    ReportIntent,
    /// The tool is waiting on the user
    NeedsAttention { tool_name: String },
    /// Any other tool activity; the user is no longer needed
    ClearAttention,
    EndSession { reason: EndReason },
    Ignore,
}

pub fn is_interactive_tool(tool_name: &str) -> bool {
    INTERACTIVE_TOOLS.contains(&tool_name)
}

/// Classify an event by name and payload.
pub fn classify(event: &str, payload: &Payload) -> Action {
    let Some(event) = HookEventName::parse(event) else {
        return Action::Ignore;
    };
    match event {
        HookEventName::SessionStart => Action::StartSession,
        HookEventName::SessionEnd => Action::EndSession {
            reason: EndReason::parse(&payload.reason()),
        },
        HookEventName::PreToolUse | HookEventName::PostToolUse => {
            let tool_name = payload.tool_name().unwrap_or_default();
            if tool_name == REPORT_INTENT_TOOL {
                Action::ReportIntent
            } else if event == HookEventName::PreToolUse
                && (is_interactive_tool(&tool_name) || payload.tool_args().has_interaction_markers())
            {
                Action::NeedsAttention { tool_name }
            } else {
                Action::ClearAttention
            }
        }
    }
}
