//! Schema-tolerant access to hook payloads.
//!
//! The host CLI does not pin down key casing or nesting, so every field is
//! looked up through a table of accepted spellings instead of a fixed schema.

use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

pub const TOOL_NAME_KEYS: &[&str] = &["toolName", "tool_name"];
pub const TOOL_ARGS_KEYS: &[&str] = &["toolArgs", "tool_args", "arguments", "toolInput", "tool_input"];
pub const SESSION_TITLE_KEYS: &[&str] = &["sessionTitle", "session_title", "sessionName", "session_name"];
pub const WORKING_DIRECTORY_KEYS: &[&str] = &[
    "cwd",
    "workingDirectory",
    "working_directory",
    "projectPath",
    "project_path",
    "workspacePath",
    "workspace_path",
    "directory",
];
pub const REASON_KEYS: &[&str] = &["reason"];
pub const RECOMMENDED_ACTION_KEYS: &[&str] = &["recommendedAction", "recommended_action"];

/// Nested levels searched below the payload root
pub const MAX_SEARCH_DEPTH: usize = 8;

/// A parsed hook payload. Anything that is not a JSON object is treated as empty.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    root: Map<String, Value>,
}

impl Payload {
    /// Parse raw stdin. Blank input yields an empty payload, as does invalid JSON
    /// (the parse error is returned alongside so the caller can report it).
    pub fn parse(raw: &str) -> (Self, Option<serde_json::Error>) {
        if raw.trim().is_empty() {
            return (Self::default(), None);
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => (Self::from_value(value), None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Breadth-first search for the first non-blank string under any of `keys`.
    ///
    /// Keys are checked in table order at each object before descending, so a
    /// shallow match always wins over a deeper one.
    pub fn find_string(&self, keys: &[&str]) -> Option<String> {
        let mut queue: VecDeque<(&Map<String, Value>, usize)> = VecDeque::new();
        queue.push_back((&self.root, 0));

        while let Some((object, depth)) = queue.pop_front() {
            if let Some(found) = first_string_in(object, keys) {
                return Some(found);
            }
            if depth >= MAX_SEARCH_DEPTH {
                continue;
            }
            for value in object.values() {
                match value {
                    Value::Object(child) => queue.push_back((child, depth + 1)),
                    Value::Array(items) => {
                        for item in items {
                            if let Value::Object(child) = item {
                                queue.push_back((child, depth + 1));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Tool name, preferring the top level.
    pub fn tool_name(&self) -> Option<String> {
        first_string_in(&self.root, TOOL_NAME_KEYS).or_else(|| self.find_string(TOOL_NAME_KEYS))
    }

    /// Tool arguments, accepting either an object or a JSON-encoded object string.
    pub fn tool_args(&self) -> ToolArgs {
        for key in TOOL_ARGS_KEYS {
            match self.root.get(*key) {
                Some(Value::Object(args)) => return ToolArgs(args.clone()),
                Some(Value::String(encoded)) if !encoded.trim().is_empty() => {
                    if let Ok(Value::Object(args)) = serde_json::from_str::<Value>(encoded) {
                        return ToolArgs(args);
                    }
                }
                _ => {}
            }
        }
        ToolArgs::default()
    }

    pub fn session_title(&self) -> Option<String> {
        self.find_string(SESSION_TITLE_KEYS)
    }

    pub fn working_directory(&self) -> Option<String> {
        self.find_string(WORKING_DIRECTORY_KEYS)
    }

    /// Session end reason, `"unknown"` when absent, blank, zero, or false.
    /// Other scalars are rendered as text.
    pub fn reason(&self) -> String {
        REASON_KEYS
            .iter()
            .find_map(|key| match self.root.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
                Some(Value::Bool(true)) => Some("true".to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Arguments of the tool being invoked
#[derive(Debug, Clone, Default)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn string(&self, key: &str) -> Option<String> {
        first_string_in(&self.0, &[key])
    }

    pub fn intent(&self) -> Option<String> {
        self.string("intent")
    }

    pub fn question(&self) -> Option<String> {
        self.string("question")
    }

    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary").and_then(Value::as_str)
    }

    fn has_items(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Array(items)) if !items.is_empty())
    }

    pub fn has_actions(&self) -> bool {
        self.has_items("actions")
    }

    /// Whether the arguments ask the user something: a question, choices,
    /// actions, or a recommended action.
    pub fn has_interaction_markers(&self) -> bool {
        self.question().is_some()
            || self.has_items("choices")
            || self.has_actions()
            || first_string_in(&self.0, RECOMMENDED_ACTION_KEYS).is_some()
    }
}

fn first_string_in(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Last component of a lexically normalized path, or the path itself when it
/// has none (e.g. `/`).
pub fn project_name_from_dir(directory: &str) -> Option<String> {
    let directory = directory.trim();
    if directory.is_empty() {
        return None;
    }
    let normalized = normalize_path(Path::new(directory));
    let name = normalized
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| normalized.to_string_lossy().to_string());
    Some(name)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::from_value(value)
    }

    mod parsing {
        use super::*;

        #[test]
        fn test_blank_input_is_empty() {
            let (p, err) = Payload::parse("  \n");
            assert!(p.is_empty());
            assert!(err.is_none());
        }

        #[test]
        fn test_invalid_json_is_empty_with_error() {
            let (p, err) = Payload::parse("{not json");
            assert!(p.is_empty());
            assert!(err.is_some());
        }

        #[test]
        fn test_non_object_is_empty() {
            let (p, err) = Payload::parse("[1, 2, 3]");
            assert!(p.is_empty());
            assert!(err.is_none());
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn test_missing_fields_return_none() {
            let p = payload(json!({"unrelated": {"deep": [1, 2]}}));
            assert_eq!(p.tool_name(), None);
            assert_eq!(p.session_title(), None);
            assert_eq!(p.working_directory(), None);
            assert_eq!(p.reason(), "unknown");
        }

        #[test]
        fn test_both_casings_accepted() {
            assert_eq!(payload(json!({"toolName": "ask_user"})).tool_name().as_deref(), Some("ask_user"));
            assert_eq!(payload(json!({"tool_name": "ask_user"})).tool_name().as_deref(), Some("ask_user"));
        }

        #[test]
        fn test_nested_objects_and_arrays() {
            let p = payload(json!({
                "context": {"items": [{"x": 1}, {"session": {"sessionName": "Refactor"}}]}
            }));
            assert_eq!(p.session_title().as_deref(), Some("Refactor"));
        }

        #[test]
        fn test_shallow_match_wins() {
            let p = payload(json!({
                "nested": {"cwd": "/deep/path"},
                "workspace": {"cwd": "/shallow"},
                "cwd": "/top"
            }));
            assert_eq!(p.working_directory().as_deref(), Some("/top"));

            let p = payload(json!({
                "a": {"b": {"cwd": "/deeper"}},
                "c": {"cwd": "/shallower"}
            }));
            assert_eq!(p.working_directory().as_deref(), Some("/shallower"));
        }

        #[test]
        fn test_blank_strings_skipped_and_trimmed() {
            let p = payload(json!({"sessionTitle": "   ", "inner": {"session_title": "  Fix it  "}}));
            assert_eq!(p.session_title().as_deref(), Some("Fix it"));
        }

        #[test]
        fn test_non_string_values_ignored() {
            let p = payload(json!({"cwd": 42, "directory": "/work/app"}));
            assert_eq!(p.working_directory().as_deref(), Some("/work/app"));
        }

        #[test]
        fn test_scalar_reasons_rendered() {
            assert_eq!(payload(json!({"reason": " timeout "})).reason(), "timeout");
            assert_eq!(payload(json!({"reason": 137})).reason(), "137");
            assert_eq!(payload(json!({"reason": true})).reason(), "true");
            assert_eq!(payload(json!({"reason": 0})).reason(), "unknown");
            assert_eq!(payload(json!({"reason": false})).reason(), "unknown");
            assert_eq!(payload(json!({"reason": null})).reason(), "unknown");
            assert_eq!(payload(json!({"reason": ""})).reason(), "unknown");
        }

        #[test]
        fn test_depth_is_bounded() {
            let mut value = json!({"sessionTitle": "too deep"});
            for _ in 0..(MAX_SEARCH_DEPTH + 1) {
                value = json!({ "level": value });
            }
            assert_eq!(payload(value).session_title(), None);

            let mut value = json!({"sessionTitle": "just fits"});
            for _ in 0..MAX_SEARCH_DEPTH {
                value = json!({ "level": value });
            }
            assert_eq!(payload(value).session_title().as_deref(), Some("just fits"));
        }
    }

    mod tool_args {
        use super::*;

        #[test]
        fn test_object_args() {
            let p = payload(json!({"toolArgs": {"intent": "Fixing auth bug"}}));
            assert_eq!(p.tool_args().intent().as_deref(), Some("Fixing auth bug"));
        }

        #[test]
        fn test_string_encoded_args() {
            let p = payload(json!({"arguments": "{\"question\": \"Proceed?\"}"}));
            assert_eq!(p.tool_args().question().as_deref(), Some("Proceed?"));
        }

        #[test]
        fn test_unparseable_string_falls_through() {
            let p = payload(json!({"toolArgs": "not json", "tool_input": {"intent": "x"}}));
            assert_eq!(p.tool_args().intent().as_deref(), Some("x"));
        }

        #[test]
        fn test_interaction_markers() {
            let args = |v: Value| payload(json!({ "toolArgs": v })).tool_args();
            assert!(args(json!({"question": "Which one?"})).has_interaction_markers());
            assert!(args(json!({"choices": ["a", "b"]})).has_interaction_markers());
            assert!(args(json!({"actions": [{"id": 1}]})).has_interaction_markers());
            assert!(args(json!({"recommended_action": "merge"})).has_interaction_markers());
            assert!(!args(json!({"question": " ", "choices": []})).has_interaction_markers());
            assert!(!args(json!({"path": "src/main.rs"})).has_interaction_markers());
        }
    }

    mod project_name {
        use super::*;

        #[test]
        fn test_basename() {
            assert_eq!(project_name_from_dir("/Users/dev/myapp").as_deref(), Some("myapp"));
        }

        #[test]
        fn test_trailing_slash_and_dots() {
            assert_eq!(project_name_from_dir("/Users/dev/myapp/").as_deref(), Some("myapp"));
            assert_eq!(project_name_from_dir("/Users/dev/myapp/src/..").as_deref(), Some("myapp"));
        }

        #[test]
        fn test_root_and_empty() {
            assert_eq!(project_name_from_dir("/").as_deref(), Some("/"));
            assert_eq!(project_name_from_dir("  "), None);
        }
    }
}
