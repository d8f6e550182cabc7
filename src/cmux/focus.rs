//! Whether the user is already looking at the calling session.

use serde::Deserialize;

use super::Cmux;
use crate::common::runner::{CommandRunner, Invocation, QUERY_TIMEOUT};
use crate::config::FocusPolicy;

const FRONTMOST_BUNDLE_SCRIPT: &str =
    "tell application \"System Events\" to get bundle identifier of first process whose frontmost is true";

#[derive(Debug, Deserialize)]
struct Identify {
    focused: Option<SurfaceRefs>,
    caller: Option<SurfaceRefs>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
struct SurfaceRefs {
    surface_ref: Option<String>,
    workspace_ref: Option<String>,
}

/// True when `identify --json` output shows the focused surface and workspace
/// are the caller's own. Anything malformed or missing counts as unfocused.
pub fn caller_is_focused(identify_json: &str) -> bool {
    let Ok(identify) = serde_json::from_str::<Identify>(identify_json) else {
        return false;
    };
    match (identify.focused, identify.caller) {
        (
            Some(SurfaceRefs {
                surface_ref: Some(focused_surface),
                workspace_ref: Some(focused_workspace),
            }),
            Some(SurfaceRefs {
                surface_ref: Some(caller_surface),
                workspace_ref: Some(caller_workspace),
            }),
        ) => focused_surface == caller_surface && focused_workspace == caller_workspace,
        _ => false,
    }
}

/// Whether the app with `bundle_id` is frontmost, via System Events.
pub fn app_is_frontmost(runner: &dyn CommandRunner, bundle_id: &str) -> bool {
    let bundle_id = bundle_id.trim();
    if bundle_id.is_empty() {
        return false;
    }
    let Some(osascript) = runner.locate("osascript") else {
        return false;
    };
    runner
        .capture(&Invocation::new(osascript, ["-e", FRONTMOST_BUNDLE_SCRIPT]).timeout(QUERY_TIMEOUT))
        .is_some_and(|stdout| stdout.trim() == bundle_id)
}

/// Apply `policy` to decide whether a popup would interrupt someone already
/// watching the session.
pub fn is_session_focused(
    policy: FocusPolicy,
    cmux: Option<&Cmux>,
    runner: &dyn CommandRunner,
    bundle_id: &str,
) -> bool {
    let surface_focused = || {
        cmux.and_then(Cmux::identify)
            .is_some_and(|out| caller_is_focused(&out))
    };
    match policy {
        FocusPolicy::Never => false,
        FocusPolicy::SurfaceOnly => surface_focused(),
        FocusPolicy::Surface => {
            cmux.is_some() && app_is_frontmost(runner, bundle_id) && surface_focused()
        }
    }
}
