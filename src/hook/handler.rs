//! Dispatch of a single hook invocation.

use crate::cmux::focus::is_session_focused;
use crate::cmux::{resolve_binary, Cmux};
use crate::common::debug::{debug_log, warn};
use crate::common::payload::Payload;
use crate::common::persistence::{SessionState, StateStore};
use crate::common::runner::CommandRunner;
use crate::config::Config;
use crate::hook::events::{classify, Action, EndReason};
use crate::hook::messages::{
    attention_label, attention_notification, end_notification, end_status, Notification,
    SessionContext,
};
use crate::hook::notifier::notify;

pub struct Handler<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    store: &'a dyn StateStore,
}

impl<'a> Handler<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, store: &'a dyn StateStore) -> Self {
        Self {
            config,
            runner,
            store,
        }
    }

    /// Handle one event. Every failure is absorbed; the returned action is
    /// what the event was classified as.
    pub fn handle(&self, event: &str, payload: &Payload) -> Action {
        let action = classify(event, payload);
        debug_log(&format!("event {:?} -> {:?}", event, action));

        let cmux_bin = resolve_binary(self.runner, self.config.cmux_path.as_deref());
        let cmux = cmux_bin.map(|bin| Cmux::new(self.runner, bin));
        let context = || SessionContext::from_payload(payload, self.config.fallback_cwd.as_deref());

        match &action {
            Action::StartSession => self.start_session(cmux.as_ref(), &context()),
            Action::ReportIntent => {
                if let Some(cmux) = &cmux {
                    self.report_intent(cmux, payload, &context());
                }
            }
            Action::NeedsAttention { tool_name } => {
                if let Some(cmux) = &cmux {
                    cmux.set_attention(attention_label(tool_name));
                }
                let notification = attention_notification(tool_name, &payload.tool_args(), &context());
                self.popup(cmux.as_ref(), &notification);
            }
            Action::ClearAttention => {
                if let Some(cmux) = &cmux {
                    cmux.clear_attention();
                }
            }
            Action::EndSession { reason } => {
                self.end_session(cmux.as_ref(), reason);
                if reason.is_finished() {
                    self.popup(cmux.as_ref(), &end_notification(reason, &context()));
                }
            }
            Action::Ignore => {}
        }
        action
    }

    fn start_session(&self, cmux: Option<&Cmux>, context: &SessionContext) {
        self.remove_state();
        let Some(cmux) = cmux else {
            return;
        };

        cmux.clear_attention();
        cmux.set_intent("");
        cmux.signal_session_start();
        cmux.set_running();

        let mut state = SessionState {
            session_started: true,
            last_title: None,
        };
        if let Some(title) = context.workspace_title() {
            cmux.rename_workspace(&title);
            state.last_title = Some(title);
        }
        self.save_state(&state);
    }

    fn report_intent(&self, cmux: &Cmux, payload: &Payload, context: &SessionContext) {
        let Some(intent) = payload.tool_args().intent() else {
            debug_log("report_intent without intent, skipping");
            return;
        };

        let mut state = self.load_state();
        let before = state.clone();

        if !state.session_started {
            cmux.signal_session_start();
            cmux.set_running();
            state.session_started = true;
        }

        if let Some(title) = context.workspace_title() {
            if state.last_title.as_deref() != Some(title.as_str()) {
                cmux.rename_workspace(&title);
                state.last_title = Some(title);
            }
        }

        cmux.clear_attention();
        if state != before {
            self.save_state(&state);
        }
        cmux.set_intent(&intent);
    }

    fn end_session(&self, cmux: Option<&Cmux>, reason: &EndReason) {
        if let Some(cmux) = cmux {
            cmux.set_intent(&end_status(reason));
            cmux.clear_attention();
            cmux.clear_running();
            cmux.signal_stop();
        }
        self.remove_state();
    }

    /// Show `notification` unless the user is already looking at the session.
    fn popup(&self, cmux: Option<&Cmux>, notification: &Notification) {
        if is_session_focused(self.config.focus_policy, cmux, self.runner, &self.config.bundle_id) {
            debug_log("caller surface focused, suppressing popup");
            return;
        }
        notify(self.runner, cmux, notification);
    }

    fn load_state(&self) -> SessionState {
        match &self.config.workspace {
            Some(workspace) => self.store.load(workspace),
            None => SessionState::default(),
        }
    }

    fn save_state(&self, state: &SessionState) {
        if let Some(workspace) = &self.config.workspace {
            if let Err(err) = self.store.save(workspace, state) {
                warn(&format!("{:#}", err));
            }
        }
    }

    fn remove_state(&self) {
        if let Some(workspace) = &self.config.workspace {
            if let Err(err) = self.store.remove(workspace) {
                warn(&format!("{:#}", err));
            }
        }
    }
}
