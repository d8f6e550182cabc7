mod cmux;
mod common;
mod config;
mod hook;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::common::debug::{debug_log, init_debug, warn};
use crate::common::payload::Payload;
use crate::common::persistence::FileStateStore;
use crate::common::runner::SystemRunner;
use crate::config::{current_directory, pick_workspace, Config, FocusPolicy, DEFAULT_BUNDLE_ID};
use crate::hook::events::HookEventName;
use crate::hook::handler::Handler;

#[derive(Parser, Debug)]
#[command(name = "cmux-notify")]
#[command(about = "Copilot CLI hook handler that mirrors sessions into cmux and raises notifications")]
#[command(version)]
struct Args {
    /// Hook event name (sessionStart, preToolUse, postToolUse, sessionEnd)
    #[arg(default_value = "")]
    event: String,

    /// Workspace identifier used to namespace persisted state
    #[arg(long, env = "CMUX_WORKSPACE_ID")]
    workspace_id: Option<String>,

    /// Workspace reference, used when no workspace id is set
    #[arg(long, env = "CMUX_WORKSPACE_REF")]
    workspace_ref: Option<String>,

    /// Path to the cmux binary (default: app bundle, then PATH)
    #[arg(long, env = "CMUX_NOTIFY_BIN")]
    cmux: Option<PathBuf>,

    /// Bundle identifier of the cmux app, for frontmost checks
    #[arg(long, env = "CMUX_BUNDLE_ID", default_value = DEFAULT_BUNDLE_ID)]
    bundle_id: String,

    /// When a focused session suppresses popups
    #[arg(long, env = "CMUX_NOTIFY_FOCUS", value_enum, default_value_t = FocusPolicy::Surface)]
    focus: FocusPolicy,

    /// Directory for per-workspace state files (default: system temp dir)
    #[arg(long, env = "CMUX_NOTIFY_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Append debug output to the cache-dir debug log
    #[arg(long, env = "CMUX_NOTIFY_DEBUG", value_parser = FalseyValueParser::new())]
    debug: bool,
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            workspace: pick_workspace(self.workspace_id, self.workspace_ref),
            cmux_path: self.cmux,
            bundle_id: self.bundle_id,
            focus_policy: self.focus,
            state_dir: self.state_dir.unwrap_or_else(std::env::temp_dir),
            fallback_cwd: current_directory(),
            debug: self.debug,
        }
    }
}

/// Parse arguments, falling back to the environment so a bad flag never
/// fails the hook. Help and version still print and exit.
fn load_config() -> (String, Config) {
    match Args::try_parse() {
        Ok(args) => (args.event.clone(), args.into_config()),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            warn(&format!("ignoring invalid arguments: {}", err.kind()));
            (fallback_event(std::env::args_os()), Config::from_env())
        }
    }
}

/// Pick the event name out of raw arguments that clap rejected.
///
/// A recognized hook event anywhere wins; otherwise the first argument that
/// is not a flag. Non-UTF-8 arguments are converted lossily.
fn fallback_event<I>(args: I) -> String
where
    I: IntoIterator<Item = OsString>,
{
    let candidates: Vec<String> = args
        .into_iter()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .filter(|arg| !arg.starts_with('-'))
        .collect();
    candidates
        .iter()
        .find(|arg| HookEventName::parse(arg).is_some())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_default()
}

fn read_payload() -> Result<Payload> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("Failed to read hook payload")?;
    let (payload, err) = Payload::parse(&raw);
    if let Some(err) = err {
        warn(&format!("invalid hook payload: {}", err));
    } else if payload.is_empty() {
        debug_log("empty hook payload");
    }
    Ok(payload)
}

fn run(event: &str, config: &Config) -> Result<()> {
    let payload = read_payload().unwrap_or_else(|err| {
        warn(&format!("{:#}", err));
        Payload::default()
    });
    let runner = SystemRunner::new()?;
    let store = FileStateStore::new(&config.state_dir);
    Handler::new(config, &runner, &store).handle(event, &payload);
    Ok(())
}

fn main() -> ExitCode {
    let (event, config) = load_config();
    init_debug(config.debug);
    debug_log(&format!("start event={:?} workspace={:?}", event, config.workspace));

    if let Err(err) = run(&event, &config) {
        warn(&format!("{:#}", err));
    }
    ExitCode::SUCCESS
}
