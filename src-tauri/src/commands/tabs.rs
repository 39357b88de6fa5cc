//! Tab management commands
//!
//! Every command returns the full shell snapshot so the tab strip can
//! re-render from one source of truth.
use serde::Serialize;
use snack_core::ShellSnapshot;
use tauri::{AppHandle, Manager, Window};

use super::webview::sync_webviews;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Apply `f` to the shell, then bring the content webviews in line with the
/// resulting state
fn apply<F, T>(app: &AppHandle, window: &Window, f: F) -> CommandResult<ShellSnapshot>
where
    F: FnOnce(&AppState) -> snack_core::Result<T>,
{
    let Some(state) = app.try_state::<AppState>() else {
        return CommandResult::err("AppState not found".to_string());
    };

    if let Err(e) = f(&state) {
        return CommandResult::err(e.to_string());
    }

    if let Err(e) = sync_webviews(app, window) {
        tracing::error!(error = %e, "Failed to sync content webviews");
        return CommandResult::err(e);
    }

    CommandResult::ok(state.snapshot())
}

#[tauri::command]
pub fn get_snapshot(app: AppHandle) -> CommandResult<ShellSnapshot> {
    match app.try_state::<AppState>() {
        Some(state) => CommandResult::ok(state.snapshot()),
        None => CommandResult::err("AppState not found".to_string()),
    }
}

#[tauri::command]
pub async fn open_tab(app: AppHandle, window: Window) -> CommandResult<ShellSnapshot> {
    apply(&app, &window, |state| state.shell().open_new_session())
}

#[tauri::command]
pub async fn activate_tab(
    app: AppHandle,
    window: Window,
    tab_id: String,
) -> CommandResult<ShellSnapshot> {
    apply(&app, &window, |state| state.shell().activate(&tab_id))
}

#[tauri::command]
pub async fn close_tab(app: AppHandle, window: Window, tab_id: String) -> CommandResult<ShellSnapshot> {
    apply(&app, &window, |state| state.shell().close_session(&tab_id))
}

/// Reload the active tab after its runtime disconnected
#[tauri::command]
pub async fn reconnect(app: AppHandle, window: Window) -> CommandResult<ShellSnapshot> {
    apply(&app, &window, |state| state.shell().reconnect())
}
