use snack_core::ShellSnapshot;
use tauri::State;

use super::tabs::CommandResult;
use crate::state::AppState;

#[tauri::command]
pub fn frontend_ready(state: State<AppState>) -> CommandResult<ShellSnapshot> {
    let snapshot = state.snapshot();
    tracing::info!(tabs = snapshot.tabs.len(), phase = ?snapshot.phase, "Frontend ready");
    CommandResult::ok(snapshot)
}
