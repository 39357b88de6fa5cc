//! Content webview management
//!
//! Each tab is rendered by its own child webview inside the main window.
//! Webviews stay mounted while their tab exists; switching tabs only changes
//! which one is visible.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tauri::webview::{NewWindowResponse, PageLoadEvent, WebviewBuilder};
use tauri::{AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, WebviewUrl, Window};

use snack_core::{HostError, Phase, RenderingHost, ShellSnapshot, TabView};

use super::tabs::CommandResult;
use crate::state::AppState;

/// Routes watchdog messages through the `watchdog_signal` command
const WATCHDOG_BRIDGE: &str =
    "function (payload) { window.__TAURI_INTERNALS__.invoke('watchdog_signal', { payload: payload }); }";

/// Area below the tab strip, in logical pixels
#[derive(Clone, Copy)]
pub struct ContentBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContentBounds {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 44.0, // tab strip height
            width: 1024.0,
            height: 724.0,
        }
    }
}

/// Manages webviews for tabs
pub struct WebviewManager {
    /// Map of tab_id -> webview label
    webviews: Arc<RwLock<HashMap<String, String>>>,
    bounds: Arc<RwLock<ContentBounds>>,
}

impl WebviewManager {
    pub fn new() -> Self {
        Self {
            webviews: Arc::new(RwLock::new(HashMap::new())),
            bounds: Arc::new(RwLock::new(ContentBounds::default())),
        }
    }

    pub fn label_for_tab(&self, tab_id: &str) -> Option<String> {
        self.webviews.read().get(tab_id).cloned()
    }

    pub fn tab_for_label(&self, label: &str) -> Option<String> {
        self.webviews
            .read()
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(tab_id, _)| tab_id.clone())
    }

    pub fn register(&self, tab_id: String, label: String) {
        self.webviews.write().insert(tab_id, label);
    }

    pub fn unregister(&self, tab_id: &str) -> Option<String> {
        self.webviews.write().remove(tab_id)
    }

    pub fn tab_ids(&self) -> Vec<String> {
        self.webviews.read().keys().cloned().collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.webviews.read().values().cloned().collect()
    }

    pub fn bounds(&self) -> ContentBounds {
        *self.bounds.read()
    }

    pub fn set_bounds(&self, bounds: ContentBounds) {
        *self.bounds.write() = bounds;
    }
}

impl Default for WebviewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WebviewManager {
    fn clone(&self) -> Self {
        Self {
            webviews: Arc::clone(&self.webviews),
            bounds: Arc::clone(&self.bounds),
        }
    }
}

/// Rendering host backed by a child webview, looked up by label on each call
pub struct TauriHost {
    app: AppHandle,
    label: String,
}

impl TauriHost {
    pub fn new(app: AppHandle, label: String) -> Self {
        Self { app, label }
    }

    fn webview(&self) -> Result<tauri::Webview, HostError> {
        self.app
            .get_webview(&self.label)
            .ok_or_else(|| HostError::new(format!("Webview not found: {}", self.label)))
    }
}

impl RenderingHost for TauriHost {
    fn load(&self, url: &str) -> Result<(), HostError> {
        let parsed: url::Url = url
            .parse()
            .map_err(|_| HostError::new(format!("Invalid URL: {}", url)))?;
        self.webview()?
            .navigate(parsed)
            .map_err(|e| HostError::new(format!("Navigation failed: {}", e)))
    }

    fn reload(&self) -> Result<(), HostError> {
        self.webview()?
            .reload()
            .map_err(|e| HostError::new(format!("Reload failed: {}", e)))
    }
}

fn content_webview_label(tab: &TabView) -> String {
    format!("content-{}", tab.render_key)
}

/// Push the current snapshot to the tab strip
pub fn emit_snapshot(app: &AppHandle, snapshot: &ShellSnapshot) {
    let ui_label = super::ui_webview_label(super::MAIN_WINDOW);
    if let Err(e) = app.emit_to(ui_label.as_str(), "tabs-updated", snapshot) {
        tracing::debug!(error = %e, "Failed to emit tabs-updated");
    }
}

fn emit_current(app: &AppHandle) {
    if let Some(state) = app.try_state::<AppState>() {
        emit_snapshot(app, &state.snapshot());
    }
}

/// Bring the content webviews in line with the shell: drop webviews of closed
/// tabs, mount missing ones and show only the active tab
pub fn sync_webviews(app: &AppHandle, window: &Window) -> Result<(), String> {
    let state = app
        .try_state::<AppState>()
        .ok_or_else(|| "AppState not found".to_string())?;
    let manager = app
        .try_state::<WebviewManager>()
        .ok_or_else(|| "WebviewManager not found".to_string())?;

    let snapshot = state.snapshot();
    if snapshot.phase == Phase::Loading {
        emit_snapshot(app, &snapshot);
        return Ok(());
    }

    for tab_id in manager.tab_ids() {
        if snapshot.tabs.iter().any(|t| t.id == tab_id) {
            continue;
        }
        if let Some(label) = manager.unregister(&tab_id) {
            state.shell().unmount_host(&tab_id);
            if let Some(webview) = app.get_webview(&label) {
                let _ = webview.close();
            }
            tracing::info!(label = %label, tab_id = %tab_id, "Closed webview");
        }
    }

    for tab in &snapshot.tabs {
        let existing = manager
            .label_for_tab(&tab.id)
            .filter(|label| app.get_webview(label).is_some());

        let label = match existing {
            Some(label) => label,
            None => create_content_webview(app, window, &manager, &state, tab)?,
        };

        if let Some(webview) = app.get_webview(&label) {
            let result = if tab.is_active {
                webview.show()
            } else {
                webview.hide()
            };
            if let Err(e) = result {
                tracing::warn!(label = %label, error = %e, "Failed to toggle webview visibility");
            }
        }
    }

    emit_snapshot(app, &snapshot);
    Ok(())
}

fn create_content_webview(
    app: &AppHandle,
    window: &Window,
    manager: &WebviewManager,
    state: &AppState,
    tab: &TabView,
) -> Result<String, String> {
    let webview_label = content_webview_label(tab);
    let webview_url = match tab.url.parse::<url::Url>() {
        Ok(parsed) => WebviewUrl::External(parsed),
        Err(_) => return Err(format!("Invalid URL: {}", tab.url)),
    };

    tracing::info!(tab_id = %tab.id, url = %tab.url, "Create webview requested");

    let shell = state.shell();
    let config = shell.config();

    let app_handle_for_navigation = app.clone();
    let app_handle_for_load = app.clone();
    let tab_id_for_load = tab.id.clone();
    let app_handle_for_new_window = app.clone();
    let tab_id_for_new_window = tab.id.clone();

    let webview_builder = WebviewBuilder::new(&webview_label, webview_url)
        .transparent(false)
        .auto_resize()
        .enable_clipboard_access()
        .user_agent(&config.user_agent)
        // Top frame only: embedded preview frames never carry the liveness marker
        .initialization_script(shell.injected_script(WATCHDOG_BRIDGE))
        // One profile for every tab so a sign-in carries across tabs
        .data_directory(config.webview_data_dir())
        .on_navigation(move |url| {
            match app_handle_for_navigation.try_state::<AppState>() {
                Some(state) => state.shell().should_allow_navigation(url.as_str()),
                None => false,
            }
        })
        .on_page_load(move |_webview, payload| {
            if !matches!(payload.event(), PageLoadEvent::Started) {
                return;
            }

            let url = payload.url().to_string();
            if let Some(state) = app_handle_for_load.try_state::<AppState>() {
                if let Err(e) = state.shell().on_navigated(&tab_id_for_load, &url) {
                    tracing::debug!(tab_id = %tab_id_for_load, error = %e, "Ignored page load");
                    return;
                }
                emit_snapshot(&app_handle_for_load, &state.snapshot());
            }
        })
        .on_new_window(move |url, _features| {
            // Popups open in the same tab; the allow-list still applies
            // through on_navigation
            let app = app_handle_for_new_window.clone();
            let tab_id = tab_id_for_new_window.clone();
            tauri::async_runtime::spawn(async move {
                let Some(state) = app.try_state::<AppState>() else {
                    return;
                };
                let Some(host) = state.shell().hosts().get(&tab_id) else {
                    return;
                };
                if let Err(e) = host.load(url.as_str()) {
                    tracing::warn!(tab_id = %tab_id, error = %e, "Failed to open popup in place");
                }
            });
            NewWindowResponse::Deny
        });

    let bounds = manager.bounds();
    match window.add_child(
        webview_builder,
        LogicalPosition::new(bounds.x, bounds.y),
        LogicalSize::new(bounds.width, bounds.height),
    ) {
        Ok(webview) => {
            let _ = webview.hide();

            manager.register(tab.id.clone(), webview_label.clone());
            shell.mount_host(
                &tab.id,
                Arc::new(TauriHost::new(app.clone(), webview_label.clone())),
            );

            tracing::info!(label = %webview_label, tab_id = %tab.id, "Created child webview");
            Ok(webview_label)
        }
        Err(e) => {
            tracing::error!(
                label = %webview_label,
                tab_id = %tab.id,
                error = %e,
                "Failed to create child webview"
            );
            Err(format!("Failed to create webview: {}", e))
        }
    }
}

/// Message channel from the injected watchdog script
#[tauri::command]
pub fn watchdog_signal(app: AppHandle, webview: tauri::Webview, payload: String) -> CommandResult<bool> {
    let Some(manager) = app.try_state::<WebviewManager>() else {
        return CommandResult::err("WebviewManager not found".to_string());
    };
    let Some(state) = app.try_state::<AppState>() else {
        return CommandResult::err("AppState not found".to_string());
    };

    let Some(tab_id) = manager.tab_for_label(webview.label()) else {
        tracing::debug!(label = %webview.label(), "Watchdog signal from unknown webview");
        return CommandResult::ok(false);
    };

    let show_reconnect = state.shell().on_host_message(&tab_id, &payload);
    emit_current(&app);

    CommandResult::ok(show_reconnect)
}

/// Resize every content webview to the area below the tab strip
#[tauri::command]
pub async fn set_content_bounds(
    app: AppHandle,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> CommandResult<()> {
    let manager = match app.try_state::<WebviewManager>() {
        Some(m) => m,
        None => return CommandResult::err("WebviewManager not found".to_string()),
    };

    manager.set_bounds(ContentBounds {
        x,
        y,
        width,
        height,
    });

    let position = LogicalPosition::new(x, y);
    let size = LogicalSize::new(width, height);

    for label in manager.labels() {
        if let Some(webview) = app.get_webview(&label) {
            let _ = webview.set_position(position);
            let _ = webview.set_size(size);
        }
    }

    CommandResult::ok(())
}
