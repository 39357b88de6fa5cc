//! Snack Shell - Tauri Application
//!
//! - Rust owns all state
//! - The tab strip is a thin UI webview
//! - Each tab's hosted page is content only

mod commands;
mod state;

use commands::webview::WebviewManager;
use commands::MAIN_WINDOW;
use snack_core::AppLifecycle;
use state::AppState;
use tauri::webview::WebviewBuilder;
use tauri::window::WindowBuilder;
use tauri::{LogicalPosition, LogicalSize, Manager, RunEvent, WebviewUrl, WindowEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    snack_core::init_logging();

    let app = tauri::Builder::default()
        .setup(|app| {
            // Initialize shell state
            let state = AppState::new()?;
            state.initialize()?;

            app.manage(state);
            app.manage(WebviewManager::new());

            let window = WindowBuilder::new(app, MAIN_WINDOW)
                .title("Snack Shell")
                .inner_size(1024.0, 768.0)
                .min_inner_size(480.0, 600.0)
                .center()
                .build()?;

            let ui_webview = WebviewBuilder::new(
                commands::ui_webview_label(MAIN_WINDOW),
                WebviewUrl::App("index.html".into()),
            )
            .auto_resize();

            let ui_webview = window.add_child(
                ui_webview,
                LogicalPosition::new(0.0, 0.0),
                LogicalSize::new(1024.0, 768.0),
            )?;
            let _ = ui_webview.show();

            commands::webview::sync_webviews(app.handle(), &window)?;

            tracing::info!("Snack Shell started");

            Ok(())
        })
        .on_window_event(|window, event| {
            let next = match event {
                WindowEvent::Focused(true) => AppLifecycle::Active,
                WindowEvent::Focused(false) | WindowEvent::CloseRequested { .. } => {
                    AppLifecycle::Background
                }
                _ => return,
            };

            if let Some(state) = window.app_handle().try_state::<AppState>() {
                state.lifecycle_changed(next);
            }
        })
        .invoke_handler(tauri::generate_handler![
            // Diagnostics
            commands::diagnostics::frontend_ready,
            // Tab commands
            commands::tabs::get_snapshot,
            commands::tabs::open_tab,
            commands::tabs::activate_tab,
            commands::tabs::close_tab,
            commands::tabs::reconnect,
            // Webview commands
            commands::webview::watchdog_signal,
            commands::webview::set_content_bounds,
        ])
        .build(tauri::generate_context!())
        .expect("error while building Snack Shell");

    app.run(|app_handle, event| {
        if let RunEvent::ExitRequested { .. } = event {
            if let Some(state) = app_handle.try_state::<AppState>() {
                state.lifecycle_changed(AppLifecycle::Background);
            }
        }
    });
}
