//! Tauri IPC Commands
//!
//! These commands bridge the tab strip and the hosted pages to the Rust core.

pub mod diagnostics;
pub mod tabs;
pub mod webview;

pub const MAIN_WINDOW: &str = "main";

pub fn ui_webview_label(window_label: &str) -> String {
    format!("ui-{window_label}")
}
