/// App commands; each one is granted explicitly by a capability
const COMMANDS: &[&str] = &[
    "frontend_ready",
    "get_snapshot",
    "open_tab",
    "activate_tab",
    "close_tab",
    "reconnect",
    "watchdog_signal",
    "set_content_bounds",
];

fn main() {
    tauri_build::try_build(
        tauri_build::Attributes::new()
            .app_manifest(tauri_build::AppManifest::new().commands(COMMANDS)),
    )
    .expect("failed to run tauri-build");
}
