// Prevents additional console window on Windows in release, DO NOT REMOVE!!
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// `tauri dev` runs the raw executable on macOS (not the .app bundle), so the
// Info.plist carrying `NSMicrophoneUsageDescription` is embedded here or the
// AVFoundation request fails without showing a dialog.
#[cfg(all(target_os = "macos", debug_assertions))]
tauri::embed_plist::embed_info_plist!("../Info.plist");

fn main() {
    voicenote_lib::run();
}
