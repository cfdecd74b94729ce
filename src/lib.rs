use std::sync::Arc;
use tauri::Manager;

pub mod authority;
pub mod bridge;
pub mod capability;
mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod grant;
mod host;
pub mod launcher;
pub mod network;
pub mod platform;
pub mod ports;

#[doc(hidden)]
pub mod testing;

use authority::CapabilityAuthority;
use bridge::PermissionBridge;
use capability::CapabilityMap;
use commands::LauncherState;
use config::LauncherConfig;
use host::MainWebview;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_websocket::init())
        .invoke_handler(tauri::generate_handler![
            commands::gateway_endpoints,
            commands::microphone_permission,
            commands::probe_gateway
        ])
        .setup(|app| {
            app.handle().plugin(
                tauri_plugin_log::Builder::default()
                    .level(if cfg!(debug_assertions) {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    })
                    .build(),
            )?;

            let config = LauncherConfig::load(app.config())?;
            log::info!(
                "Gateway {} (local: {}), mixed content {:?}",
                config.gateway.ws_url(),
                config.gateway.is_local(),
                config.mixed_content
            );

            let authority = Arc::new(CapabilityAuthority::new(
                CapabilityMap::standard(),
                platform::os_permissions(),
            ));
            let bridge = Arc::new(PermissionBridge::new(
                Arc::clone(&authority),
                config.unrecognized_resources,
            ));

            let mut webview = MainWebview::from_config(app.config())?;
            launcher::launch(&authority, bridge, &mut webview, config.mixed_content);
            launcher::check_gateway(&webview.enforced_policy(), &config.gateway);
            webview.build(app.handle())?;

            app.manage(LauncherState {
                authority,
                gateway: config.gateway,
            });

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
