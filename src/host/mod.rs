//! The Tauri main window as the embedded content runtime.

use std::collections::BTreeSet;
use std::sync::Arc;
use tauri::utils::config::WindowConfig;
use tauri::{AppHandle, WebviewWindow, WebviewWindowBuilder};

use crate::bridge::PermissionBridge;
use crate::error::LauncherError;
use crate::capability::ResourceId;
use crate::network::{self, MixedContentMode, NetworkPolicy};
use crate::ports::ContentRuntime;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(windows)]
mod windows;

pub const MAIN_WINDOW: &str = "main";

/// Settings collected at launch and applied when the window is built. The
/// window is declared with `create: false` so none of it races page load.
pub struct MainWebview {
    window: WindowConfig,
    mixed_content: MixedContentMode,
    bridge: Option<Arc<PermissionBridge>>,
}

impl MainWebview {
    pub fn from_config(config: &tauri::Config) -> Result<Self, LauncherError> {
        let window = config
            .app
            .windows
            .iter()
            .find(|window| window.label == MAIN_WINDOW)
            .cloned()
            .ok_or_else(|| LauncherError::MissingWindow(MAIN_WINDOW.to_string()))?;
        Ok(Self {
            window,
            mixed_content: MixedContentMode::default(),
            bridge: None,
        })
    }

    /// The mixed content policy this platform's webview will actually apply.
    pub fn enforced_policy(&self) -> NetworkPolicy {
        NetworkPolicy::new(network::platform_enforced(self.mixed_content))
    }

    pub fn build(self, app: &AppHandle) -> Result<WebviewWindow, LauncherError> {
        let policy = self.enforced_policy();
        let builder = WebviewWindowBuilder::from_config(app, &self.window)?;

        #[cfg(windows)]
        let builder = builder.additional_browser_args(&policy.browser_args());
        if policy.mode() != self.mixed_content {
            log::warn!(
                "Mixed content mode {:?} cannot be applied to this webview; it enforces {:?}",
                self.mixed_content,
                policy.mode()
            );
        }

        let window = builder.build()?;
        match self.bridge {
            Some(bridge) => install_permission_hook(&window, bridge)?,
            None => log::warn!("No permission handler registered; in-page requests use webview defaults"),
        }
        Ok(window)
    }
}

/// Platform webviews allow or deny a request as a whole. Allows it only when
/// `granted` covers everything the page asked for.
#[cfg_attr(not(any(target_os = "linux", windows)), allow(dead_code))]
pub(crate) fn allows_whole_request(
    webview: &str,
    requested: &BTreeSet<ResourceId>,
    granted: &BTreeSet<ResourceId>,
) -> bool {
    if granted == requested {
        log::info!("{webview}: allowing in-page request for {requested:?}");
        return true;
    }
    log::info!(
        "{webview}: denying in-page request for {requested:?}; only {granted:?} was granted and partial answers are not supported"
    );
    false
}

impl ContentRuntime for MainWebview {
    fn set_mixed_content_mode(&mut self, mode: MixedContentMode) {
        self.mixed_content = mode;
    }

    fn set_permission_handler(&mut self, bridge: Arc<PermissionBridge>) {
        self.bridge = Some(bridge);
    }
}

#[cfg(target_os = "linux")]
fn install_permission_hook(
    window: &WebviewWindow,
    bridge: Arc<PermissionBridge>,
) -> Result<(), LauncherError> {
    window.with_webview(move |webview| linux::install(&webview.inner(), bridge))?;
    Ok(())
}

#[cfg(windows)]
fn install_permission_hook(
    window: &WebviewWindow,
    bridge: Arc<PermissionBridge>,
) -> Result<(), LauncherError> {
    window.with_webview(move |webview| {
        if let Err(error) = windows::install(&webview.controller(), bridge) {
            log::error!("Failed to install WebView2 permission handler: {error:?}");
        }
    })?;
    Ok(())
}

#[cfg(not(any(target_os = "linux", windows)))]
fn install_permission_hook(
    _window: &WebviewWindow,
    _bridge: Arc<PermissionBridge>,
) -> Result<(), LauncherError> {
    log::info!("Media capture requests are gated by the platform webview's OS prompt");
    Ok(())
}
