use serde::Deserialize;

use crate::gateway::GatewayEndpoint;

/// Switches Tauri passes to WebView2 when no additional args are given.
/// Overriding the args replaces them, so they are repeated here.
const WEBVIEW2_DEFAULT_ARGS: &str =
    "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection";

/// Whether a secure-origin page may open insecure subresources and connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MixedContentMode {
    NeverAllow,
    /// Passive mixed content only; plaintext connections stay blocked.
    Compatibility,
    #[default]
    AlwaysAllow,
}

impl MixedContentMode {
    pub const fn most_permissive() -> Self {
        MixedContentMode::AlwaysAllow
    }

    pub fn allows_insecure_connections(self) -> bool {
        self == MixedContentMode::AlwaysAllow
    }
}

/// The mode the platform webview ends up enforcing for a requested mode.
/// Only WebView2 takes a switch for it; WebKit and the mobile webviews serve
/// the app from a secure origin and keep blocking plaintext connections.
pub fn platform_enforced(requested: MixedContentMode) -> MixedContentMode {
    if cfg!(windows) {
        requested
    } else {
        MixedContentMode::NeverAllow
    }
}

#[derive(Debug, Clone)]
pub struct NetworkPolicy {
    mode: MixedContentMode,
}

impl NetworkPolicy {
    pub fn new(mode: MixedContentMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MixedContentMode {
        self.mode
    }

    /// Would a page loaded over `https` (`page_is_secure`) be allowed to
    /// connect to `target`? Loopback counts as a trustworthy origin and is
    /// never blocked as mixed content.
    pub fn permits(&self, page_is_secure: bool, target: &GatewayEndpoint) -> bool {
        !page_is_secure
            || target.is_secure()
            || target.is_loopback()
            || self.mode.allows_insecure_connections()
    }

    pub fn browser_args(&self) -> String {
        if self.mode.allows_insecure_connections() {
            format!("{WEBVIEW2_DEFAULT_ARGS} --allow-running-insecure-content")
        } else {
            WEBVIEW2_DEFAULT_ARGS.to_string()
        }
    }
}
