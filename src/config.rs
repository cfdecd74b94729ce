use serde::Deserialize;
use serde_json::Value;

use crate::bridge::UnrecognizedResources;
use crate::error::LauncherError;
use crate::gateway::{GatewayEndpoint, DEFAULT_GATEWAY_URL};
use crate::network::MixedContentMode;

/// Key of the launcher's section under `plugins` in `tauri.conf.json`.
pub const CONFIG_SECTION: &str = "voicenote";
pub const GATEWAY_URL_ENV: &str = "VOICENOTE_GATEWAY_URL";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct RawConfig {
    gateway_url: String,
    mixed_content: MixedContentMode,
    unrecognized_resources: UnrecognizedResources,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            mixed_content: MixedContentMode::most_permissive(),
            unrecognized_resources: UnrecognizedResources::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub gateway: GatewayEndpoint,
    pub mixed_content: MixedContentMode,
    pub unrecognized_resources: UnrecognizedResources,
}

impl LauncherConfig {
    /// Defaults, overridden by the config section, overridden by the env var.
    pub fn from_sources(
        section: Option<&Value>,
        gateway_override: Option<String>,
    ) -> Result<Self, LauncherError> {
        let mut raw = match section {
            Some(value) => RawConfig::deserialize(value)?,
            None => RawConfig::default(),
        };
        if let Some(url) = gateway_override.filter(|url| !url.trim().is_empty()) {
            log::info!("Gateway URL overridden by {GATEWAY_URL_ENV}");
            raw.gateway_url = url;
        }

        Ok(Self {
            gateway: GatewayEndpoint::parse(&raw.gateway_url)?,
            mixed_content: raw.mixed_content,
            unrecognized_resources: raw.unrecognized_resources,
        })
    }

    pub fn load(config: &tauri::Config) -> Result<Self, LauncherError> {
        Self::from_sources(
            config.plugins.0.get(CONFIG_SECTION),
            std::env::var(GATEWAY_URL_ENV).ok(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_without_section() {
        let config = LauncherConfig::from_sources(None, None).unwrap();
        assert_eq!(config.gateway.ws_url(), "ws://localhost:3001/");
        assert_eq!(config.mixed_content, MixedContentMode::AlwaysAllow);
        assert_eq!(
            config.unrecognized_resources,
            UnrecognizedResources::GrantRecognized
        );
    }

    #[test]
    fn section_overrides_defaults() {
        let section = json!({
            "gatewayUrl": "192.168.1.20:3001",
            "mixedContent": "compatibility",
            "unrecognizedResources": "denyRequest"
        });
        let config = LauncherConfig::from_sources(Some(&section), None).unwrap();
        assert_eq!(config.gateway.ws_url(), "ws://192.168.1.20:3001/");
        assert_eq!(config.mixed_content, MixedContentMode::Compatibility);
        assert_eq!(
            config.unrecognized_resources,
            UnrecognizedResources::DenyRequest
        );
    }

    #[test]
    fn env_override_wins_unless_blank() {
        let section = json!({ "gatewayUrl": "ws://10.0.0.2:3001" });
        let config =
            LauncherConfig::from_sources(Some(&section), Some("wss://notes.example.com".into()))
                .unwrap();
        assert_eq!(config.gateway.ws_url(), "wss://notes.example.com/");

        let config = LauncherConfig::from_sources(Some(&section), Some("  ".into())).unwrap();
        assert_eq!(config.gateway.ws_url(), "ws://10.0.0.2:3001/");
    }

    #[test]
    fn rejects_unknown_fields_and_bad_urls() {
        let section = json!({ "gatewayUri": "ws://localhost:3001" });
        assert!(matches!(
            LauncherConfig::from_sources(Some(&section), None),
            Err(LauncherError::Config(_))
        ));

        let section = json!({ "gatewayUrl": "ftp://localhost" });
        assert!(matches!(
            LauncherConfig::from_sources(Some(&section), None),
            Err(LauncherError::InvalidGatewayUrl { .. })
        ));
    }
}
