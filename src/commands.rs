use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tauri::State;

use crate::authority::CapabilityAuthority;
use crate::capability::Capability;
use crate::gateway::{self, GatewayEndpoint, GatewayProbe};
use crate::grant::GrantState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub struct LauncherState {
    pub authority: Arc<CapabilityAuthority>,
    pub gateway: GatewayEndpoint,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEndpointsResult {
    ws_url: String,
    http_url: String,
    secure: bool,
    local: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrophonePermissionResult {
    state: GrantState,
}

#[tauri::command]
pub fn gateway_endpoints(state: State<'_, LauncherState>) -> GatewayEndpointsResult {
    GatewayEndpointsResult {
        ws_url: state.gateway.ws_url(),
        http_url: state.gateway.http_url(),
        secure: state.gateway.is_secure(),
        local: state.gateway.is_local(),
    }
}

/// Reports the OS grant without prompting.
#[tauri::command]
pub fn microphone_permission(state: State<'_, LauncherState>) -> MicrophonePermissionResult {
    MicrophonePermissionResult {
        state: state.authority.state(Capability::AudioCapture),
    }
}

#[tauri::command]
pub async fn probe_gateway(state: State<'_, LauncherState>) -> Result<GatewayProbe, String> {
    let endpoint = state.gateway.clone();
    let result = gateway::probe(&endpoint, PROBE_TIMEOUT).await;
    if let Some(error) = &result.error {
        log::warn!("Gateway probe for {} failed: {error}", endpoint.ws_url());
    }
    Ok(result)
}
