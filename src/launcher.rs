use std::sync::Arc;

use crate::authority::CapabilityAuthority;
use crate::bridge::PermissionBridge;
use crate::gateway::GatewayEndpoint;
use crate::network::{MixedContentMode, NetworkPolicy};
use crate::ports::ContentRuntime;

/// Launch sequence: ask the OS first, then configure the content runtime.
/// The OS answer may arrive after this returns.
pub fn launch<R: ContentRuntime>(
    authority: &CapabilityAuthority,
    bridge: Arc<PermissionBridge>,
    runtime: &mut R,
    mixed_content: MixedContentMode,
) {
    authority.ensure_requested();
    runtime.set_mixed_content_mode(mixed_content);
    runtime.set_permission_handler(bridge);
}

/// Checks that the app's secure origin can reach `gateway` under the policy
/// the webview actually enforces. Returns `false` and warns when the
/// connection would be blocked as mixed content.
pub fn check_gateway(policy: &NetworkPolicy, gateway: &GatewayEndpoint) -> bool {
    if policy.permits(true, gateway) {
        return true;
    }
    log::warn!(
        "Gateway {} is plaintext and not loopback; the webview enforces {:?} and will block it. Use wss:// or a loopback address",
        gateway.ws_url(),
        policy.mode()
    );
    false
}
