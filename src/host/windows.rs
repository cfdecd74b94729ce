use std::collections::BTreeSet;
use std::sync::Arc;
use webview2_com::Microsoft::Web::WebView2::Win32::{
    ICoreWebView2Controller, ICoreWebView2PermissionRequestedEventArgs,
    COREWEBVIEW2_PERMISSION_KIND, COREWEBVIEW2_PERMISSION_KIND_CAMERA,
    COREWEBVIEW2_PERMISSION_KIND_MICROPHONE, COREWEBVIEW2_PERMISSION_STATE_ALLOW,
    COREWEBVIEW2_PERMISSION_STATE_DENY,
};
use webview2_com::PermissionRequestedEventHandler;

use crate::bridge::PermissionBridge;
use crate::capability::ResourceId;
use crate::ports::PermissionRequest;

struct WebView2PermissionRequest {
    args: ICoreWebView2PermissionRequestedEventArgs,
    resources: BTreeSet<ResourceId>,
}

fn resource_for(kind: COREWEBVIEW2_PERMISSION_KIND) -> ResourceId {
    if kind == COREWEBVIEW2_PERMISSION_KIND_MICROPHONE {
        ResourceId::AUDIO_CAPTURE
    } else if kind == COREWEBVIEW2_PERMISSION_KIND_CAMERA {
        ResourceId::VIDEO_CAPTURE
    } else {
        ResourceId::new(format!("webview2-permission-{}", kind.0))
    }
}

impl PermissionRequest for WebView2PermissionRequest {
    fn resources(&self) -> &BTreeSet<ResourceId> {
        &self.resources
    }

    fn grant(self, resources: BTreeSet<ResourceId>) {
        let state = if super::allows_whole_request("WebView2", &self.resources, &resources) {
            COREWEBVIEW2_PERMISSION_STATE_ALLOW
        } else {
            COREWEBVIEW2_PERMISSION_STATE_DENY
        };
        if let Err(error) = unsafe { self.args.SetState(state) } {
            log::error!("Failed to answer WebView2 permission request: {error}");
        }
    }

    fn deny(self) {
        if let Err(error) = unsafe { self.args.SetState(COREWEBVIEW2_PERMISSION_STATE_DENY) } {
            log::error!("Failed to answer WebView2 permission request: {error}");
        }
    }
}

pub(super) fn install(
    controller: &ICoreWebView2Controller,
    bridge: Arc<PermissionBridge>,
) -> webview2_com::Result<()> {
    let webview = unsafe { controller.CoreWebView2()? };
    let handler = PermissionRequestedEventHandler::create(Box::new(move |_, args| {
        let Some(args) = args else {
            return Ok(());
        };
        let mut kind = COREWEBVIEW2_PERMISSION_KIND::default();
        unsafe { args.PermissionKind(&mut kind)? };
        bridge.on_permission_request(WebView2PermissionRequest {
            args,
            resources: BTreeSet::from([resource_for(kind)]),
        });
        Ok(())
    }));

    let mut token = 0;
    unsafe { webview.add_PermissionRequested(&handler, &mut token)? };
    log::debug!("WebView2 permission handler installed");
    Ok(())
}
