use glib::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use webkit2gtk::{PermissionRequestExt, UserMediaPermissionRequest, WebView, WebViewExt};

use crate::bridge::PermissionBridge;
use crate::capability::ResourceId;
use crate::ports::PermissionRequest;

struct WebKitPermissionRequest {
    request: webkit2gtk::PermissionRequest,
    resources: BTreeSet<ResourceId>,
}

impl WebKitPermissionRequest {
    fn new(request: &webkit2gtk::PermissionRequest) -> Self {
        let mut resources = BTreeSet::new();
        match request.downcast_ref::<UserMediaPermissionRequest>() {
            Some(media) => {
                if media.property::<bool>("is-for-audio-device") {
                    resources.insert(ResourceId::AUDIO_CAPTURE);
                }
                if media.property::<bool>("is-for-video-device") {
                    resources.insert(ResourceId::VIDEO_CAPTURE);
                }
            }
            None => {
                resources.insert(ResourceId::new(request.type_().name()));
            }
        }
        Self {
            request: request.clone(),
            resources,
        }
    }
}

impl PermissionRequest for WebKitPermissionRequest {
    fn resources(&self) -> &BTreeSet<ResourceId> {
        &self.resources
    }

    fn grant(self, resources: BTreeSet<ResourceId>) {
        if super::allows_whole_request("WebKitGTK", &self.resources, &resources) {
            self.request.allow();
        } else {
            self.request.deny();
        }
    }

    fn deny(self) {
        self.request.deny();
    }
}

pub(super) fn install(webview: &WebView, bridge: Arc<PermissionBridge>) {
    webview.connect_permission_request(move |_, request| {
        bridge.on_permission_request(WebKitPermissionRequest::new(request));
        true
    });
    log::debug!("WebKitGTK permission handler installed");
}
