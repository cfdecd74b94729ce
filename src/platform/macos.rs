use block2::RcBlock;
use objc2::runtime::Bool;
use objc2_av_foundation::{AVAuthorizationStatus, AVCaptureDevice, AVMediaType, AVMediaTypeAudio};
use std::sync::Mutex;

use crate::capability::OsPermissionName;
use crate::ports::{OsPermissions, PermissionCallback, PermissionOutcome, PermissionStatus};

/// TCC consent through `AVCaptureDevice`. Needs `NSMicrophoneUsageDescription`
/// in the Info.plist or the request is rejected without a dialog.
pub struct AvFoundationPermissions;

fn media_type(name: &OsPermissionName) -> Option<&'static AVMediaType> {
    match name.as_str() {
        "microphone" => unsafe { AVMediaTypeAudio },
        _ => None,
    }
}

impl OsPermissions for AvFoundationPermissions {
    fn check_status(&self, name: &OsPermissionName) -> PermissionStatus {
        let Some(media_type) = media_type(name) else {
            log::warn!("No AVFoundation media type for {name}");
            return PermissionStatus::Denied;
        };

        let status = unsafe { AVCaptureDevice::authorizationStatusForMediaType(media_type) };
        if status == AVAuthorizationStatus::Authorized {
            PermissionStatus::Granted
        } else if status == AVAuthorizationStatus::Denied
            || status == AVAuthorizationStatus::Restricted
        {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Unknown
        }
    }

    fn request(&self, name: &OsPermissionName, on_result: PermissionCallback) {
        let Some(media_type) = media_type(name) else {
            on_result(PermissionOutcome::Denied);
            return;
        };

        // The completion handler is typed `Fn`; the callback runs at most once.
        let on_result = Mutex::new(Some(on_result));
        let handler = RcBlock::new(move |granted: Bool| {
            let callback = on_result.lock().ok().and_then(|mut slot| slot.take());
            if let Some(callback) = callback {
                callback(if granted.as_bool() {
                    PermissionOutcome::Granted
                } else {
                    PermissionOutcome::Denied
                });
            }
        });
        unsafe {
            AVCaptureDevice::requestAccessForMediaType_completionHandler(media_type, &handler);
        }
    }
}
