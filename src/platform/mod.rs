//! OS permission subsystems.

use std::sync::Arc;

use crate::capability::OsPermissionName;
use crate::ports::{OsPermissions, PermissionCallback, PermissionOutcome, PermissionStatus};

#[cfg(target_os = "macos")]
mod macos;

/// For platforms without a per-app microphone consent API (Linux, Windows
/// desktop). The device is usable as far as the OS is concerned.
pub struct UngatedPermissions;

impl OsPermissions for UngatedPermissions {
    fn check_status(&self, _name: &OsPermissionName) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn request(&self, name: &OsPermissionName, on_result: PermissionCallback) {
        log::debug!("No OS consent dialog for {name} on this platform");
        on_result(PermissionOutcome::Granted);
    }
}

pub fn os_permissions() -> Arc<dyn OsPermissions> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::AvFoundationPermissions)
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(UngatedPermissions)
    }
}
