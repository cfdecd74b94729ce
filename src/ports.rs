//! Contracts for the two host collaborators.
//!
//! The OS permission subsystem and the embedded web runtime both call into
//! the launcher rather than the other way round. These traits describe only
//! what the launcher needs from them, so the authority and the bridge can be
//! driven by a real webview or by a test double.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::bridge::PermissionBridge;
use crate::capability::{OsPermissionName, ResourceId};
use crate::network::MixedContentMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Unknown,
}

/// Final answer delivered by the OS permission dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Granted,
    Denied,
}

pub type PermissionCallback = Box<dyn FnOnce(PermissionOutcome) + Send + 'static>;

pub trait OsPermissions: Send + Sync {
    /// Current status without prompting.
    fn check_status(&self, name: &OsPermissionName) -> PermissionStatus;

    /// Starts a user-mediated request. Must not block; `on_result` runs once
    /// the user answers, possibly on another thread.
    fn request(&self, name: &OsPermissionName, on_result: PermissionCallback);
}

/// An in-page capability request. Answering consumes it, so it can only be
/// answered once.
pub trait PermissionRequest {
    fn resources(&self) -> &BTreeSet<ResourceId>;

    fn grant(self, resources: BTreeSet<ResourceId>);

    fn deny(self);
}

/// Launch-time settings of the embedded content runtime.
pub trait ContentRuntime {
    fn set_mixed_content_mode(&mut self, mode: MixedContentMode);

    fn set_permission_handler(&mut self, bridge: Arc<PermissionBridge>);
}
