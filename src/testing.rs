//! Doubles for the host ports, shared by unit and integration tests.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::bridge::PermissionBridge;
use crate::capability::{OsPermissionName, ResourceId};
use crate::network::MixedContentMode;
use crate::ports::{
    ContentRuntime, OsPermissions, PermissionCallback, PermissionOutcome, PermissionRequest,
    PermissionStatus,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// OS whose dialog stays open until `answer` is called, from any thread.
pub struct ScriptedOs {
    status: Mutex<PermissionStatus>,
    pending: Mutex<Vec<PermissionCallback>>,
    requested: Mutex<Vec<OsPermissionName>>,
}

impl ScriptedOs {
    pub fn new(status: PermissionStatus) -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(status),
            pending: Mutex::new(Vec::new()),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn answer(&self, outcome: PermissionOutcome) {
        *lock(&self.status) = match outcome {
            PermissionOutcome::Granted => PermissionStatus::Granted,
            PermissionOutcome::Denied => PermissionStatus::Denied,
        };
        let pending: Vec<_> = lock(&self.pending).drain(..).collect();
        for callback in pending {
            callback(outcome);
        }
    }

    pub fn requests(&self) -> Vec<OsPermissionName> {
        lock(&self.requested).clone()
    }
}

impl OsPermissions for ScriptedOs {
    fn check_status(&self, _name: &OsPermissionName) -> PermissionStatus {
        *lock(&self.status)
    }

    fn request(&self, name: &OsPermissionName, on_result: PermissionCallback) {
        lock(&self.requested).push(name.clone());
        lock(&self.pending).push(on_result);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Granted(BTreeSet<ResourceId>),
    Denied,
}

/// In-page request that logs every answer it receives.
pub struct RecordingRequest {
    resources: BTreeSet<ResourceId>,
    answers: Arc<Mutex<Vec<Answer>>>,
}

impl RecordingRequest {
    pub fn new(resources: &[ResourceId]) -> (Self, Arc<Mutex<Vec<Answer>>>) {
        let answers = Arc::new(Mutex::new(Vec::new()));
        let request = Self {
            resources: resources.iter().cloned().collect(),
            answers: Arc::clone(&answers),
        };
        (request, answers)
    }
}

impl PermissionRequest for RecordingRequest {
    fn resources(&self) -> &BTreeSet<ResourceId> {
        &self.resources
    }

    fn grant(self, resources: BTreeSet<ResourceId>) {
        lock(&self.answers).push(Answer::Granted(resources));
    }

    fn deny(self) {
        lock(&self.answers).push(Answer::Denied);
    }
}

/// Sends one request through `bridge` and returns the answers it got.
pub fn ask(bridge: &PermissionBridge, resources: &[ResourceId]) -> Vec<Answer> {
    let (request, answers) = RecordingRequest::new(resources);
    bridge.on_permission_request(request);
    let answers = lock(&answers).clone();
    answers
}

#[derive(Default)]
pub struct RecordingRuntime {
    pub calls: Vec<&'static str>,
    pub mode: Option<MixedContentMode>,
    pub bridge: Option<Arc<PermissionBridge>>,
}

impl ContentRuntime for RecordingRuntime {
    fn set_mixed_content_mode(&mut self, mode: MixedContentMode) {
        self.calls.push("mixed_content");
        self.mode = Some(mode);
    }

    fn set_permission_handler(&mut self, bridge: Arc<PermissionBridge>) {
        self.calls.push("permission_handler");
        self.bridge = Some(bridge);
    }
}
