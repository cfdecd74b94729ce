use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::ports::PermissionOutcome;

/// OS permission outcome for one capability, as last reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum GrantState {
    Unknown = 0,
    Granted = 1,
    Denied = 2,
}

impl GrantState {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => GrantState::Granted,
            2 => GrantState::Denied,
            _ => GrantState::Unknown,
        }
    }
}

impl From<PermissionOutcome> for GrantState {
    fn from(outcome: PermissionOutcome) -> Self {
        match outcome {
            PermissionOutcome::Granted => GrantState::Granted,
            PermissionOutcome::Denied => GrantState::Denied,
        }
    }
}

/// Starts `Unknown` and settles exactly once. Written by the OS callback,
/// which may run on any thread; read by the bridge on the UI thread.
#[derive(Debug)]
pub struct GrantCell(AtomicU8);

impl GrantCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(GrantState::Unknown as u8))
    }

    pub fn get(&self) -> GrantState {
        GrantState::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Records the OS answer. Returns `false` when the cell had already settled,
    /// in which case the earlier answer stands.
    pub fn settle(&self, outcome: PermissionOutcome) -> bool {
        self.0
            .compare_exchange(
                GrantState::Unknown as u8,
                GrantState::from(outcome) as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for GrantCell {
    fn default() -> Self {
        Self::new()
    }
}
