use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capability::{Capability, CapabilityMap};
use crate::grant::{GrantCell, GrantState};
use crate::ports::{OsPermissions, PermissionOutcome, PermissionStatus};

/// Owns the OS-level grant for every capability in its map.
///
/// The OS is asked once per process, from [`ensure_requested`]. Its answer
/// lands in a [`GrantCell`] and never changes afterwards; until it arrives
/// the capability reads as not granted.
///
/// [`ensure_requested`]: CapabilityAuthority::ensure_requested
pub struct CapabilityAuthority {
    os: Arc<dyn OsPermissions>,
    capabilities: CapabilityMap,
    grants: HashMap<Capability, Arc<GrantCell>>,
    requested: AtomicBool,
}

impl CapabilityAuthority {
    pub fn new(capabilities: CapabilityMap, os: Arc<dyn OsPermissions>) -> Self {
        let grants = capabilities
            .iter()
            .map(|mapping| (mapping.capability, Arc::new(GrantCell::new())))
            .collect();
        Self {
            os,
            capabilities,
            grants,
            requested: AtomicBool::new(false),
        }
    }

    pub fn capabilities(&self) -> &CapabilityMap {
        &self.capabilities
    }

    pub fn ensure_requested(&self) {
        if self.requested.swap(true, Ordering::AcqRel) {
            log::debug!("OS permissions already requested for this process");
            return;
        }

        for mapping in self.capabilities.iter() {
            let Some(cell) = self.grants.get(&mapping.capability) else {
                continue;
            };

            let status = self.os.check_status(&mapping.os_name);
            if status == PermissionStatus::Granted {
                cell.settle(PermissionOutcome::Granted);
                log::info!(
                    "{} already granted by the OS ({})",
                    mapping.capability,
                    mapping.os_name
                );
                continue;
            }

            log::info!(
                "Requesting {} permission from the OS ({}), current status {:?}",
                mapping.capability,
                mapping.os_name,
                status
            );
            let cell = Arc::clone(cell);
            let capability = mapping.capability;
            self.os.request(
                &mapping.os_name,
                Box::new(move |outcome| {
                    if cell.settle(outcome) {
                        log::info!("OS answered {capability} permission: {outcome:?}");
                    } else {
                        log::warn!(
                            "Ignoring repeated OS answer {outcome:?} for {capability}; keeping {:?}",
                            cell.get()
                        );
                    }
                }),
            );
        }
    }

    /// Fail-closed: `false` until the OS has answered with a grant.
    pub fn is_granted(&self, capability: Capability) -> bool {
        self.state(capability) == GrantState::Granted
    }

    pub fn state(&self, capability: Capability) -> GrantState {
        self.grants
            .get(&capability)
            .map(|cell| cell.get())
            .unwrap_or(GrantState::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::OsPermissionName;
    use crate::testing::ScriptedOs;

    fn authority(os: &Arc<ScriptedOs>) -> CapabilityAuthority {
        CapabilityAuthority::new(CapabilityMap::standard(), os.clone())
    }

    #[test]
    fn already_granted_skips_the_prompt() {
        let os = ScriptedOs::new(PermissionStatus::Granted);
        let authority = authority(&os);
        authority.ensure_requested();
        assert!(os.requests().is_empty());
        assert!(authority.is_granted(Capability::AudioCapture));
    }

    #[test]
    fn undetermined_status_prompts_and_reads_false_until_answered() {
        let os = ScriptedOs::new(PermissionStatus::Unknown);
        let authority = authority(&os);
        authority.ensure_requested();
        assert_eq!(os.requests(), vec![OsPermissionName::MICROPHONE]);
        assert_eq!(authority.state(Capability::AudioCapture), GrantState::Unknown);
        assert!(!authority.is_granted(Capability::AudioCapture));

        os.answer(PermissionOutcome::Granted);
        assert!(authority.is_granted(Capability::AudioCapture));
    }

    #[test]
    fn denial_is_terminal() {
        let os = ScriptedOs::new(PermissionStatus::Unknown);
        let authority = authority(&os);
        authority.ensure_requested();
        os.answer(PermissionOutcome::Denied);
        os.answer(PermissionOutcome::Granted);
        assert_eq!(authority.state(Capability::AudioCapture), GrantState::Denied);
        assert!(!authority.is_granted(Capability::AudioCapture));
    }

    #[test]
    fn requests_only_once_per_process() {
        let os = ScriptedOs::new(PermissionStatus::Denied);
        let authority = authority(&os);
        authority.ensure_requested();
        authority.ensure_requested();
        assert_eq!(os.requests().len(), 1);
    }

    #[test]
    fn unmapped_capability_table_never_grants() {
        let os = ScriptedOs::new(PermissionStatus::Granted);
        let authority = CapabilityAuthority::new(CapabilityMap::new(Vec::new()), os.clone());
        authority.ensure_requested();
        assert!(!authority.is_granted(Capability::AudioCapture));
    }
}
