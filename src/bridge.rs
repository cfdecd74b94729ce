use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::authority::CapabilityAuthority;
use crate::capability::{Capability, ResourceId};
use crate::ports::PermissionRequest;

/// What to do with a request that mixes mapped and unmapped resource ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnrecognizedResources {
    /// Any unmapped id denies the whole request.
    DenyRequest,
    /// Unmapped ids are left out; the mapped ones are granted if the OS allows.
    #[default]
    GrantRecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NoRecognizedResource,
    Unrecognized(ResourceId),
    NotGranted(Capability),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Grant(BTreeSet<ResourceId>),
    Deny(DenyReason),
}

/// Answers in-page capability requests from the authority's grant state.
///
/// Holds no per-request state: every request is decided against the live
/// grant, so a grant that arrives after earlier denials applies to the next
/// request without reloading the page.
pub struct PermissionBridge {
    authority: Arc<CapabilityAuthority>,
    unrecognized: UnrecognizedResources,
}

impl PermissionBridge {
    pub fn new(authority: Arc<CapabilityAuthority>, unrecognized: UnrecognizedResources) -> Self {
        Self {
            authority,
            unrecognized,
        }
    }

    pub fn decide(&self, resources: &BTreeSet<ResourceId>) -> Decision {
        let map = self.authority.capabilities();
        let mut recognized = BTreeSet::new();
        let mut capabilities = BTreeSet::new();
        let mut unrecognized = None;

        for resource in resources {
            match map.capability_for(resource) {
                Some(capability) => {
                    recognized.insert(resource.clone());
                    capabilities.insert(capability);
                }
                None => {
                    unrecognized.get_or_insert_with(|| resource.clone());
                }
            }
        }

        if let Some(resource) = unrecognized {
            if self.unrecognized == UnrecognizedResources::DenyRequest {
                return Decision::Deny(DenyReason::Unrecognized(resource));
            }
        }
        if recognized.is_empty() {
            return Decision::Deny(DenyReason::NoRecognizedResource);
        }
        if let Some(capability) = capabilities
            .into_iter()
            .find(|capability| !self.authority.is_granted(*capability))
        {
            return Decision::Deny(DenyReason::NotGranted(capability));
        }

        Decision::Grant(recognized)
    }

    pub fn on_permission_request<R: PermissionRequest>(&self, request: R) -> Decision {
        let decision = self.decide(request.resources());
        match &decision {
            Decision::Grant(resources) => {
                log::debug!("Bridge grants {resources:?} of {:?}", request.resources());
                request.grant(resources.clone());
            }
            Decision::Deny(reason) => {
                log::info!(
                    "Denying in-page request for {:?}: {reason:?}",
                    request.resources()
                );
                request.deny();
            }
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityMap;
    use crate::ports::{PermissionOutcome, PermissionStatus};
    use crate::testing::{ask, Answer, ScriptedOs};

    fn bridge_with(
        status: PermissionStatus,
        unrecognized: UnrecognizedResources,
    ) -> (PermissionBridge, Arc<ScriptedOs>) {
        let os = ScriptedOs::new(status);
        let authority = Arc::new(CapabilityAuthority::new(
            CapabilityMap::standard(),
            os.clone(),
        ));
        authority.ensure_requested();
        (PermissionBridge::new(authority, unrecognized), os)
    }

    fn audio_only() -> BTreeSet<ResourceId> {
        BTreeSet::from([ResourceId::AUDIO_CAPTURE])
    }

    #[test]
    fn denies_while_undetermined() {
        let (bridge, _os) = bridge_with(PermissionStatus::Unknown, Default::default());
        assert_eq!(
            bridge.decide(&audio_only()),
            Decision::Deny(DenyReason::NotGranted(Capability::AudioCapture))
        );
        assert_eq!(ask(&bridge, &[ResourceId::AUDIO_CAPTURE]), vec![Answer::Denied]);
    }

    #[test]
    fn grants_exactly_the_audio_resource_once_granted() {
        let (bridge, os) = bridge_with(PermissionStatus::Unknown, Default::default());
        assert_eq!(ask(&bridge, &[ResourceId::AUDIO_CAPTURE]), vec![Answer::Denied]);
        assert_eq!(ask(&bridge, &[ResourceId::AUDIO_CAPTURE]), vec![Answer::Denied]);

        os.answer(PermissionOutcome::Granted);
        assert_eq!(
            ask(&bridge, &[ResourceId::AUDIO_CAPTURE]),
            vec![Answer::Granted(audio_only())]
        );
        assert_eq!(os.requests().len(), 1);
    }

    #[test]
    fn denial_holds_for_every_later_request() {
        let (bridge, os) = bridge_with(PermissionStatus::Unknown, Default::default());
        os.answer(PermissionOutcome::Denied);
        for _ in 0..3 {
            assert_eq!(ask(&bridge, &[ResourceId::AUDIO_CAPTURE]), vec![Answer::Denied]);
        }
    }

    #[test]
    fn unmapped_resource_is_denied_even_when_granted() {
        let (bridge, _os) = bridge_with(PermissionStatus::Granted, Default::default());
        assert_eq!(
            bridge.decide(&BTreeSet::from([ResourceId::VIDEO_CAPTURE])),
            Decision::Deny(DenyReason::NoRecognizedResource)
        );
        assert_eq!(ask(&bridge, &[ResourceId::VIDEO_CAPTURE]), vec![Answer::Denied]);
        assert_eq!(ask(&bridge, &[]), vec![Answer::Denied]);
    }

    #[test]
    fn bundled_request_gets_exactly_the_audio_resource() {
        let (bridge, _os) = bridge_with(PermissionStatus::Granted, Default::default());
        assert_eq!(
            ask(
                &bridge,
                &[ResourceId::AUDIO_CAPTURE, ResourceId::VIDEO_CAPTURE]
            ),
            vec![Answer::Granted(audio_only())]
        );
        // Sorts ahead of the audio id, so an early exit on the first unmapped id would deny.
        let resources = [ResourceId::new("a-first-resource"), ResourceId::AUDIO_CAPTURE];
        assert_eq!(ask(&bridge, &resources), vec![Answer::Granted(audio_only())]);
    }

    #[test]
    fn bundled_request_waits_for_the_os_grant() {
        let (bridge, os) = bridge_with(PermissionStatus::Unknown, Default::default());
        let resources = [ResourceId::AUDIO_CAPTURE, ResourceId::VIDEO_CAPTURE];
        assert_eq!(ask(&bridge, &resources), vec![Answer::Denied]);
        os.answer(PermissionOutcome::Granted);
        assert_eq!(ask(&bridge, &resources), vec![Answer::Granted(audio_only())]);
    }

    #[test]
    fn strict_policy_denies_bundled_request_whole() {
        let (bridge, _os) = bridge_with(
            PermissionStatus::Granted,
            UnrecognizedResources::DenyRequest,
        );
        let resources = [ResourceId::AUDIO_CAPTURE, ResourceId::VIDEO_CAPTURE];
        assert_eq!(
            bridge.decide(&resources.iter().cloned().collect()),
            Decision::Deny(DenyReason::Unrecognized(ResourceId::VIDEO_CAPTURE))
        );
        assert_eq!(ask(&bridge, &resources), vec![Answer::Denied]);
        assert_eq!(
            ask(&bridge, &[ResourceId::AUDIO_CAPTURE]),
            vec![Answer::Granted(audio_only())]
        );
    }

    #[test]
    fn identical_requests_get_identical_answers() {
        let (bridge, _os) = bridge_with(PermissionStatus::Granted, Default::default());
        let first = bridge.decide(&audio_only());
        for _ in 0..5 {
            assert_eq!(bridge.decide(&audio_only()), first);
        }
    }
}
