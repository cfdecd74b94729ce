//! Device capabilities and the table that names them on both sides of the bridge.
//!
//! The OS and the embedded content use different identifiers for the same
//! physical device. [`CapabilityMap`] keeps that correspondence as data so a
//! resource id is only ever recognized through an explicit entry.

use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    AudioCapture,
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Capability::AudioCapture => "audio capture",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource identifier used by the embedded content when it asks for a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Cow<'static, str>);

impl ResourceId {
    pub const AUDIO_CAPTURE: ResourceId = ResourceId(Cow::Borrowed("audio-capture"));
    pub const VIDEO_CAPTURE: ResourceId = ResourceId(Cow::Borrowed("video-capture"));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name the OS permission subsystem knows a capability by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OsPermissionName(Cow<'static, str>);

impl OsPermissionName {
    pub const MICROPHONE: OsPermissionName = OsPermissionName(Cow::Borrowed("microphone"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OsPermissionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityMapping {
    pub capability: Capability,
    pub os_name: OsPermissionName,
    pub resource: ResourceId,
}

#[derive(Debug, Clone)]
pub struct CapabilityMap {
    entries: Vec<CapabilityMapping>,
}

impl CapabilityMap {
    /// The table the launcher ships with: microphone ↔ `audio-capture`.
    pub fn standard() -> Self {
        Self::new(vec![CapabilityMapping {
            capability: Capability::AudioCapture,
            os_name: OsPermissionName::MICROPHONE,
            resource: ResourceId::AUDIO_CAPTURE,
        }])
    }

    pub fn new(entries: Vec<CapabilityMapping>) -> Self {
        Self { entries }
    }

    pub fn capability_for(&self, resource: &ResourceId) -> Option<Capability> {
        self.entries
            .iter()
            .find(|entry| &entry.resource == resource)
            .map(|entry| entry.capability)
    }

    pub fn mapping(&self, capability: Capability) -> Option<&CapabilityMapping> {
        self.entries
            .iter()
            .find(|entry| entry.capability == capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityMapping> {
        self.entries.iter()
    }
}

impl Default for CapabilityMap {
    fn default() -> Self {
        Self::standard()
    }
}
