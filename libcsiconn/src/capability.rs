//! Capability discovery.
//!
//! Plugins advertise their features as lists of loosely-typed variant
//! records. This module decodes those lists into tagged enums with an
//! explicit `Unknown` case and collects them into immutable sets the caller
//! can branch on. Records with no type and enum values this client doesn't
//! recognize are skipped, so a newer plugin never breaks discovery.

use std::collections::HashSet;

use crate::proto::controller_service_capability::{self, rpc};
use crate::proto::plugin_capability::{self, service, volume_expansion};
use crate::proto::{ControllerGetCapabilitiesResponse, GetPluginCapabilitiesResponse};

/// An RPC advertised by the Controller service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerCapability {
    CreateDeleteVolume,
    /// ControllerPublishVolume / ControllerUnpublishVolume, i.e. attach.
    PublishUnpublishVolume,
    ListVolumes,
    GetCapacity,
    CreateDeleteSnapshot,
    ListSnapshots,
    CloneVolume,
    /// ControllerPublishVolume honours `readonly`.
    PublishReadonly,
    ExpandVolume,
    ListVolumesPublishedNodes,
    VolumeCondition,
    GetVolume,
    SingleNodeMultiWriter,
    ModifyVolume,
    /// A type this client does not know, or the protocol's `UNKNOWN`.
    Unknown(i32),
}

impl ControllerCapability {
    fn from_wire(cap: &crate::proto::ControllerServiceCapability) -> Option<Self> {
        let controller_service_capability::Type::Rpc(entry) = cap.r#type.as_ref()?;
        Some(match rpc::Type::try_from(entry.r#type) {
            Ok(rpc::Type::CreateDeleteVolume) => Self::CreateDeleteVolume,
            Ok(rpc::Type::PublishUnpublishVolume) => Self::PublishUnpublishVolume,
            Ok(rpc::Type::ListVolumes) => Self::ListVolumes,
            Ok(rpc::Type::GetCapacity) => Self::GetCapacity,
            Ok(rpc::Type::CreateDeleteSnapshot) => Self::CreateDeleteSnapshot,
            Ok(rpc::Type::ListSnapshots) => Self::ListSnapshots,
            Ok(rpc::Type::CloneVolume) => Self::CloneVolume,
            Ok(rpc::Type::PublishReadonly) => Self::PublishReadonly,
            Ok(rpc::Type::ExpandVolume) => Self::ExpandVolume,
            Ok(rpc::Type::ListVolumesPublishedNodes) => Self::ListVolumesPublishedNodes,
            Ok(rpc::Type::VolumeCondition) => Self::VolumeCondition,
            Ok(rpc::Type::GetVolume) => Self::GetVolume,
            Ok(rpc::Type::SingleNodeMultiWriter) => Self::SingleNodeMultiWriter,
            Ok(rpc::Type::ModifyVolume) => Self::ModifyVolume,
            Ok(rpc::Type::Unknown) | Err(_) => Self::Unknown(entry.r#type),
        })
    }
}

/// A capability advertised by the Identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCapability {
    /// The plugin provides the Controller service.
    ControllerService,
    /// Volumes may not be equally accessible from all nodes.
    VolumeAccessibilityConstraints,
    /// The plugin provides the GroupController service.
    GroupControllerService,
    /// Volumes can be expanded while published.
    OnlineVolumeExpansion,
    /// Volumes can only be expanded while unpublished.
    OfflineVolumeExpansion,
    /// A type this client does not know, or the protocol's `UNKNOWN`.
    Unknown(i32),
}

impl PluginCapability {
    fn from_wire(cap: &crate::proto::PluginCapability) -> Option<Self> {
        Some(match cap.r#type.as_ref()? {
            plugin_capability::Type::Service(svc) => match service::Type::try_from(svc.r#type) {
                Ok(service::Type::ControllerService) => Self::ControllerService,
                Ok(service::Type::VolumeAccessibilityConstraints) => {
                    Self::VolumeAccessibilityConstraints
                }
                Ok(service::Type::GroupControllerService) => Self::GroupControllerService,
                Ok(service::Type::Unknown) | Err(_) => Self::Unknown(svc.r#type),
            },
            plugin_capability::Type::VolumeExpansion(exp) => {
                match volume_expansion::Type::try_from(exp.r#type) {
                    Ok(volume_expansion::Type::Online) => Self::OnlineVolumeExpansion,
                    Ok(volume_expansion::Type::Offline) => Self::OfflineVolumeExpansion,
                    Ok(volume_expansion::Type::Unknown) | Err(_) => Self::Unknown(exp.r#type),
                }
            }
        })
    }
}

/// Capabilities of the Controller service, from one
/// ControllerGetCapabilities response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerCapabilities {
    caps: HashSet<ControllerCapability>,
}

impl ControllerCapabilities {
    /// Whether `cap` was advertised. `Unknown` entries never match.
    pub fn contains(&self, cap: ControllerCapability) -> bool {
        !matches!(cap, ControllerCapability::Unknown(_)) && self.caps.contains(&cap)
    }

    pub fn supports_publish_unpublish(&self) -> bool {
        self.contains(ControllerCapability::PublishUnpublishVolume)
    }

    pub fn supports_publish_readonly(&self) -> bool {
        self.contains(ControllerCapability::PublishReadonly)
    }

    /// Volumes of this plugin must be attached before they can be staged.
    pub fn requires_attach(&self) -> bool {
        self.supports_publish_unpublish()
    }

    /// Every recognised capability; unknown records are dropped.
    pub fn iter(&self) -> impl Iterator<Item = &ControllerCapability> {
        self.caps.iter()
    }
}

impl From<&ControllerGetCapabilitiesResponse> for ControllerCapabilities {
    fn from(resp: &ControllerGetCapabilitiesResponse) -> Self {
        let caps = resp
            .capabilities
            .iter()
            .filter_map(ControllerCapability::from_wire)
            .filter(|cap| !matches!(cap, ControllerCapability::Unknown(_)))
            .collect();
        Self { caps }
    }
}

impl FromIterator<ControllerCapability> for ControllerCapabilities {
    fn from_iter<I: IntoIterator<Item = ControllerCapability>>(iter: I) -> Self {
        let caps = iter
            .into_iter()
            .filter(|cap| !matches!(cap, ControllerCapability::Unknown(_)))
            .collect();
        Self { caps }
    }
}

/// Capabilities of the plugin as a whole, from one GetPluginCapabilities
/// response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginCapabilities {
    caps: HashSet<PluginCapability>,
}

impl PluginCapabilities {
    /// Whether `cap` was advertised. `Unknown` entries never match.
    pub fn contains(&self, cap: PluginCapability) -> bool {
        !matches!(cap, PluginCapability::Unknown(_)) && self.caps.contains(&cap)
    }

    pub fn has_controller_service(&self) -> bool {
        self.contains(PluginCapability::ControllerService)
    }

    pub fn has_volume_accessibility_constraints(&self) -> bool {
        self.contains(PluginCapability::VolumeAccessibilityConstraints)
    }

    /// Every recognised capability; unknown records are dropped.
    pub fn iter(&self) -> impl Iterator<Item = &PluginCapability> {
        self.caps.iter()
    }
}

impl From<&GetPluginCapabilitiesResponse> for PluginCapabilities {
    fn from(resp: &GetPluginCapabilitiesResponse) -> Self {
        let caps = resp
            .capabilities
            .iter()
            .filter_map(PluginCapability::from_wire)
            .filter(|cap| !matches!(cap, PluginCapability::Unknown(_)))
            .collect();
        Self { caps }
    }
}
