//! Wire messages for the `csi.v1` services consumed by this client.
//!
//! Only the Identity, Controller and Node messages used by
//! [`CsiConnection`](crate::CsiConnection) are defined here. Field names, tags
//! and optional/required-ness match the CSI v1 protobuf schema so the
//! encoding is interoperable with any conforming plugin.

use std::collections::HashMap;

/// Fully-qualified gRPC service names.
pub const IDENTITY_SERVICE: &str = "csi.v1.Identity";
pub const CONTROLLER_SERVICE: &str = "csi.v1.Controller";
pub const NODE_SERVICE: &str = "csi.v1.Node";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Intentionally empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPluginInfoRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPluginInfoResponse {
    /// Plugin name in domain name notation. This field is REQUIRED.
    #[prost(string, tag = "1")]
    pub name: String,
    /// This field is REQUIRED. Value of this field is opaque to the CO.
    #[prost(string, tag = "2")]
    pub vendor_version: String,
    /// This field is OPTIONAL. Values are opaque to the CO.
    #[prost(map = "string, string", tag = "3")]
    pub manifest: HashMap<String, String>,
}

/// Intentionally empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPluginCapabilitiesRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetPluginCapabilitiesResponse {
    /// This field is OPTIONAL.
    #[prost(message, repeated, tag = "1")]
    pub capabilities: Vec<PluginCapability>,
}

/// Specifies a capability of the plugin.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PluginCapability {
    #[prost(oneof = "plugin_capability::Type", tags = "1, 2")]
    pub r#type: Option<plugin_capability::Type>,
}

/// Nested message and enum types in `PluginCapability`.
pub mod plugin_capability {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Service {
        #[prost(enumeration = "service::Type", tag = "1")]
        pub r#type: i32,
    }

    /// Nested message and enum types in `Service`.
    pub mod service {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Type {
            Unknown = 0,
            ControllerService = 1,
            VolumeAccessibilityConstraints = 2,
            GroupControllerService = 3,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VolumeExpansion {
        #[prost(enumeration = "volume_expansion::Type", tag = "1")]
        pub r#type: i32,
    }

    /// Nested message and enum types in `VolumeExpansion`.
    pub mod volume_expansion {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Type {
            Unknown = 0,
            Online = 1,
            Offline = 2,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        /// Service that the plugin supports.
        #[prost(message, tag = "1")]
        Service(Service),
        #[prost(message, tag = "2")]
        VolumeExpansion(VolumeExpansion),
    }
}

/// Intentionally empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProbeRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProbeResponse {
    /// This field is OPTIONAL. If not present the caller SHALL assume the
    /// plugin is ready.
    #[prost(message, optional, tag = "1")]
    pub ready: Option<bool>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Intentionally empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerGetCapabilitiesRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerGetCapabilitiesResponse {
    /// This field is OPTIONAL.
    #[prost(message, repeated, tag = "1")]
    pub capabilities: Vec<ControllerServiceCapability>,
}

/// Specifies a capability of the controller service.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerServiceCapability {
    #[prost(oneof = "controller_service_capability::Type", tags = "1")]
    pub r#type: Option<controller_service_capability::Type>,
}

/// Nested message and enum types in `ControllerServiceCapability`.
pub mod controller_service_capability {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Rpc {
        #[prost(enumeration = "rpc::Type", tag = "1")]
        pub r#type: i32,
    }

    /// Nested message and enum types in `RPC`.
    pub mod rpc {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Type {
            Unknown = 0,
            CreateDeleteVolume = 1,
            PublishUnpublishVolume = 2,
            ListVolumes = 3,
            GetCapacity = 4,
            CreateDeleteSnapshot = 5,
            ListSnapshots = 6,
            CloneVolume = 7,
            /// Indicates the SP supports ControllerPublishVolume.readonly.
            PublishReadonly = 8,
            ExpandVolume = 9,
            ListVolumesPublishedNodes = 10,
            VolumeCondition = 11,
            GetVolume = 12,
            SingleNodeMultiWriter = 13,
            ModifyVolume = 14,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        /// RPC that the controller supports.
        #[prost(message, tag = "1")]
        Rpc(Rpc),
    }
}

/// Specify a capability of a volume.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VolumeCapability {
    /// This is a REQUIRED field.
    #[prost(message, optional, tag = "3")]
    pub access_mode: Option<volume_capability::AccessMode>,
    /// One of the following fields MUST be specified.
    #[prost(oneof = "volume_capability::AccessType", tags = "1, 2")]
    pub access_type: Option<volume_capability::AccessType>,
}

/// Nested message and enum types in `VolumeCapability`.
pub mod volume_capability {
    /// Intentionally empty, for now.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct BlockVolume {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct MountVolume {
        /// An empty string is equal to an unspecified field value.
        #[prost(string, tag = "1")]
        pub fs_type: String,
        /// `mount_flags` MAY contain sensitive information.
        #[prost(string, repeated, tag = "2")]
        pub mount_flags: Vec<String>,
        #[prost(string, tag = "3")]
        pub volume_mount_group: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct AccessMode {
        /// This field is REQUIRED.
        #[prost(enumeration = "access_mode::Mode", tag = "1")]
        pub mode: i32,
    }

    /// Nested message and enum types in `AccessMode`.
    pub mod access_mode {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Mode {
            Unknown = 0,
            SingleNodeWriter = 1,
            SingleNodeReaderOnly = 2,
            MultiNodeReaderOnly = 3,
            MultiNodeSingleWriter = 4,
            MultiNodeMultiWriter = 5,
            SingleNodeSingleWriter = 6,
            SingleNodeMultiWriter = 7,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum AccessType {
        #[prost(message, tag = "1")]
        Block(BlockVolume),
        #[prost(message, tag = "2")]
        Mount(MountVolume),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerPublishVolumeRequest {
    /// This field is REQUIRED.
    #[prost(string, tag = "1")]
    pub volume_id: String,
    /// This field is REQUIRED.
    #[prost(string, tag = "2")]
    pub node_id: String,
    /// This is a REQUIRED field.
    #[prost(message, optional, tag = "3")]
    pub volume_capability: Option<VolumeCapability>,
    /// This is a REQUIRED field.
    #[prost(bool, tag = "4")]
    pub readonly: bool,
    /// This field is OPTIONAL.
    #[prost(map = "string, string", tag = "5")]
    pub secrets: HashMap<String, String>,
    /// This field is OPTIONAL.
    #[prost(map = "string, string", tag = "6")]
    pub volume_context: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerPublishVolumeResponse {
    /// This field is OPTIONAL and when present MUST be passed to subsequent
    /// `NodeStageVolume` or `NodePublishVolume` calls.
    #[prost(map = "string, string", tag = "1")]
    pub publish_context: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerUnpublishVolumeRequest {
    /// This field is REQUIRED.
    #[prost(string, tag = "1")]
    pub volume_id: String,
    /// This field is OPTIONAL.
    #[prost(string, tag = "2")]
    pub node_id: String,
    /// This field is OPTIONAL.
    #[prost(map = "string, string", tag = "3")]
    pub secrets: HashMap<String, String>,
}

/// Intentionally empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ControllerUnpublishVolumeResponse {}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Intentionally empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeGetInfoRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeGetInfoResponse {
    /// This field is REQUIRED.
    #[prost(string, tag = "1")]
    pub node_id: String,
    /// This field is OPTIONAL. Zero means unlimited.
    #[prost(int64, tag = "2")]
    pub max_volumes_per_node: i64,
    /// This field is OPTIONAL.
    #[prost(message, optional, tag = "3")]
    pub accessible_topology: Option<Topology>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Topology {
    #[prost(map = "string, string", tag = "1")]
    pub segments: HashMap<String, String>,
}
