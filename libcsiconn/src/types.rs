//! Caller-facing volume types.
//!
//! These are the strongly-typed forms of the wire messages a caller hands to
//! [`CsiConnection::attach`](crate::CsiConnection::attach). They are
//! complete by construction, so a publish request can never carry a
//! capability without an access type or mode.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::proto;
use crate::proto::volume_capability::access_mode::Mode;

/// Opaque publish properties returned by ControllerPublishVolume, to be
/// handed verbatim to the node-side stage/publish calls.
pub type PublishContext = HashMap<String, String>;

/// Describes how a volume may be accessed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Published once as read/write on a single node.
    SingleNodeWriter,
    /// Published once as read-only on a single node.
    SingleNodeReaderOnly,
    /// Published read-only on multiple nodes.
    MultiNodeReaderOnly,
    /// Published on multiple nodes, only one of them read/write.
    MultiNodeSingleWriter,
    /// Published read/write on multiple nodes.
    MultiNodeMultiWriter,
    /// Published read/write by a single workload on a single node.
    SingleNodeSingleWriter,
    /// Published read/write by several workloads on a single node.
    SingleNodeMultiWriter,
}

impl From<AccessMode> for Mode {
    fn from(mode: AccessMode) -> Self {
        match mode {
            AccessMode::SingleNodeWriter => Mode::SingleNodeWriter,
            AccessMode::SingleNodeReaderOnly => Mode::SingleNodeReaderOnly,
            AccessMode::MultiNodeReaderOnly => Mode::MultiNodeReaderOnly,
            AccessMode::MultiNodeSingleWriter => Mode::MultiNodeSingleWriter,
            AccessMode::MultiNodeMultiWriter => Mode::MultiNodeMultiWriter,
            AccessMode::SingleNodeSingleWriter => Mode::SingleNodeSingleWriter,
            AccessMode::SingleNodeMultiWriter => Mode::SingleNodeMultiWriter,
        }
    }
}

/// Which API the volume is consumed through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccessType {
    /// Raw block device.
    Block,
    /// Mounted filesystem.
    Mount {
        /// Filesystem type; empty means plugin default.
        #[serde(default)]
        fs_type: String,
        /// Additional mount flags (e.g. `"noatime"`).
        #[serde(default)]
        mount_flags: Vec<String>,
    },
}

/// Describes the capabilities required from a volume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeCapability {
    /// Requested access API.
    pub access_type: AccessType,
    /// Requested access mode.
    pub access_mode: AccessMode,
}

impl VolumeCapability {
    /// Filesystem capability with the plugin's default filesystem.
    pub fn mount(access_mode: AccessMode) -> Self {
        Self {
            access_type: AccessType::Mount {
                fs_type: String::new(),
                mount_flags: Vec::new(),
            },
            access_mode,
        }
    }

    /// Raw block capability.
    pub fn block(access_mode: AccessMode) -> Self {
        Self {
            access_type: AccessType::Block,
            access_mode,
        }
    }
}

impl From<&VolumeCapability> for proto::VolumeCapability {
    fn from(cap: &VolumeCapability) -> Self {
        use proto::volume_capability::{
            AccessMode as WireAccessMode, AccessType as WireAccessType, BlockVolume, MountVolume,
        };

        let access_type = match &cap.access_type {
            AccessType::Block => WireAccessType::Block(BlockVolume {}),
            AccessType::Mount {
                fs_type,
                mount_flags,
            } => WireAccessType::Mount(MountVolume {
                fs_type: fs_type.clone(),
                mount_flags: mount_flags.clone(),
                volume_mount_group: String::new(),
            }),
        };

        Self {
            access_mode: Some(WireAccessMode {
                mode: Mode::from(cap.access_mode) as i32,
            }),
            access_type: Some(access_type),
        }
    }
}
