//! CSI Controller service client.
//!
//! The Controller service owns the attach lifecycle: ControllerPublishVolume
//! makes a volume available on a node, ControllerUnpublishVolume releases it.
//! Both are idempotent on the plugin side.

use async_trait::async_trait;
use tonic::{Request, Response, Status};

use crate::proto::{
    ControllerGetCapabilitiesRequest, ControllerGetCapabilitiesResponse,
    ControllerPublishVolumeRequest, ControllerPublishVolumeResponse,
    ControllerUnpublishVolumeRequest, ControllerUnpublishVolumeResponse,
};

/// Controller service as seen from the client.
#[async_trait]
pub trait ControllerService: Send + Sync {
    /// RPCs the controller supports.
    async fn controller_get_capabilities(
        &self,
        request: Request<ControllerGetCapabilitiesRequest>,
    ) -> Result<Response<ControllerGetCapabilitiesResponse>, Status>;

    /// Attach a volume to a node.
    async fn controller_publish_volume(
        &self,
        request: Request<ControllerPublishVolumeRequest>,
    ) -> Result<Response<ControllerPublishVolumeResponse>, Status>;

    /// Detach a volume from a node.
    async fn controller_unpublish_volume(
        &self,
        request: Request<ControllerUnpublishVolumeRequest>,
    ) -> Result<Response<ControllerUnpublishVolumeResponse>, Status>;
}
