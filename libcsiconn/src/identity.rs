//! CSI Identity service client.
//!
//! Every CSI plugin serves Identity. The orchestrator uses it to learn the
//! driver name and which other services the plugin provides.

use async_trait::async_trait;
use tonic::{Request, Response, Status};

use crate::proto::{
    GetPluginCapabilitiesRequest, GetPluginCapabilitiesResponse, GetPluginInfoRequest,
    GetPluginInfoResponse, ProbeRequest, ProbeResponse,
};

/// Identity service as seen from the client.
///
/// The gRPC implementation is [`GrpcIdentity`](crate::transport::GrpcIdentity);
/// an in-process fake can implement this trait directly.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Plugin name, vendor version and manifest.
    async fn get_plugin_info(
        &self,
        request: Request<GetPluginInfoRequest>,
    ) -> Result<Response<GetPluginInfoResponse>, Status>;

    /// Services and features the plugin advertises.
    async fn get_plugin_capabilities(
        &self,
        request: Request<GetPluginCapabilitiesRequest>,
    ) -> Result<Response<GetPluginCapabilitiesResponse>, Status>;

    /// Readiness probe.
    async fn probe(&self, request: Request<ProbeRequest>)
    -> Result<Response<ProbeResponse>, Status>;
}
