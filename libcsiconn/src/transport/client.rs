//! gRPC implementations of the CSI service traits.
//!
//! All three clients share one [`Channel`]. Each call works on its own clone
//! of the (cheap, reference-counted) handle, so concurrent calls never
//! contend on client state.

use std::fmt;

use async_trait::async_trait;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::GrpcMethod;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::controller::ControllerService;
use crate::identity::IdentityService;
use crate::node::NodeService;
use crate::proto::*;
use crate::sanitize::Sanitize;

/// Issue one unary call, logging the sanitized request and the outcome.
async fn unary<Req, Resp>(
    mut grpc: Grpc<Channel>,
    service: &'static str,
    method: &'static str,
    path: &'static str,
    mut request: Request<Req>,
) -> Result<Response<Resp>, Status>
where
    Req: prost::Message + Sanitize + Send + Sync + 'static,
    Resp: prost::Message + Default + fmt::Debug + Send + Sync + 'static,
{
    debug!(method = path, request = ?request.get_ref().sanitized(), "GRPC call");

    grpc.ready()
        .await
        .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;
    request
        .extensions_mut()
        .insert(GrpcMethod::new(service, method));

    let result = grpc
        .unary(request, PathAndQuery::from_static(path), ProstCodec::default())
        .await;
    match &result {
        Ok(response) => debug!(method = path, response = ?response.get_ref(), "GRPC response"),
        Err(status) => debug!(
            method = path,
            code = ?status.code(),
            error = %status.message(),
            "GRPC error"
        ),
    }
    result
}

/// Identity service over gRPC.
#[derive(Debug, Clone)]
pub struct GrpcIdentity {
    inner: Grpc<Channel>,
}

impl GrpcIdentity {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }
}

#[async_trait]
impl IdentityService for GrpcIdentity {
    async fn get_plugin_info(
        &self,
        request: Request<GetPluginInfoRequest>,
    ) -> Result<Response<GetPluginInfoResponse>, Status> {
        unary(
            self.inner.clone(),
            IDENTITY_SERVICE,
            "GetPluginInfo",
            "/csi.v1.Identity/GetPluginInfo",
            request,
        )
        .await
    }

    async fn get_plugin_capabilities(
        &self,
        request: Request<GetPluginCapabilitiesRequest>,
    ) -> Result<Response<GetPluginCapabilitiesResponse>, Status> {
        unary(
            self.inner.clone(),
            IDENTITY_SERVICE,
            "GetPluginCapabilities",
            "/csi.v1.Identity/GetPluginCapabilities",
            request,
        )
        .await
    }

    async fn probe(
        &self,
        request: Request<ProbeRequest>,
    ) -> Result<Response<ProbeResponse>, Status> {
        unary(
            self.inner.clone(),
            IDENTITY_SERVICE,
            "Probe",
            "/csi.v1.Identity/Probe",
            request,
        )
        .await
    }
}

/// Controller service over gRPC.
#[derive(Debug, Clone)]
pub struct GrpcController {
    inner: Grpc<Channel>,
}

impl GrpcController {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }
}

#[async_trait]
impl ControllerService for GrpcController {
    async fn controller_get_capabilities(
        &self,
        request: Request<ControllerGetCapabilitiesRequest>,
    ) -> Result<Response<ControllerGetCapabilitiesResponse>, Status> {
        unary(
            self.inner.clone(),
            CONTROLLER_SERVICE,
            "ControllerGetCapabilities",
            "/csi.v1.Controller/ControllerGetCapabilities",
            request,
        )
        .await
    }

    async fn controller_publish_volume(
        &self,
        request: Request<ControllerPublishVolumeRequest>,
    ) -> Result<Response<ControllerPublishVolumeResponse>, Status> {
        unary(
            self.inner.clone(),
            CONTROLLER_SERVICE,
            "ControllerPublishVolume",
            "/csi.v1.Controller/ControllerPublishVolume",
            request,
        )
        .await
    }

    async fn controller_unpublish_volume(
        &self,
        request: Request<ControllerUnpublishVolumeRequest>,
    ) -> Result<Response<ControllerUnpublishVolumeResponse>, Status> {
        unary(
            self.inner.clone(),
            CONTROLLER_SERVICE,
            "ControllerUnpublishVolume",
            "/csi.v1.Controller/ControllerUnpublishVolume",
            request,
        )
        .await
    }
}

/// Node service over gRPC.
#[derive(Debug, Clone)]
pub struct GrpcNode {
    inner: Grpc<Channel>,
}

impl GrpcNode {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }
}

#[async_trait]
impl NodeService for GrpcNode {
    async fn node_get_info(
        &self,
        request: Request<NodeGetInfoRequest>,
    ) -> Result<Response<NodeGetInfoResponse>, Status> {
        unary(
            self.inner.clone(),
            NODE_SERVICE,
            "NodeGetInfo",
            "/csi.v1.Node/NodeGetInfo",
            request,
        )
        .await
    }
}
