//! The CSI connection used by the orchestrator.
//!
//! [`CsiConnection`] composes the service clients, the capability sets and
//! the failure classifier into the small API the attach/detach reconciler
//! calls. It holds no attachment state; every call is one independent
//! request/response exchange.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tonic::Status;
use tracing::{debug, info, instrument, warn};

use crate::capability::{ControllerCapabilities, PluginCapabilities};
use crate::config::ConnectionConfig;
use crate::context::CallContext;
use crate::controller::ControllerService;
use crate::error::{CsiError, OperationError};
use crate::identity::IdentityService;
use crate::node::NodeService;
use crate::proto;
use crate::transport::{self, GrpcController, GrpcIdentity, GrpcNode};
use crate::types::{PublishContext, VolumeCapability};

/// The three service handles sharing one transport.
#[derive(Clone)]
struct Services {
    identity: Arc<dyn IdentityService>,
    controller: Arc<dyn ControllerService>,
    node: Arc<dyn NodeService>,
}

/// Client-side connection to one CSI plugin.
///
/// Safe to share between tasks behind an [`Arc`]. After [`close`] every call
/// fails with an `Unavailable` status, which classifies as transient.
///
/// [`close`]: CsiConnection::close
pub struct CsiConnection {
    services: RwLock<Option<Services>>,
}

impl std::fmt::Debug for CsiConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsiConnection")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl CsiConnection {
    /// Connect to the plugin at `address`, waiting at most
    /// `readiness_timeout` for it to accept the connection.
    pub async fn new(
        address: impl Into<String>,
        readiness_timeout: Duration,
    ) -> Result<Self, CsiError> {
        let config = ConnectionConfig {
            readiness_timeout,
            ..ConnectionConfig::new(address)
        };
        Self::connect(&config).await
    }

    /// Connect using a full [`ConnectionConfig`].
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, CsiError> {
        let channel = transport::dial(config).await?;
        Ok(Self::from_services(
            Arc::new(GrpcIdentity::new(channel.clone())),
            Arc::new(GrpcController::new(channel.clone())),
            Arc::new(GrpcNode::new(channel)),
        ))
    }

    /// Build a connection over caller-provided service implementations,
    /// e.g. an in-process fake plugin.
    pub fn from_services(
        identity: Arc<dyn IdentityService>,
        controller: Arc<dyn ControllerService>,
        node: Arc<dyn NodeService>,
    ) -> Self {
        Self {
            services: RwLock::new(Some(Services {
                identity,
                controller,
                node,
            })),
        }
    }

    /// Close the connection. Calls already in flight finish on their own
    /// handles; later calls fail as transient. Closing twice is an error.
    pub fn close(&self) -> Result<(), CsiError> {
        let mut services = self
            .services
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match services.take() {
            Some(_) => {
                info!("CSI connection closed");
                Ok(())
            }
            None => Err(CsiError::Closed),
        }
    }

    /// Whether [`close`](CsiConnection::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn services(&self) -> Result<Services, Status> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Status::unavailable("connection closed"))
    }

    // --- Identity -----------------------------------------------------------

    /// Name of the CSI driver. An empty name is an invalid plugin response.
    #[instrument(skip_all)]
    pub async fn get_driver_name(&self, ctx: &CallContext) -> Result<String, CsiError> {
        let identity = self.services()?.identity;
        let info = ctx
            .run(identity.get_plugin_info(ctx.request(proto::GetPluginInfoRequest {})))
            .await?
            .into_inner();
        if info.name.is_empty() {
            return Err(CsiError::EmptyResult {
                rpc: "GetPluginInfo",
                field: "name",
            });
        }
        Ok(info.name)
    }

    /// Plugin-wide capabilities, decoded fresh from the plugin.
    #[instrument(skip_all)]
    pub async fn plugin_capabilities(
        &self,
        ctx: &CallContext,
    ) -> Result<PluginCapabilities, CsiError> {
        let identity = self.services()?.identity;
        let resp = ctx
            .run(identity.get_plugin_capabilities(
                ctx.request(proto::GetPluginCapabilitiesRequest {}),
            ))
            .await?
            .into_inner();
        Ok(PluginCapabilities::from(&resp))
    }

    /// Whether the plugin provides the Controller service.
    pub async fn supports_plugin_controller_service(
        &self,
        ctx: &CallContext,
    ) -> Result<bool, CsiError> {
        Ok(self.plugin_capabilities(ctx).await?.has_controller_service())
    }

    /// Readiness probe. A plugin that omits `ready` is ready.
    #[instrument(skip_all)]
    pub async fn probe(&self, ctx: &CallContext) -> Result<bool, CsiError> {
        let identity = self.services()?.identity;
        let resp = ctx
            .run(identity.probe(ctx.request(proto::ProbeRequest {})))
            .await?
            .into_inner();
        Ok(resp.ready.unwrap_or(true))
    }

    // --- Node ---------------------------------------------------------------

    /// Identifier of the node the plugin runs on. An empty id is an invalid
    /// plugin response.
    #[instrument(skip_all)]
    pub async fn node_get_id(&self, ctx: &CallContext) -> Result<String, CsiError> {
        let node = self.services()?.node;
        let info = ctx
            .run(node.node_get_info(ctx.request(proto::NodeGetInfoRequest {})))
            .await?
            .into_inner();
        if info.node_id.is_empty() {
            return Err(CsiError::EmptyResult {
                rpc: "NodeGetInfo",
                field: "node_id",
            });
        }
        Ok(info.node_id)
    }

    // --- Controller ---------------------------------------------------------

    /// Controller capabilities, decoded fresh from the plugin.
    #[instrument(skip_all)]
    pub async fn controller_capabilities(
        &self,
        ctx: &CallContext,
    ) -> Result<ControllerCapabilities, CsiError> {
        let controller = self.services()?.controller;
        let resp = ctx
            .run(controller.controller_get_capabilities(
                ctx.request(proto::ControllerGetCapabilitiesRequest {}),
            ))
            .await?
            .into_inner();
        Ok(ControllerCapabilities::from(&resp))
    }

    /// `(supports publish/unpublish, supports read-only publish)`.
    pub async fn supports_controller_publish(
        &self,
        ctx: &CallContext,
    ) -> Result<(bool, bool), CsiError> {
        let caps = self.controller_capabilities(ctx).await?;
        Ok((
            caps.supports_publish_unpublish(),
            caps.supports_publish_readonly(),
        ))
    }

    /// Whether volumes of this plugin must be attached before use.
    pub async fn is_attach_required(&self, ctx: &CallContext) -> Result<bool, CsiError> {
        Ok(self.controller_capabilities(ctx).await?.requires_attach())
    }

    /// Attach `volume_id` to `node_id` via ControllerPublishVolume.
    ///
    /// On success returns the plugin's publish context (empty when the
    /// plugin sent none). On failure the error's `detached` flag says whether
    /// the caller may assume no attachment exists.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, ctx, capability, volume_context, secrets))]
    pub async fn attach(
        &self,
        ctx: &CallContext,
        volume_id: &str,
        readonly: bool,
        node_id: &str,
        capability: &VolumeCapability,
        volume_context: Option<&HashMap<String, String>>,
        secrets: Option<&HashMap<String, String>>,
    ) -> Result<PublishContext, OperationError> {
        validate_ids(volume_id, node_id).map_err(OperationError::classified)?;

        let request = proto::ControllerPublishVolumeRequest {
            volume_id: volume_id.to_owned(),
            node_id: node_id.to_owned(),
            volume_capability: Some(proto::VolumeCapability::from(capability)),
            readonly,
            secrets: secrets.cloned().unwrap_or_default(),
            volume_context: volume_context.cloned().unwrap_or_default(),
        };

        let result = match self.services() {
            Ok(services) => {
                ctx.run(services.controller.controller_publish_volume(ctx.request(request)))
                    .await
            }
            Err(status) => Err(status),
        };

        match result {
            Ok(resp) => {
                debug!("volume attached");
                Ok(resp.into_inner().publish_context)
            }
            Err(status) => {
                let err = OperationError::classified(status.into());
                warn!(detached = err.detached, error = %err, "attach failed");
                Err(err)
            }
        }
    }

    /// Detach `volume_id` from `node_id` via ControllerUnpublishVolume.
    ///
    /// `Ok(())` means the volume is detached. On failure the error's
    /// `detached` flag says whether the caller may stop retrying.
    #[instrument(skip(self, ctx, secrets))]
    pub async fn detach(
        &self,
        ctx: &CallContext,
        volume_id: &str,
        node_id: &str,
        secrets: Option<&HashMap<String, String>>,
    ) -> Result<(), OperationError> {
        validate_ids(volume_id, node_id).map_err(OperationError::classified)?;

        let request = proto::ControllerUnpublishVolumeRequest {
            volume_id: volume_id.to_owned(),
            node_id: node_id.to_owned(),
            secrets: secrets.cloned().unwrap_or_default(),
        };

        let result = match self.services() {
            Ok(services) => {
                ctx.run(services.controller.controller_unpublish_volume(ctx.request(request)))
                    .await
            }
            Err(status) => Err(status),
        };

        match result {
            Ok(_) => {
                debug!("volume detached");
                Ok(())
            }
            Err(status) => {
                let err = OperationError::classified(status.into());
                warn!(detached = err.detached, error = %err, "detach failed");
                Err(err)
            }
        }
    }
}

fn validate_ids(volume_id: &str, node_id: &str) -> Result<(), CsiError> {
    if volume_id.is_empty() {
        return Err(CsiError::invalid_argument("volume id must not be empty"));
    }
    if node_id.is_empty() {
        return Err(CsiError::invalid_argument("node id must not be empty"));
    }
    Ok(())
}
