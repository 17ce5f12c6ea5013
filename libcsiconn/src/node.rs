//! CSI Node service client.

use async_trait::async_trait;
use tonic::{Request, Response, Status};

use crate::proto::{NodeGetInfoRequest, NodeGetInfoResponse};

/// Node service as seen from the client.
///
/// Only node discovery is needed here; staging and mounting belong to the
/// node-side agent.
#[async_trait]
pub trait NodeService: Send + Sync {
    /// Identity and limits of the node the plugin runs on.
    async fn node_get_info(
        &self,
        request: Request<NodeGetInfoRequest>,
    ) -> Result<Response<NodeGetInfoResponse>, Status>;
}
