//! The full client path over a real gRPC plugin socket.

use std::collections::HashMap;
use std::time::Duration;

use libcsiconn::proto::controller_service_capability::rpc::Type as Rpc;
use libcsiconn::proto::plugin_capability::service::Type as ServiceType;
use libcsiconn::proto::volume_capability::AccessType;
use libcsiconn::proto::volume_capability::access_mode::Mode;
use libcsiconn::proto::*;
use libcsiconn::{AccessMode, CallContext, CsiConnection, Outcome, VolumeCapability};
use tonic::{Code, Status};

use crate::common::fake_plugin::{rpc_capability, service_capability};
use crate::common::grpc_plugin::GrpcPlugin;

const VOLUME_ID: &str = "myname";
const NODE_ID: &str = "MyNodeID";

async fn connect(plugin: &GrpcPlugin) -> CsiConnection {
    CsiConnection::new(plugin.address(), Duration::from_secs(5))
        .await
        .expect("connect to plugin socket")
}

#[tokio::test]
async fn driver_name() {
    let server = GrpcPlugin::start();
    server.plugin.plugin_info.reply(GetPluginInfoResponse {
        name: "csi.example.com".into(),
        vendor_version: "0.3.0".into(),
        ..Default::default()
    });
    let conn = connect(&server).await;

    let name = conn.get_driver_name(&CallContext::background()).await.unwrap();
    assert_eq!(name, "csi.example.com");
    assert_eq!(server.plugin.plugin_info.requests().len(), 1);
}

#[tokio::test]
async fn plugin_controller_service() {
    let server = GrpcPlugin::start();
    server
        .plugin
        .plugin_capabilities
        .reply(GetPluginCapabilitiesResponse {
            capabilities: vec![service_capability(ServiceType::ControllerService)],
        });
    let conn = connect(&server).await;

    assert!(
        conn.supports_plugin_controller_service(&CallContext::background())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn controller_capabilities() {
    let server = GrpcPlugin::start();
    let reply = ControllerGetCapabilitiesResponse {
        capabilities: vec![
            rpc_capability(Rpc::CreateDeleteVolume),
            rpc_capability(Rpc::PublishUnpublishVolume),
            rpc_capability(Rpc::PublishReadonly),
        ],
    };
    server.plugin.controller_capabilities.reply(reply.clone());
    server.plugin.controller_capabilities.reply(reply);
    let conn = connect(&server).await;
    let ctx = CallContext::background();

    assert_eq!(
        conn.supports_controller_publish(&ctx).await.unwrap(),
        (true, true)
    );
    assert!(conn.is_attach_required(&ctx).await.unwrap());
}

#[tokio::test]
async fn node_id() {
    let server = GrpcPlugin::start();
    server.plugin.node_info.reply(NodeGetInfoResponse {
        node_id: NODE_ID.into(),
        max_volumes_per_node: 16,
        ..Default::default()
    });
    let conn = connect(&server).await;

    assert_eq!(
        conn.node_get_id(&CallContext::background()).await.unwrap(),
        NODE_ID
    );
}

#[tokio::test]
async fn attach_forwards_secrets_verbatim() {
    let server = GrpcPlugin::start();
    server.plugin.publish.reply(ControllerPublishVolumeResponse {
        publish_context: HashMap::from([("first".into(), "foo".into())]),
    });
    let conn = connect(&server).await;

    let secrets = HashMap::from([("foo".into(), "bar".into())]);
    let ctx = CallContext::with_timeout(Duration::from_secs(30));
    let result = conn
        .attach(
            &ctx,
            VOLUME_ID,
            false,
            NODE_ID,
            &VolumeCapability::mount(AccessMode::MultiNodeMultiWriter),
            None,
            Some(&secrets),
        )
        .await;
    assert_eq!(Outcome::of(&result), Outcome::Succeeded);
    assert_eq!(
        result.unwrap(),
        HashMap::from([("first".into(), "foo".into())])
    );

    let requests = server.plugin.publish.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.volume_id, VOLUME_ID);
    assert_eq!(request.node_id, NODE_ID);
    assert!(!request.readonly);
    assert_eq!(request.secrets, secrets);
    assert!(request.volume_context.is_empty());
    let capability = request.volume_capability.as_ref().unwrap();
    assert!(matches!(capability.access_type, Some(AccessType::Mount(_))));
    assert_eq!(
        capability.access_mode.as_ref().unwrap().mode,
        Mode::MultiNodeMultiWriter as i32
    );

    let metadata = server.plugin.publish.metadata();
    assert!(metadata[0].get("grpc-timeout").is_some());
}

#[tokio::test]
async fn attach_not_found_is_detached() {
    let server = GrpcPlugin::start();
    server
        .plugin
        .publish
        .fail(Status::not_found("no such volume"));
    let conn = connect(&server).await;

    let err = conn
        .attach(
            &CallContext::background(),
            VOLUME_ID,
            false,
            NODE_ID,
            &VolumeCapability::mount(AccessMode::SingleNodeWriter),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(err.detached);
    assert_eq!(err.code(), Some(Code::NotFound));
}

#[tokio::test]
async fn detach_transient_and_success() {
    let server = GrpcPlugin::start();
    server
        .plugin
        .unpublish
        .fail(Status::unavailable("plugin restarting"));
    server
        .plugin
        .unpublish
        .reply(ControllerUnpublishVolumeResponse {});
    let conn = connect(&server).await;
    let ctx = CallContext::background();

    let err = conn
        .detach(&ctx, VOLUME_ID, NODE_ID, None)
        .await
        .unwrap_err();
    assert!(!err.detached);
    assert_eq!(err.code(), Some(Code::Unavailable));

    conn.detach(&ctx, VOLUME_ID, NODE_ID, None).await.unwrap();
    assert_eq!(server.plugin.unpublish.requests().len(), 2);
}

#[tokio::test]
async fn unbounded_readiness_timeout_connects() {
    let server = GrpcPlugin::start();
    server.plugin.node_info.reply(NodeGetInfoResponse {
        node_id: NODE_ID.into(),
        ..Default::default()
    });

    let conn = CsiConnection::new(server.address(), Duration::MAX)
        .await
        .unwrap();
    let ctx = CallContext::with_timeout(Duration::MAX);
    assert_eq!(conn.node_get_id(&ctx).await.unwrap(), NODE_ID);
}
