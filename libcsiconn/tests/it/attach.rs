//! Attach / detach outcome classification against the fake plugin.

use std::collections::HashMap;

use libcsiconn::proto::volume_capability::access_mode::Mode;
use libcsiconn::proto::volume_capability::{AccessMode as WireAccessMode, AccessType, MountVolume};
use libcsiconn::proto::*;
use libcsiconn::{AccessMode, CallContext, CsiError, Outcome, VolumeCapability};
use tonic::{Code, Status};

use crate::common::fake_plugin::FakePlugin;

const VOLUME_ID: &str = "myname";
const NODE_ID: &str = "MyNodeID";

fn default_caps() -> VolumeCapability {
    VolumeCapability::mount(AccessMode::MultiNodeMultiWriter)
}

fn publish_info() -> HashMap<String, String> {
    HashMap::from([
        ("first".into(), "foo".into()),
        ("second".into(), "bar".into()),
        ("third".into(), "baz".into()),
    ])
}

fn expected_publish_request() -> ControllerPublishVolumeRequest {
    ControllerPublishVolumeRequest {
        volume_id: VOLUME_ID.into(),
        node_id: NODE_ID.into(),
        volume_capability: Some(libcsiconn::proto::VolumeCapability {
            access_mode: Some(WireAccessMode {
                mode: Mode::MultiNodeMultiWriter as i32,
            }),
            access_type: Some(AccessType::Mount(MountVolume::default())),
        }),
        readonly: false,
        secrets: HashMap::new(),
        volume_context: HashMap::new(),
    }
}

#[tokio::test]
async fn attach_success() {
    let (plugin, conn) = FakePlugin::connect();
    plugin.publish.reply(ControllerPublishVolumeResponse {
        publish_context: publish_info(),
    });

    let ctx = CallContext::background();
    let result = conn
        .attach(&ctx, VOLUME_ID, false, NODE_ID, &default_caps(), None, None)
        .await;
    assert_eq!(Outcome::of(&result), Outcome::Succeeded);
    assert_eq!(result.unwrap(), publish_info());
    assert_eq!(plugin.publish.requests(), vec![expected_publish_request()]);
}

#[tokio::test]
async fn attach_success_without_publish_context() {
    let (plugin, conn) = FakePlugin::connect();
    plugin
        .publish
        .reply(ControllerPublishVolumeResponse::default());

    let info = conn
        .attach(
            &CallContext::background(),
            VOLUME_ID,
            false,
            NODE_ID,
            &default_caps(),
            None,
            None,
        )
        .await
        .unwrap();
    assert!(info.is_empty());
}

#[tokio::test]
async fn attach_forwards_readonly_context_and_secrets() {
    let (plugin, conn) = FakePlugin::connect();
    plugin.publish.reply(ControllerPublishVolumeResponse {
        publish_context: HashMap::from([("first".into(), "foo".into())]),
    });

    let context = HashMap::from([("foo".into(), "bar".into())]);
    let secrets = HashMap::from([("foo".into(), "bar".into())]);
    let info = conn
        .attach(
            &CallContext::background(),
            VOLUME_ID,
            true,
            NODE_ID,
            &default_caps(),
            Some(&context),
            Some(&secrets),
        )
        .await
        .unwrap();
    assert_eq!(info, HashMap::from([("first".into(), "foo".into())]));

    let expected = ControllerPublishVolumeRequest {
        readonly: true,
        volume_context: context,
        secrets,
        ..expected_publish_request()
    };
    assert_eq!(plugin.publish.requests(), vec![expected]);
}

#[tokio::test]
async fn attach_writable_with_secrets() {
    let (plugin, conn) = FakePlugin::connect();
    plugin.publish.reply(ControllerPublishVolumeResponse {
        publish_context: HashMap::from([("first".into(), "foo".into())]),
    });

    let secrets = HashMap::from([("foo".into(), "bar".into())]);
    let info = conn
        .attach(
            &CallContext::background(),
            VOLUME_ID,
            false,
            NODE_ID,
            &default_caps(),
            None,
            Some(&secrets),
        )
        .await
        .unwrap();
    assert_eq!(info, HashMap::from([("first".into(), "foo".into())]));

    let expected = ControllerPublishVolumeRequest {
        secrets,
        ..expected_publish_request()
    };
    assert_eq!(plugin.publish.requests(), vec![expected]);
}

#[tokio::test]
async fn attach_final_error_is_detached() {
    let (plugin, conn) = FakePlugin::connect();
    plugin
        .publish
        .fail(Status::not_found("Injecting error 5"));

    let err = conn
        .attach(
            &CallContext::background(),
            VOLUME_ID,
            false,
            NODE_ID,
            &default_caps(),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(err.detached);
    assert_eq!(err.code(), Some(Code::NotFound));
    assert_eq!(err.outcome(), Outcome::Final);
}

#[tokio::test]
async fn attach_transient_error_is_not_detached() {
    let (plugin, conn) = FakePlugin::connect();
    plugin
        .publish
        .fail(Status::deadline_exceeded("Injecting error 4"));

    let err = conn
        .attach(
            &CallContext::background(),
            VOLUME_ID,
            false,
            NODE_ID,
            &default_caps(),
            None,
            None,
        )
        .await
        .unwrap_err();
    assert!(!err.detached);
    assert_eq!(err.code(), Some(Code::DeadlineExceeded));
    assert_eq!(err.outcome(), Outcome::Transient);
}

#[tokio::test]
async fn attach_with_empty_ids_sends_nothing() {
    let (plugin, conn) = FakePlugin::connect();
    let ctx = CallContext::background();

    let err = conn
        .attach(&ctx, "", false, NODE_ID, &default_caps(), None, None)
        .await
        .unwrap_err();
    assert!(!err.detached);
    assert!(matches!(err.source, CsiError::InvalidArgument(_)));

    let err = conn
        .attach(&ctx, VOLUME_ID, false, "", &default_caps(), None, None)
        .await
        .unwrap_err();
    assert!(!err.detached);
    assert!(plugin.publish.requests().is_empty());
}

#[tokio::test]
async fn detach_success() {
    let (plugin, conn) = FakePlugin::connect();
    plugin.unpublish.reply(ControllerUnpublishVolumeResponse {});

    conn.detach(&CallContext::background(), VOLUME_ID, NODE_ID, None)
        .await
        .unwrap();
    assert_eq!(
        plugin.unpublish.requests(),
        vec![ControllerUnpublishVolumeRequest {
            volume_id: VOLUME_ID.into(),
            node_id: NODE_ID.into(),
            secrets: HashMap::new(),
        }]
    );
}

#[tokio::test]
async fn detach_forwards_secrets() {
    let (plugin, conn) = FakePlugin::connect();
    plugin.unpublish.reply(ControllerUnpublishVolumeResponse {});

    let secrets = HashMap::from([("foo".into(), "bar".into())]);
    conn.detach(
        &CallContext::background(),
        VOLUME_ID,
        NODE_ID,
        Some(&secrets),
    )
    .await
    .unwrap();
    assert_eq!(plugin.unpublish.requests()[0].secrets, secrets);
}

#[tokio::test]
async fn detach_final_error_is_detached() {
    let (plugin, conn) = FakePlugin::connect();
    plugin
        .unpublish
        .fail(Status::not_found("Injecting error 5"));

    let err = conn
        .detach(&CallContext::background(), VOLUME_ID, NODE_ID, None)
        .await
        .unwrap_err();
    assert!(err.detached);
    assert_eq!(err.code(), Some(Code::NotFound));
}

#[tokio::test]
async fn detach_transient_error_is_not_detached() {
    let (plugin, conn) = FakePlugin::connect();
    plugin
        .unpublish
        .fail(Status::deadline_exceeded("Injecting error 4"));

    let err = conn
        .detach(&CallContext::background(), VOLUME_ID, NODE_ID, None)
        .await
        .unwrap_err();
    assert!(!err.detached);
    assert_eq!(err.code(), Some(Code::DeadlineExceeded));
}

#[tokio::test]
async fn detach_other_codes_are_transient() {
    let (plugin, conn) = FakePlugin::connect();
    let ctx = CallContext::background();

    for status in [
        Status::unavailable("down"),
        Status::resource_exhausted("busy"),
        Status::internal("boom"),
        Status::permission_denied("nope"),
        Status::already_exists("dup"),
    ] {
        let code = status.code();
        plugin.unpublish.fail(status);
        let err = conn
            .detach(&ctx, VOLUME_ID, NODE_ID, None)
            .await
            .unwrap_err();
        assert!(!err.detached, "code {code:?}");
    }
}
