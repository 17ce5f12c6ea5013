//! # libcsiconn — CSI plugin connection for the RK8s attacher
//!
//! `libcsiconn` is the client half of the [Container Storage Interface][csi]:
//! it talks gRPC to an out-of-process CSI plugin on behalf of the
//! orchestrator, discovers what the plugin supports, and issues
//! ControllerPublish / ControllerUnpublish (attach / detach). Its main job is
//! to classify every failed attach or detach so the reconciler can retry
//! without leaking or duplicating an attachment.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`connection`] | [`CsiConnection`], the public operations. |
//! | [`outcome`] | Failure classifier: [`Verdict`], [`Outcome`], [`classify`]. |
//! | [`capability`] | Controller / plugin capability sets. |
//! | [`error`] | [`CsiError`] and [`OperationError`]. |
//! | [`types`] | Caller-facing [`VolumeCapability`] and [`AccessMode`]. |
//! | [`identity`], [`controller`], [`node`] | Service client traits. |
//! | [`transport`] | gRPC dialing and trait implementations over `tonic`. |
//! | [`proto`] | `csi.v1` wire messages. |
//! | [`config`] | [`ConnectionConfig`]. |
//! | [`context`] | [`CallContext`]: per-call deadline and cancellation. |
//!
//! [csi]: https://github.com/container-storage-interface/spec

pub mod capability;
pub mod config;
pub mod connection;
pub mod context;
pub mod controller;
pub mod error;
pub mod identity;
pub mod node;
pub mod outcome;
pub mod proto;
mod sanitize;
pub mod transport;
pub mod types;

pub use capability::{
    ControllerCapabilities, ControllerCapability, PluginCapabilities, PluginCapability,
};
pub use config::ConnectionConfig;
pub use connection::CsiConnection;
pub use context::CallContext;
pub use controller::ControllerService;
pub use error::{CsiError, OperationError};
pub use identity::IdentityService;
pub use node::NodeService;
pub use outcome::{Outcome, Verdict, classify};
pub use types::*;
