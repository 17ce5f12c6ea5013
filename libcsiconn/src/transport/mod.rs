//! gRPC transport for the CSI services.
//!
//! [`dial`] turns a plugin address into a [`tonic::transport::Channel`]
//! with a bounded readiness wait, and [`client`] binds the Identity,
//! Controller and Node service traits to that channel.

pub mod client;
pub mod dial;

pub use client::{GrpcController, GrpcIdentity, GrpcNode};
pub use dial::{Target, dial};
