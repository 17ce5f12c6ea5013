//! CSI client error types.
//!
//! Every failure surfaced by this crate is a [`CsiError`]. Failures of the
//! mutating calls (attach / detach) are additionally wrapped in
//! [`OperationError`], which carries the "is the volume detached" verdict the
//! caller's retry loop needs.

use thiserror::Error;
use tonic::Code;

use crate::outcome::{Outcome, Verdict, classify};

/// Unified error type for CSI client operations.
#[derive(Debug, Error)]
pub enum CsiError {
    /// The caller supplied an invalid argument. No RPC was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The plugin answered successfully but left a mandatory field empty.
    #[error("invalid plugin response: {rpc} returned an empty {field}")]
    EmptyResult {
        /// RPC that produced the response, e.g. `GetPluginInfo`.
        rpc: &'static str,
        /// The mandatory field that was empty.
        field: &'static str,
    },

    /// The RPC failed; the status is exactly what the transport or plugin
    /// reported.
    #[error("rpc error: {}: {}", .0.code(), .0.message())]
    Rpc(#[from] tonic::Status),

    /// The plugin address could not be turned into a transport endpoint.
    #[error("invalid plugin address {address:?}: {reason}")]
    InvalidAddress {
        /// Address as supplied by the caller.
        address: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The connection has already been closed.
    #[error("connection closed")]
    Closed,
}

impl CsiError {
    /// Create a [`CsiError::InvalidArgument`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn invalid_argument<E: std::fmt::Display>(e: E) -> Self {
        Self::InvalidArgument(e.to_string())
    }

    /// gRPC status code of the failure, if it came from an RPC.
    pub fn code(&self) -> Option<Code> {
        match self {
            Self::Rpc(status) => Some(status.code()),
            _ => None,
        }
    }

    /// Classify this failure for a mutating call.
    ///
    /// Only an RPC status can prove the target state; everything else leaves
    /// the remote state unknown.
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Rpc(status) => classify(status.code()),
            Self::InvalidArgument(_)
            | Self::EmptyResult { .. }
            | Self::InvalidAddress { .. }
            | Self::Closed => Verdict::Transient,
        }
    }
}

/// Failure of an attach or detach call.
///
/// `detached` tells the caller whether the volume is known (or safely
/// assumed) to be unpublished from the node after this call. When it is
/// `false` the caller must retry.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct OperationError {
    /// Whether the volume may be treated as detached.
    pub detached: bool,
    /// The underlying failure, never swallowed even when `detached` is set.
    #[source]
    pub source: CsiError,
}

impl OperationError {
    /// Wrap `source` with the verdict derived from it.
    pub fn classified(source: CsiError) -> Self {
        let detached = source.verdict() == Verdict::Final;
        Self { detached, source }
    }

    /// Tri-state outcome of the failed call.
    pub fn outcome(&self) -> Outcome {
        Outcome::from(self.source.verdict())
    }

    /// gRPC status code of the failure, if it came from an RPC.
    pub fn code(&self) -> Option<Code> {
        self.source.code()
    }
}
