//! Failure classification for mutating calls.
//!
//! The CSI protocol has no "operation in progress" status, so after a failed
//! ControllerPublish / ControllerUnpublish the client cannot know whether the
//! plugin changed anything. [`classify`] turns the status code into a
//! [`Verdict`]: `NotFound` is the only code proving that the volume cannot be
//! attached to the node, and every other code leaves the state unknown.
//!
//! A code only belongs in the final set if it proves the volume is not
//! attached. A transient failure reported as final loses a real attachment.

use std::fmt;

use tonic::Code;

use crate::error::OperationError;

/// How a failed mutating call must be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Retrying cannot change the outcome; the volume is not attached.
    Final,
    /// The remote state is unknown; the caller must retry.
    Transient,
}

/// Tri-state result of a mutating call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The call succeeded.
    Succeeded,
    /// The call failed but the target state may be assumed.
    Final,
    /// The call failed and the state is unknown.
    Transient,
}

impl Outcome {
    /// Outcome of a finished attach or detach call.
    pub fn of<T>(result: &Result<T, OperationError>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(err) => err.outcome(),
        }
    }
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Final => Outcome::Final,
            Verdict::Transient => Outcome::Transient,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final => f.write_str("final"),
            Self::Transient => f.write_str("transient"),
        }
    }
}

/// Classify a gRPC status code returned by a mutating call.
///
/// `Code::Ok` is not a failure and is never treated as proof of anything.
#[must_use]
pub const fn classify(code: Code) -> Verdict {
    match code {
        Code::NotFound => Verdict::Final,
        _ => Verdict::Transient,
    }
}
