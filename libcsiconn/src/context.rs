//! Per-call deadline and cancellation.

use std::future::{Future, pending};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tonic::Status;

use crate::config::ConnectionConfig;

/// Deadline and cancellation scope for one client call.
///
/// A call bound to a context never outlives its deadline. Expiry and
/// cancellation are reported as `DeadlineExceeded` and `Cancelled` statuses,
/// which the classifier treats as transient: the client cannot tell whether
/// the plugin acted on the request.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl CallContext {
    /// No deadline, no cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context expiring `timeout` from now. A timeout past the end of the
    /// clock's range means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancel: None,
        }
    }

    /// Context using the configured per-call timeout, if any.
    pub fn from_config(config: &ConnectionConfig) -> Self {
        config
            .call_timeout
            .map_or_else(Self::background, Self::with_timeout)
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Build a request carrying the remaining time as its `grpc-timeout`.
    pub(crate) fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        if let Some(remaining) = self.remaining() {
            request.set_timeout(remaining);
        }
        request
    }

    /// Drive `fut` until it completes, the deadline passes, or the context is
    /// cancelled.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, Status>
    where
        F: Future<Output = Result<T, Status>>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(Status::cancelled("call cancelled by caller")),
            _ = deadline => Err(Status::deadline_exceeded("call deadline exceeded")),
            res = fut => res,
        }
    }
}
