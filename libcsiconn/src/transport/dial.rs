//! Plugin address parsing and channel establishment.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tokio::time::Instant;
use tonic::transport::{Channel, Endpoint, Uri};
use tracing::{debug, info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::error::CsiError;

/// First pause between two dial attempts.
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Placeholder authority for Unix domain socket endpoints; the connector
/// ignores it.
const UDS_AUTHORITY: &str = "http://[::]:50051";

/// Where a plugin listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Unix domain socket path, the usual CSI deployment.
    Unix(PathBuf),
    /// Plain-text HTTP/2 endpoint URI.
    Tcp(String),
}

impl Target {
    /// Parse a plugin address.
    ///
    /// Accepted forms: `unix:///abs/path`, `unix:path`, `/abs/path`,
    /// `http://host:port` and bare `host:port`.
    pub fn parse(address: &str) -> Result<Self, CsiError> {
        let invalid = |reason: &str| CsiError::InvalidAddress {
            address: address.to_owned(),
            reason: reason.to_owned(),
        };

        let address = address.trim();
        if address.is_empty() {
            return Err(invalid("address is empty"));
        }

        if let Some(rest) = address.strip_prefix("unix:") {
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path.is_empty() {
                return Err(invalid("socket path is empty"));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if address.starts_with('/') {
            return Ok(Self::Unix(PathBuf::from(address)));
        }
        if address.starts_with("http://") {
            return Ok(Self::Tcp(address.to_owned()));
        }
        if address.starts_with("https://") {
            return Err(invalid("TLS endpoints are not supported"));
        }
        if address.contains("://") {
            return Err(invalid("unsupported scheme"));
        }
        Ok(Self::Tcp(format!("http://{address}")))
    }

    fn endpoint(&self) -> Result<Endpoint, CsiError> {
        match self {
            Self::Unix(_) => Ok(Endpoint::from_static(UDS_AUTHORITY)),
            Self::Tcp(uri) => {
                Endpoint::from_shared(uri.clone()).map_err(|e| CsiError::InvalidAddress {
                    address: uri.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn connect(&self, endpoint: &Endpoint) -> Result<Channel, tonic::transport::Error> {
        match self {
            Self::Unix(path) => {
                endpoint
                    .connect_with_connector(UnixConnector::new(path))
                    .await
            }
            Self::Tcp(_) => endpoint.connect().await,
        }
    }

    fn connect_lazy(&self, endpoint: &Endpoint) -> Channel {
        match self {
            Self::Unix(path) => endpoint.connect_with_connector_lazy(UnixConnector::new(path)),
            Self::Tcp(_) => endpoint.connect_lazy(),
        }
    }
}

/// Dials a fixed Unix domain socket regardless of the request URI.
#[derive(Debug, Clone)]
struct UnixConnector {
    path: Arc<Path>,
}

impl UnixConnector {
    fn new(path: &Path) -> Self {
        Self {
            path: Arc::from(path),
        }
    }
}

impl tower::Service<Uri> for UnixConnector {
    type Response = TokioIo<UnixStream>;
    type Error = std::io::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _uri: Uri) -> Self::Future {
        let path = Arc::clone(&self.path);
        Box::pin(async move { UnixStream::connect(&*path).await.map(TokioIo::new) })
    }
}

/// Open a channel to the plugin at `config.address`.
///
/// Dial attempts are retried with exponential backoff capped at
/// `config.max_backoff` until `config.readiness_timeout` elapses. A plugin
/// that never becomes ready still yields a lazily-connecting channel: the
/// first call then reports the real transport error. Only an unusable
/// address fails here.
#[instrument(skip_all, fields(address = %config.address))]
pub async fn dial(config: &ConnectionConfig) -> Result<Channel, CsiError> {
    let target = Target::parse(&config.address)?;
    let endpoint = target.endpoint()?;

    let deadline = readiness_deadline(config.readiness_timeout);
    let mut backoff = INITIAL_BACKOFF.min(config.max_backoff);
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let connected = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, target.connect(&endpoint)).await,
            None => Ok(target.connect(&endpoint).await),
        };
        match connected {
            Ok(Ok(channel)) => {
                info!(attempt, "connected to CSI plugin");
                return Ok(channel);
            }
            Ok(Err(e)) => debug!(attempt, error = %e, "CSI plugin not reachable yet"),
            Err(_) => debug!(attempt, "dial attempt timed out"),
        }

        let out_of_time = deadline.is_some_and(|deadline| {
            Instant::now()
                .checked_add(backoff)
                .is_none_or(|next| next >= deadline)
        });
        if out_of_time {
            break;
        }
        tokio::time::sleep(backoff).await;
        backoff = next_backoff(backoff, config.max_backoff);
    }

    warn!(
        timeout = ?config.readiness_timeout,
        attempts = attempt,
        "CSI plugin not ready before timeout, continuing with a lazy connection"
    );
    Ok(target.connect_lazy(&endpoint))
}

/// End of the readiness wait, `None` when `timeout` runs past the clock.
fn readiness_deadline(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}
