//! Connection configuration.
//!
//! The orchestrator owns where these values come from (flags, files,
//! environment); this crate only defines their shape and defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default readiness wait while dialing the plugin.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound between two dial attempts during the readiness wait.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(1);

/// How to reach a CSI plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Plugin endpoint: `unix:///path`, `/path`, `http://host:port` or
    /// `host:port`.
    pub address: String,
    /// Bounded wait for the plugin to accept a connection, in seconds.
    #[serde(with = "secs")]
    pub readiness_timeout: Duration,
    /// Cap of the exponential dial backoff, in milliseconds.
    #[serde(with = "millis")]
    pub max_backoff: Duration,
    /// Optional per-call timeout in seconds, see
    /// [`CallContext::from_config`](crate::CallContext::from_config).
    #[serde(with = "opt_secs")]
    pub call_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Configuration for `address` with default timeouts.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            max_backoff: DEFAULT_MAX_BACKOFF,
            call_timeout: None,
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|secs| secs.map(Duration::from_secs))
    }
}
