//! Secret stripping for request logging.

use std::collections::HashMap;
use std::fmt;

use crate::proto::{ControllerPublishVolumeRequest, ControllerUnpublishVolumeRequest};

/// Placeholder logged instead of a secret value.
pub const STRIPPED: &str = "***stripped***";

/// A request type that may be logged once its secrets are removed.
pub(crate) trait Sanitize: Clone + fmt::Debug {
    fn strip_secrets(&mut self) {}

    /// Copy of the request safe for logs.
    fn sanitized(&self) -> Self {
        let mut copy = self.clone();
        copy.strip_secrets();
        copy
    }
}

fn strip(secrets: &mut HashMap<String, String>) {
    for value in secrets.values_mut() {
        STRIPPED.clone_into(value);
    }
}

impl Sanitize for ControllerPublishVolumeRequest {
    fn strip_secrets(&mut self) {
        strip(&mut self.secrets);
    }
}

impl Sanitize for ControllerUnpublishVolumeRequest {
    fn strip_secrets(&mut self) {
        strip(&mut self.secrets);
    }
}

impl Sanitize for crate::proto::GetPluginInfoRequest {}
impl Sanitize for crate::proto::GetPluginCapabilitiesRequest {}
impl Sanitize for crate::proto::ProbeRequest {}
impl Sanitize for crate::proto::ControllerGetCapabilitiesRequest {}
impl Sanitize for crate::proto::NodeGetInfoRequest {}
