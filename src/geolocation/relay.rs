use axum::body::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::error::RelayError;
use super::provider::GeolocationProvider;
use crate::models::UpstreamEnvelope;

/// What a caller asked to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    /// The caller's own address, as seen by the provider.
    Caller,
    /// Any other specifier, forwarded as-is.
    Address(String),
}

impl LookupTarget {
    pub const SENTINEL: &'static str = "myip";
    /// ipstack's keyword for "the address this request came from".
    pub const PROVIDER_SELF_KEYWORD: &'static str = "check";

    pub fn parse(specifier: &str) -> Self {
        if specifier == Self::SENTINEL {
            LookupTarget::Caller
        } else {
            LookupTarget::Address(specifier.to_string())
        }
    }

    pub fn upstream_target(&self) -> &str {
        match self {
            LookupTarget::Caller => Self::PROVIDER_SELF_KEYWORD,
            LookupTarget::Address(address) => address,
        }
    }
}

pub struct GeolocationRelay {
    provider: Arc<dyn GeolocationProvider>,
}

impl GeolocationRelay {
    pub fn new(provider: Arc<dyn GeolocationProvider>) -> Self {
        Self { provider }
    }

    /// Look up `specifier` and return the provider's success document.
    pub async fn lookup(&self, specifier: &str) -> Result<Bytes, RelayError> {
        let target = LookupTarget::parse(specifier);
        let body = self.provider.fetch(target.upstream_target()).await?;
        normalize(body)
    }
}

/// Split a provider response into success or failure.
///
/// `success: false` is the only failure marker; the HTTP status of the
/// upstream response is not consulted. Any well-formed JSON document
/// without that marker, objects or not, is passed through.
pub fn normalize(body: Bytes) -> Result<Bytes, RelayError> {
    let document: Value = serde_json::from_slice(&body)?;
    if !document.is_object() {
        return Ok(body);
    }

    let envelope = UpstreamEnvelope::deserialize(&document)?;

    if envelope.success == Some(false) {
        let error = envelope.error.ok_or(RelayError::MissingErrorInfo)?;
        debug!(code = ?error.code, kind = ?error.kind, "provider reported failure");
        let info = error.info.ok_or(RelayError::MissingErrorInfo)?;
        return Err(RelayError::Upstream(info));
    }

    Ok(body)
}
