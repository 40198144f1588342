//! Geolocation relay
//!
//! Forwards lookups to the upstream provider and normalizes its answer:
//! success documents pass through byte-for-byte, provider-reported
//! failures are flattened to `{ "error": ... }`.

pub mod error;
pub mod provider;
pub mod relay;

pub use error::{RelayError, GENERIC_FAILURE_MESSAGE};
pub use provider::{GeolocationProvider, IpstackProvider};
pub use relay::{normalize, GeolocationRelay, LookupTarget};
