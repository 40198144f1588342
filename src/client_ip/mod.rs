//! Best-effort client address resolution for the "my IP" endpoint.
//!
//! The result is advisory only (it pre-fills the search box) and must not
//! be used for access control.

pub mod extractor;

pub use extractor::ClientIpResolver;
