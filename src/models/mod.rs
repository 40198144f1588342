pub mod lookup;

pub use lookup::{
    ClientIpResponse, ErrorResponse, HealthResponse, UpstreamEnvelope, UpstreamErrorInfo,
};
