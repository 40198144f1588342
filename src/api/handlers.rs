use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::client_ip::ClientIpResolver;
use crate::geolocation::{GeolocationRelay, RelayError};
use crate::models::{ClientIpResponse, HealthResponse};

pub struct AppState {
    pub relay: GeolocationRelay,
    pub client_ip: ClientIpResolver,
}

/// Relay a geolocation lookup for an IP literal or `myip`
pub async fn lookup_geolocation(
    State(state): State<Arc<AppState>>,
    Path(ip): Path<String>,
) -> Result<Response, RelayError> {
    let body = state.relay.lookup(&ip).await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Report the caller's address as seen by this server
pub async fn my_ip(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Json<ClientIpResponse> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    Json(ClientIpResponse {
        ip: state.client_ip.resolve(request.headers(), peer),
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
