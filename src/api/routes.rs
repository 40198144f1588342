use axum::{http::Uri, routing::get, Router};
use std::sync::Arc;

use crate::client_ip::ClientIpResolver;
use crate::config::FrontendConfig;
use crate::geolocation::GeolocationRelay;

use super::handlers::{health_check, lookup_geolocation, my_ip, AppState};
use super::static_files::serve_static;

pub fn create_router(
    relay: GeolocationRelay,
    client_ip: ClientIpResolver,
    frontend: FrontendConfig,
) -> Router {
    let state = Arc::new(AppState { relay, client_ip });

    let api_routes = Router::new()
        .route("/geolocation/{ip}", get(lookup_geolocation))
        .route("/myip", get(my_ip));

    let static_dir = frontend.static_dir;

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .fallback(move |uri: Uri| serve_static(uri, static_dir.clone()))
        .with_state(state)
}
