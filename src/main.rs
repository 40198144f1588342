use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ipscope::api;
use ipscope::client_ip::ClientIpResolver;
use ipscope::config::Config;
use ipscope::geolocation::{GeolocationRelay, IpstackProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize the upstream provider
    let provider = IpstackProvider::from_config(&config.upstream)?;
    info!("🌍 Geolocation provider: {}", config.upstream.base_url);
    if config.upstream.access_key.is_none() {
        warn!("API_KEY is not set - the provider will reject every lookup");
    }
    let relay = GeolocationRelay::new(Arc::new(provider));

    let client_ip = ClientIpResolver::new(config.client_ip.trusted_proxies.clone());
    if config.client_ip.trusted_proxies.is_empty() {
        info!("🔓 X-Forwarded-For is trusted from any peer");
    } else {
        info!(
            "🔐 X-Forwarded-For is trusted only from: {:?}",
            config.client_ip.trusted_proxies
        );
    }

    // Log frontend configuration
    if let Some(ref static_dir) = config.frontend.static_dir {
        info!("🎨 Serving frontend from directory: {}", static_dir);
    } else {
        info!("🎨 Serving embedded frontend");
    }

    let router = api::create_router(relay, client_ip, config.frontend.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("🚀 Server running at http://{}", addr);
    info!("   - Lookups available at http://{}/api/geolocation/{{ip}}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
