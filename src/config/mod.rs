use anyhow::Context;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub client_ip: ClientIpConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the geolocation provider, e.g. `https://api.ipstack.com`
    pub base_url: String,
    /// Provider access key, sent as the `access_key` query parameter
    #[serde(default, skip_serializing)]
    pub access_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientIpConfig {
    /// Peers allowed to set `X-Forwarded-For`.
    /// Empty means the header is honored from any peer.
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing static frontend files
    /// If None, uses the embedded frontend
    pub static_dir: Option<String>,
}

impl UpstreamConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.ipstack.com";
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let base_url = lookup("UPSTREAM_BASE_URL")
            .unwrap_or_else(|| UpstreamConfig::DEFAULT_BASE_URL.to_string());
        let access_key = lookup("API_KEY").filter(|key| !key.trim().is_empty());

        let trusted_proxies = match lookup("TRUSTED_PROXIES") {
            Some(raw) => parse_trusted_proxies(&raw)?,
            None => Vec::new(),
        };

        let frontend_static_dir = lookup("FRONTEND_STATIC_DIR").filter(|dir| !dir.is_empty());

        Ok(Config {
            server: ServerConfig { host, port },
            upstream: UpstreamConfig {
                base_url,
                access_key,
            },
            client_ip: ClientIpConfig { trusted_proxies },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
        })
    }
}

/// Parse a comma-separated list of CIDR ranges. Bare addresses are
/// accepted as single-host ranges.
pub fn parse_trusted_proxies(raw: &str) -> anyhow::Result<Vec<IpNet>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<IpNet>()
                .or_else(|_| entry.parse::<IpAddr>().map(IpNet::from))
                .with_context(|| format!("invalid TRUSTED_PROXIES entry '{entry}'"))
        })
        .collect()
}
