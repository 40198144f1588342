use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{Client, Url};
use tracing::debug;

use super::error::RelayError;
use crate::config::UpstreamConfig;

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Fetch the raw lookup document for an already-resolved upstream target.
    async fn fetch(&self, target: &str) -> Result<Bytes, RelayError>;
}

/// ipstack client. Lookups are `GET {base}/{target}?access_key={key}`.
///
/// No request timeout is configured: a provider that never answers keeps
/// the inbound request waiting.
#[derive(Clone)]
pub struct IpstackProvider {
    client: Client,
    base_url: Url,
    access_key: Option<String>,
}

impl IpstackProvider {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid upstream base URL '{}'", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("upstream base URL '{}' cannot carry a path", config.base_url);
        }

        let client = Client::builder()
            .user_agent(concat!("ipscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client for the geolocation provider")?;

        Ok(Self {
            client,
            base_url,
            access_key: config.access_key.clone(),
        })
    }

    /// Build the lookup URL. The target becomes a single percent-encoded
    /// path segment; it is never validated here.
    pub fn lookup_url(&self, target: &str) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in from_config
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(target);
        }
        if let Some(key) = self.access_key.as_deref() {
            url.query_pairs_mut().append_pair("access_key", key);
        }
        url
    }
}

#[async_trait]
impl GeolocationProvider for IpstackProvider {
    async fn fetch(&self, target: &str) -> Result<Bytes, RelayError> {
        debug!(lookup = %target, "querying geolocation provider");

        let response = self.client.get(self.lookup_url(target)).send().await?;
        let body = response.bytes().await?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str, access_key: Option<&str>) -> IpstackProvider {
        IpstackProvider::from_config(&UpstreamConfig {
            base_url: base_url.to_string(),
            access_key: access_key.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn test_lookup_url_with_key() {
        let p = provider("https://api.ipstack.com", Some("abc123"));
        assert_eq!(
            p.lookup_url("8.8.8.8").as_str(),
            "https://api.ipstack.com/8.8.8.8?access_key=abc123"
        );
    }

    #[test]
    fn test_lookup_url_without_key_omits_parameter() {
        let p = provider("https://api.ipstack.com", None);
        let url = p.lookup_url("check");
        assert_eq!(url.path(), "/check");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_lookup_url_keeps_base_path() {
        let p = provider("http://127.0.0.1:8081/v1/", Some("k"));
        assert_eq!(
            p.lookup_url("1.1.1.1").as_str(),
            "http://127.0.0.1:8081/v1/1.1.1.1?access_key=k"
        );
    }

    #[test]
    fn test_lookup_url_ipv6_target() {
        let p = provider("https://api.ipstack.com", None);
        assert_eq!(p.lookup_url("2001:db8::1").path(), "/2001:db8::1");
    }

    #[test]
    fn test_lookup_url_encodes_slashes() {
        let p = provider("https://api.ipstack.com", None);
        assert_eq!(p.lookup_url("a/b").path(), "/a%2Fb");
    }

    #[test]
    fn test_access_key_is_query_encoded() {
        let p = provider("https://api.ipstack.com", Some("a&b=c"));
        let url = p.lookup_url("check");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("access_key".to_string(), "a&b=c".to_string())]);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = IpstackProvider::from_config(&UpstreamConfig {
            base_url: "not a url".to_string(),
            access_key: None,
        });
        assert!(err.is_err());

        let err = IpstackProvider::from_config(&UpstreamConfig {
            base_url: "mailto:geo@example.com".to_string(),
            access_key: None,
        });
        assert!(err.is_err());
    }
}
