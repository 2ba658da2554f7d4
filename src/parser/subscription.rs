//! Subscription orchestration: cache-aware fetch and format dispatch.

use log::{debug, info};
use serde::Deserialize;

use crate::cache::ConfigCache;
use crate::error::{Error, Result};
use crate::models::NodeConfig;
use crate::parser::{provider, ss, ssr, vmess};
use crate::utils::http::Fetch;
use crate::utils::query::build_query;
use crate::utils::url::url_encode;

/// Wire format of a subscription source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionKind {
    Shadowsocks,
    Shadowsocksr,
    V2rayn,
    SsJson,
    NodeApi,
}

/// One subscription entry of a generation run.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub url: String,
    pub kind: SubscriptionKind,
    #[serde(default)]
    pub udp_relay: Option<bool>,
    /// Credentials, required by the `node-api` kind.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Fetch a body through the cache. A hit short-circuits the network call; a
/// successful fetch always populates the cache.
pub fn load_cached(
    fetcher: &dyn Fetch,
    cache: &ConfigCache,
    key: &str,
    url: &str,
) -> Result<String> {
    if let Some(body) = cache.get(key) {
        debug!("cache hit for '{}'", key);
        return Ok(body);
    }
    let body = fetcher.fetch(url)?;
    cache.set(key, &body);
    Ok(body)
}

/// Fetch and decode one subscription into canonical nodes.
pub fn fetch_nodes(
    fetcher: &dyn Fetch,
    cache: &ConfigCache,
    sub: &Subscription,
) -> Result<Vec<NodeConfig>> {
    let body = match sub.kind {
        SubscriptionKind::NodeApi => {
            let (username, password) = match (&sub.username, &sub.password) {
                (Some(u), Some(p)) if !u.is_empty() => (u, p),
                _ => {
                    return Err(Error::Configuration(format!(
                        "subscription '{}' requires username/password credentials",
                        sub.name
                    )))
                }
            };
            let query = build_query(&[
                ("username".to_string(), url_encode(username)),
                ("password".to_string(), url_encode(password)),
            ]);
            let sep = if sub.url.contains('?') { '&' } else { '?' };
            let url = format!("{}{}{}", sub.url, sep, query);
            load_cached(
                fetcher,
                cache,
                &provider::api_cache_key(&sub.url, username),
                &url,
            )?
        }
        _ => load_cached(fetcher, cache, &sub.url, &sub.url)?,
    };

    let nodes = match sub.kind {
        SubscriptionKind::Shadowsocks => ss::parse_ss_subscription(&body, sub.udp_relay)?,
        SubscriptionKind::Shadowsocksr => ssr::parse_ssr_subscription(&body, sub.udp_relay)?,
        SubscriptionKind::V2rayn => vmess::parse_v2rayn_subscription(&body, &sub.name)?,
        SubscriptionKind::SsJson => provider::parse_ss_conf(&body, &sub.name)?,
        SubscriptionKind::NodeApi => provider::parse_node_api(&body, &sub.name)?,
    };
    info!("subscription '{}' yielded {} node(s)", sub.name, nodes.len());
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::{base64_encode, url_safe_base64_encode};
    use std::cell::RefCell;
    use std::time::Duration;

    struct CountingFetcher {
        body: String,
        calls: RefCell<u32>,
    }

    impl Fetch for CountingFetcher {
        fn fetch(&self, _url: &str) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            Ok(self.body.clone())
        }
    }

    fn ss_payload() -> String {
        base64_encode(&format!(
            "ss://{}@a.example:8388#One\n",
            url_safe_base64_encode("aes-256-gcm:pw")
        ))
    }

    #[test]
    fn test_cache_short_circuits_second_fetch() {
        let fetcher = CountingFetcher {
            body: ss_payload(),
            calls: RefCell::new(0),
        };
        let cache = ConfigCache::new(Duration::from_secs(60));
        let sub = Subscription {
            name: "s".to_string(),
            url: "https://example.com/sub".to_string(),
            kind: SubscriptionKind::Shadowsocks,
            udp_relay: None,
            username: None,
            password: None,
        };

        let first = fetch_nodes(&fetcher, &cache, &sub).unwrap();
        let second = fetch_nodes(&fetcher, &cache, &sub).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(*fetcher.calls.borrow(), 1);
        assert!(cache.has("https://example.com/sub"));
    }

    #[test]
    fn test_node_api_requires_credentials() {
        let fetcher = CountingFetcher {
            body: String::new(),
            calls: RefCell::new(0),
        };
        let cache = ConfigCache::new(Duration::from_secs(60));
        let sub = Subscription {
            name: "api".to_string(),
            url: "https://api.example.com/node".to_string(),
            kind: SubscriptionKind::NodeApi,
            udp_relay: None,
            username: None,
            password: None,
        };
        let err = fetch_nodes(&fetcher, &cache, &sub).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(*fetcher.calls.borrow(), 0);
    }

    #[test]
    fn test_node_api_uses_synthesized_cache_key() {
        let fetcher = CountingFetcher {
            body: r#"{"ret":1,"data":[{"name":"n","server":"s.example","server_port":1,"method":"m","password":"p"}]}"#.to_string(),
            calls: RefCell::new(0),
        };
        let cache = ConfigCache::new(Duration::from_secs(60));
        let sub = Subscription {
            name: "api".to_string(),
            url: "https://api.example.com/node".to_string(),
            kind: SubscriptionKind::NodeApi,
            udp_relay: None,
            username: Some("alice".to_string()),
            password: Some("pw".to_string()),
        };
        fetch_nodes(&fetcher, &cache, &sub).unwrap();
        assert!(cache.has("api:alice@https://api.example.com/node"));
    }
}
