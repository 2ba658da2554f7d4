//! ShadowsocksR URI codec and subscription decoder.

use log::warn;

use crate::error::Result;
use crate::models::{NodeConfig, ShadowsocksRNode};
use crate::utils::base64::{url_safe_base64_decode, url_safe_base64_encode};
use crate::utils::query::parse_query;

/// Parse an `ssr://` link.
///
/// Wire form:
/// `ssr://b64(host:port:protocol:method:obfs:b64(password)/?obfsparam=b64&protoparam=b64&remarks=b64)`
pub fn explode_ssr(link: &str) -> Option<ShadowsocksRNode> {
    if !link.starts_with("ssr://") {
        return None;
    }

    let decoded = url_safe_base64_decode(&link[6..]);
    if decoded.is_empty() {
        return None;
    }

    let (main, params) = match decoded.find("/?") {
        Some(pos) => (&decoded[..pos], &decoded[pos + 2..]),
        None => (decoded.as_str(), ""),
    };

    // The password segment is itself base64 and may contain ':' once
    // decoded, so split the fixed five separators from the right.
    let mut parts = main.rsplitn(6, ':');
    let password_encoded = parts.next()?;
    let obfs = parts.next()?.to_string();
    let method = parts.next()?.to_string();
    let protocol = parts.next()?.to_string();
    let port = parts.next()?.parse::<u16>().ok()?;
    let hostname = parts.next()?.to_string();
    if hostname.is_empty() || port == 0 {
        return None;
    }

    let password = url_safe_base64_decode(password_encoded);

    let mut node = ShadowsocksRNode {
        name: format!("{} ({})", hostname, port),
        hostname,
        port,
        method,
        password,
        protocol,
        obfs,
        ..Default::default()
    };

    for (key, value) in parse_query(params) {
        let value = url_safe_base64_decode(&value);
        match key.as_str() {
            "obfsparam" => node.obfs_param = value,
            "protoparam" => node.protocol_param = value,
            "remarks" => {
                if !value.is_empty() {
                    node.name = value;
                }
            }
            _ => {}
        }
    }

    Some(node)
}

/// Encode a node back into an `ssr://` link. Inverse of [`explode_ssr`].
pub fn format_ssr_uri(node: &ShadowsocksRNode) -> String {
    let body = format!(
        "{}:{}:{}:{}:{}:{}/?obfsparam={}&protoparam={}&remarks={}",
        node.hostname,
        node.port,
        node.protocol,
        node.method,
        node.obfs,
        url_safe_base64_encode(&node.password),
        url_safe_base64_encode(&node.obfs_param),
        url_safe_base64_encode(&node.protocol_param),
        url_safe_base64_encode(&node.name),
    );
    format!("ssr://{}", url_safe_base64_encode(&body))
}

/// Decode a whole SSR subscription payload. Lines not starting with
/// `ssr://` are discarded; the udp-relay override is applied post-hoc.
pub fn parse_ssr_subscription(
    text: &str,
    udp_relay: Option<bool>,
) -> Result<Vec<NodeConfig>> {
    let decoded = url_safe_base64_decode(text);
    let body = if decoded.is_empty() { text } else { decoded.as_str() };

    let mut nodes = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if !line.starts_with("ssr://") {
            continue;
        }
        match explode_ssr(line) {
            Some(mut node) => {
                node.udp_relay = node.udp_relay.or(udp_relay);
                nodes.push(NodeConfig::ShadowsocksR(node));
            }
            None => warn!("discarding malformed ssr line: {}", line),
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;

    fn sample() -> ShadowsocksRNode {
        ShadowsocksRNode {
            name: "Test SSR".to_string(),
            hostname: "example.com".to_string(),
            port: 8388,
            method: "aes-256-cfb".to_string(),
            password: "p@ss:word".to_string(),
            protocol: "auth_aes128_md5".to_string(),
            protocol_param: "1234:u".to_string(),
            obfs: "tls1.2_ticket_auth".to_string(),
            obfs_param: "fake.example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let original = sample();
        let decoded = explode_ssr(&format_ssr_uri(&original)).unwrap();
        assert_eq!(decoded.hostname, original.hostname);
        assert_eq!(decoded.port, original.port);
        assert_eq!(decoded.protocol, original.protocol);
        assert_eq!(decoded.method, original.method);
        assert_eq!(decoded.obfs, original.obfs);
        assert_eq!(decoded.password, original.password);
        assert_eq!(decoded.obfs_param, original.obfs_param);
        assert_eq!(decoded.protocol_param, original.protocol_param);
        assert_eq!(decoded.name, original.name);
    }

    #[test]
    fn test_explode_ssr_without_params() {
        let body = format!(
            "h.example:443:origin:rc4-md5:plain:{}",
            url_safe_base64_encode("secret")
        );
        let link = format!("ssr://{}", url_safe_base64_encode(&body));
        let node = explode_ssr(&link).unwrap();
        assert_eq!(node.hostname, "h.example");
        assert_eq!(node.port, 443);
        assert_eq!(node.password, "secret");
        assert_eq!(node.name, "h.example (443)");
        assert_eq!(node.obfs_param, "");
    }

    #[test]
    fn test_explode_ssr_rejects_short_form() {
        let link = format!("ssr://{}", url_safe_base64_encode("host:8388:origin"));
        assert!(explode_ssr(&link).is_none());
        assert!(explode_ssr("ss://nope").is_none());
    }

    #[test]
    fn test_subscription_filters_and_overrides() {
        let uri = format_ssr_uri(&sample());
        let payload = base64_encode(&format!("{}\nvmess://ignored\n", uri));
        let nodes = parse_ssr_subscription(&payload, Some(true)).unwrap();
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            NodeConfig::ShadowsocksR(ssr) => assert_eq!(ssr.udp_relay, Some(true)),
            _ => panic!("expected ssr node"),
        }
    }
}
