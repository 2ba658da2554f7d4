//! V2RayN VMess subscription decoder.

use log::warn;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NodeConfig, VmessNode};
use crate::utils::base64::url_safe_base64_decode;

/// Networks this model can express. `kcp` and `http` exist in the wild but
/// have no representation in any supported target, so the node is dropped.
const SUPPORTED_NETWORKS: &[&str] = &["tcp", "ws"];

/// Parse one `vmess://` base64-JSON link.
///
/// Returns `Ok(None)` when the node is valid but uses an unsupported
/// network (skip-and-warn); a bad version marker is an error for the whole
/// subscription.
pub fn explode_vmess(link: &str, source: &str) -> Result<Option<VmessNode>> {
    if !link.starts_with("vmess://") {
        return Ok(None);
    }

    let decoded = url_safe_base64_decode(&link[8..]);
    let json: Value = serde_json::from_str(&decoded)
        .map_err(|e| Error::source_parse(source, format!("invalid vmess JSON: {}", e)))?;

    // The v2rayN scheme is only defined for version 2
    let version_ok = match &json["v"] {
        Value::String(s) => s == "2",
        Value::Number(n) => n.as_u64() == Some(2),
        _ => false,
    };
    if !version_ok {
        return Err(Error::source_parse(
            source,
            format!("unsupported vmess version marker: {}", json["v"]),
        ));
    }

    let name = json["ps"].as_str().unwrap_or("").to_string();
    let hostname = json["add"].as_str().unwrap_or("").to_string();
    let port = coerce_port(&json["port"]);
    let uuid = json["id"].as_str().unwrap_or("").to_string();
    let alter_id = match &json["aid"] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => "0".to_string(),
    };
    let network = json["net"].as_str().unwrap_or("tcp").to_string();
    let host = json["host"].as_str().unwrap_or("").to_string();
    let path = json["path"].as_str().unwrap_or("/").to_string();
    let tls = json["tls"].as_str().unwrap_or("") == "tls";

    if !SUPPORTED_NETWORKS.contains(&network.as_str()) {
        warn!(
            "dropping vmess node '{}' from '{}': unsupported network '{}'",
            name, source, network
        );
        return Ok(None);
    }
    if hostname.is_empty() || port == 0 {
        warn!("dropping vmess node '{}' from '{}': missing address", name, source);
        return Ok(None);
    }
    if Uuid::parse_str(&uuid).is_err() {
        warn!("dropping vmess node '{}' from '{}': invalid uuid '{}'", name, source, uuid);
        return Ok(None);
    }

    Ok(Some(VmessNode {
        name: if name.is_empty() {
            format!("{} ({})", hostname, port)
        } else {
            name
        },
        hostname,
        port,
        uuid,
        alter_id,
        // The URI scheme never carries a cipher; decode always yields auto
        method: "auto".to_string(),
        network,
        host,
        path,
        tls,
        ..Default::default()
    }))
}

fn coerce_port(value: &Value) -> u16 {
    match value {
        Value::String(s) => s.parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().map(|p| p as u16).unwrap_or(0),
        _ => 0,
    }
}

/// Decode a whole V2RayN subscription payload.
///
/// The payload is base64-decoded, lines without the `vmess://` prefix are
/// discarded, and each remaining line's payload is base64-decoded again
/// into JSON. A bad version marker fails the whole subscription; an
/// unsupported network only loses that node.
pub fn parse_v2rayn_subscription(text: &str, source: &str) -> Result<Vec<NodeConfig>> {
    let decoded = url_safe_base64_decode(text);
    let body = if decoded.is_empty() { text } else { decoded.as_str() };

    let mut nodes = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if !line.starts_with("vmess://") {
            continue;
        }
        if let Some(node) = explode_vmess(line, source)? {
            nodes.push(NodeConfig::Vmess(node));
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_encode;
    use serde_json::json;

    const UUID: &str = "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a";

    fn vmess_link(payload: Value) -> String {
        format!("vmess://{}", base64_encode(&payload.to_string()))
    }

    fn sample(net: &str) -> Value {
        json!({
            "v": "2",
            "ps": "Example VMess",
            "add": "vm.example.com",
            "port": "443",
            "id": UUID,
            "aid": "64",
            "net": net,
            "type": "none",
            "host": "cdn.example.com",
            "path": "/ws",
            "tls": "tls"
        })
    }

    #[test]
    fn test_explode_vmess_ws() {
        let node = explode_vmess(&vmess_link(sample("ws")), "sub").unwrap().unwrap();
        assert_eq!(node.name, "Example VMess");
        assert_eq!(node.hostname, "vm.example.com");
        assert_eq!(node.port, 443);
        assert_eq!(node.uuid, UUID);
        assert_eq!(node.alter_id, "64");
        assert_eq!(node.method, "auto");
        assert_eq!(node.network, "ws");
        assert_eq!(node.host, "cdn.example.com");
        assert_eq!(node.path, "/ws");
        assert!(node.tls);
    }

    #[test]
    fn test_numeric_port_and_aid_are_coerced() {
        let mut payload = sample("tcp");
        payload["port"] = json!(8080);
        payload["aid"] = json!(0);
        let node = explode_vmess(&vmess_link(payload), "sub").unwrap().unwrap();
        assert_eq!(node.port, 8080);
        assert_eq!(node.alter_id, "0");
    }

    #[test]
    fn test_version_one_is_fatal_for_the_source() {
        let mut payload = sample("ws");
        payload["v"] = json!("1");
        let err = explode_vmess(&vmess_link(payload), "sub-a").unwrap_err();
        assert!(matches!(err, Error::SourceParse { .. }));
        assert!(err.to_string().contains("sub-a"));
    }

    #[test]
    fn test_kcp_node_is_dropped_not_fatal() {
        let lines = format!(
            "{}\n{}\n",
            vmess_link(sample("kcp")),
            vmess_link(sample("ws"))
        );
        let payload = base64_encode(&lines);
        let nodes = parse_v2rayn_subscription(&payload, "sub").unwrap();
        // one line dropped, run continues
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name(), "Example VMess");
    }

    #[test]
    fn test_bad_version_fails_whole_subscription() {
        let mut bad = sample("ws");
        bad["v"] = json!(3);
        let lines = format!("{}\n{}\n", vmess_link(sample("ws")), vmess_link(bad));
        let payload = base64_encode(&lines);
        assert!(parse_v2rayn_subscription(&payload, "sub").is_err());
    }

    #[test]
    fn test_invalid_uuid_drops_node() {
        let mut payload = sample("ws");
        payload["id"] = json!("not-a-uuid");
        assert!(explode_vmess(&vmess_link(payload), "sub").unwrap().is_none());
    }
}
