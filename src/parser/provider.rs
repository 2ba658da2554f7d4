//! Provider JSON decoders.
//!
//! Two independent shapes: the generic gui-config `{configs: [...]}`
//! document, and a credential-authenticated node API returning a
//! `{ret, data}` envelope.

use log::warn;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{NodeConfig, ShadowsocksNode, SsObfs};
use crate::utils::attribute::parse_attributes;

/// Decode a gui-config style document: `{ "configs": [ { server,
/// server_port, password, method, remarks, plugin, plugin_opts } ] }`.
pub fn parse_ss_conf(content: &str, source: &str) -> Result<Vec<NodeConfig>> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| Error::source_parse(source, format!("invalid JSON: {}", e)))?;

    let configs = json["configs"]
        .as_array()
        .ok_or_else(|| Error::source_parse(source, "missing 'configs' array"))?;

    let mut nodes = Vec::new();
    for config in configs {
        match config_to_node(config) {
            Some(node) => nodes.push(NodeConfig::Shadowsocks(node)),
            None => warn!("discarding incomplete config entry in '{}'", source),
        }
    }
    Ok(nodes)
}

/// Decode the credential node API envelope: `{ "ret": 1, "data": [ { name,
/// server, server_port, method, password, obfs, obfs_host } ] }`.
pub fn parse_node_api(content: &str, source: &str) -> Result<Vec<NodeConfig>> {
    let json: Value = serde_json::from_str(content)
        .map_err(|e| Error::source_parse(source, format!("invalid JSON: {}", e)))?;

    if json["ret"].as_u64() != Some(1) {
        return Err(Error::source_parse(
            source,
            format!("api rejected request: ret={}", json["ret"]),
        ));
    }

    let data = json["data"]
        .as_array()
        .ok_or_else(|| Error::source_parse(source, "missing 'data' array"))?;

    let mut nodes = Vec::new();
    for entry in data {
        let hostname = entry["server"].as_str().unwrap_or("").to_string();
        let port = coerce_port(&entry["server_port"]);
        if hostname.is_empty() || port == 0 {
            warn!("discarding incomplete api entry in '{}'", source);
            continue;
        }
        let name = entry["name"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} ({})", hostname, port));
        nodes.push(NodeConfig::Shadowsocks(ShadowsocksNode {
            name,
            hostname,
            port,
            method: entry["method"].as_str().unwrap_or("").to_string(),
            password: entry["password"].as_str().unwrap_or("").to_string(),
            obfs: entry["obfs"].as_str().and_then(SsObfs::from_name),
            obfs_host: entry["obfs_host"].as_str().map(str::to_string),
            ..Default::default()
        }));
    }
    Ok(nodes)
}

/// Cache key for a credential source, synthesized since the URL alone does
/// not identify the account.
pub fn api_cache_key(endpoint: &str, username: &str) -> String {
    format!("api:{}@{}", username, endpoint)
}

fn config_to_node(config: &Value) -> Option<ShadowsocksNode> {
    let hostname = config["server"].as_str().unwrap_or("").to_string();
    let port = coerce_port(&config["server_port"]);
    if hostname.is_empty() || port == 0 {
        return None;
    }

    let name = config["remarks"]
        .as_str()
        .or_else(|| config["name"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} ({})", hostname, port));

    let mut node = ShadowsocksNode {
        name,
        hostname,
        port,
        method: config["method"].as_str().unwrap_or("").to_string(),
        password: config["password"].as_str().unwrap_or("").to_string(),
        enable: config["enable"].as_bool(),
        ..Default::default()
    };

    // Plugin option strings reuse the attribute-list wire form
    let plugin = config["plugin"].as_str().unwrap_or("");
    let plugin_opts = config["plugin_opts"].as_str().unwrap_or("");
    if plugin == "obfs-local" || plugin == "simple-obfs" {
        let attrs = parse_attributes(plugin_opts);
        node.obfs = attrs.get("obfs").and_then(|o| SsObfs::from_name(o));
        node.obfs_host = attrs.get("obfs-host").cloned();
    } else if plugin == "v2ray-plugin" {
        let attrs = parse_attributes(plugin_opts);
        node.obfs = Some(if attrs.contains_key("tls") {
            SsObfs::Wss
        } else {
            SsObfs::Ws
        });
        node.obfs_host = attrs.get("host").cloned();
        node.obfs_uri = attrs.get("path").cloned();
    }
    Some(node)
}

fn coerce_port(value: &Value) -> u16 {
    match value {
        Value::String(s) => s.parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().map(|p| p as u16).unwrap_or(0),
        _ => 0,
    }
}
