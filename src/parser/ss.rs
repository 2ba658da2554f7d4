//! SIP002 Shadowsocks subscription decoder.

use log::warn;

use crate::error::Result;
use crate::models::{NodeConfig, ShadowsocksNode, SsObfs};
use crate::utils::attribute::parse_attributes;
use crate::utils::base64::url_safe_base64_decode;
use crate::utils::query::parse_query;
use crate::utils::url::url_decode;

/// Parse a single `ss://` link.
///
/// Accepts both SIP002 (`ss://b64(method:password)@host:port`) and the
/// legacy fully-encoded form (`ss://b64(method:password@host:port)`).
pub fn explode_ss(link: &str) -> Option<ShadowsocksNode> {
    if !link.starts_with("ss://") {
        return None;
    }

    let mut content = link[5..].replace("/?", "?");

    // Fragment carries the percent-encoded node name
    let mut name = String::new();
    if let Some(hash_pos) = content.find('#') {
        name = url_decode(content[hash_pos + 1..].trim());
        content.truncate(hash_pos);
    }

    // Query may carry a plugin declaration
    let mut plugin = String::new();
    if let Some(query_pos) = content.find('?') {
        for (key, value) in parse_query(&content[query_pos + 1..]) {
            if key == "plugin" {
                plugin = url_decode(&value);
            }
        }
        content.truncate(query_pos);
    }

    let (method, password, hostname, port) = if let Some((userinfo, server)) =
        content.split_once('@')
    {
        // Userinfo is normally base64, but SIP002 also allows it plain
        let decoded = match url_safe_base64_decode(userinfo) {
            d if d.is_empty() => url_decode(userinfo),
            d => d,
        };
        let (method, password) = decoded.split_once(':')?;
        let (hostname, port) = server.rsplit_once(':')?;
        (
            method.to_string(),
            password.to_string(),
            hostname.to_string(),
            port.parse::<u16>().ok()?,
        )
    } else {
        // Legacy form: the whole authority is base64
        let decoded = url_safe_base64_decode(&content);
        let (userinfo, server) = decoded.split_once('@')?;
        let (method, password) = userinfo.split_once(':')?;
        let (hostname, port) = server.rsplit_once(':')?;
        (
            method.to_string(),
            password.to_string(),
            hostname.to_string(),
            port.parse::<u16>().ok()?,
        )
    };

    if hostname.is_empty() || port == 0 {
        return None;
    }

    if name.is_empty() {
        name = format!("{} ({})", hostname, port);
    }

    let mut node = ShadowsocksNode {
        name,
        hostname,
        port,
        method,
        password,
        ..Default::default()
    };
    apply_plugin(&mut node, &plugin);
    Some(node)
}

/// Map a SIP002 `plugin` declaration onto the obfs fields.
fn apply_plugin(node: &mut ShadowsocksNode, plugin: &str) {
    if plugin.is_empty() {
        return;
    }
    let attrs = parse_attributes(plugin);
    if attrs.contains_key("obfs-local") || attrs.contains_key("simple-obfs") {
        node.obfs = attrs.get("obfs").and_then(|o| SsObfs::from_name(o));
        node.obfs_host = attrs.get("obfs-host").cloned();
    } else if attrs.contains_key("v2ray-plugin") {
        node.obfs = Some(if attrs.contains_key("tls") {
            SsObfs::Wss
        } else {
            SsObfs::Ws
        });
        node.obfs_host = attrs.get("host").cloned();
        node.obfs_uri = attrs.get("path").cloned();
    } else {
        warn!("node '{}': unknown plugin '{}', ignored", node.name, plugin);
    }
}

/// Decode a whole SIP002 subscription payload.
///
/// The payload is base64-decoded and split on newlines; lines not starting
/// with `ss://` are discarded. A malformed line loses only itself.
pub fn parse_ss_subscription(
    text: &str,
    udp_relay: Option<bool>,
) -> Result<Vec<NodeConfig>> {
    let decoded = url_safe_base64_decode(text);
    let body = if decoded.is_empty() { text } else { decoded.as_str() };

    let mut nodes = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if !line.starts_with("ss://") {
            continue;
        }
        match explode_ss(line) {
            Some(mut node) => {
                node.udp_relay = node.udp_relay.or(udp_relay);
                nodes.push(NodeConfig::Shadowsocks(node));
            }
            None => warn!("discarding malformed ss line: {}", line),
        }
    }
    Ok(nodes)
}
