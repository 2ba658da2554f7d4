//! Shadowsocks SIP002 serializer: `ss://` URIs and the raw JSON node list.

use log::warn;
use serde_json::json;

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::models::{NodeConfig, ShadowsocksNode, SsObfs};
use crate::utils::base64::{base64_encode, url_safe_base64_encode};
use crate::utils::url::url_encode;

/// Rebuild the SIP002 plugin declaration from the obfs fields.
fn plugin_string(node: &ShadowsocksNode) -> Option<String> {
    let obfs = node.obfs?;
    let mut parts = Vec::new();
    if obfs.is_websocket() {
        parts.push("v2ray-plugin".to_string());
        if obfs == SsObfs::Wss {
            parts.push("tls".to_string());
        }
        if let Some(host) = &node.obfs_host {
            parts.push(format!("host={}", host));
        }
        if let Some(path) = &node.obfs_uri {
            parts.push(format!("path={}", path));
        }
    } else {
        parts.push("obfs-local".to_string());
        parts.push(format!("obfs={}", obfs.as_str()));
        if let Some(host) = &node.obfs_host {
            parts.push(format!("obfs-host={}", host));
        }
    }
    Some(parts.join(";"))
}

/// Encode one node as a SIP002 `ss://` URI.
pub fn format_ss_uri(node: &ShadowsocksNode) -> String {
    let userinfo = url_safe_base64_encode(&format!("{}:{}", node.method, node.password));
    let mut uri = format!("ss://{}@{}:{}", userinfo, node.hostname, node.port);
    if let Some(plugin) = plugin_string(node) {
        uri.push_str(&format!("/?plugin={}", url_encode(&plugin)));
    }
    uri.push_str(&format!("#{}", url_encode(&node.name)));
    uri
}

/// Convert nodes to one `ss://` URI per line. Only Shadowsocks nodes can be
/// expressed; everything else is dropped with a warning.
pub fn proxy_to_ss_sub(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Shadowsocks(ss) => lines.push(format_ss_uri(ss)),
            NodeConfig::ShadowsocksR(_)
            | NodeConfig::Vmess(_)
            | NodeConfig::Https(_)
            | NodeConfig::Snell(_) => {
                warn!(
                    "skipping node '{}' for ss subscription: type '{}' not supported",
                    node.name(),
                    node.type_name()
                );
            }
        }
    }
    Ok(lines.join("\n"))
}

/// The base64-wrapped subscription form.
pub fn proxy_to_ss_sub_b64(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    Ok(base64_encode(&proxy_to_ss_sub(nodes, filter)?))
}

/// Raw JSON array of Shadowsocks node objects (gui-config shape).
pub fn proxy_to_ss_json(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    let mut configs = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Shadowsocks(ss) => {
                let mut entry = json!({
                    "remarks": ss.name,
                    "server": ss.hostname,
                    "server_port": ss.port,
                    "method": ss.method,
                    "password": ss.password,
                });
                if let Some(obfs) = ss.obfs {
                    let plugin = if obfs.is_websocket() {
                        "v2ray-plugin"
                    } else {
                        "obfs-local"
                    };
                    entry["plugin"] = json!(plugin);
                    if let Some(opts) = plugin_string(ss) {
                        // option string without the leading plugin name
                        let opts = opts
                            .splitn(2, ';')
                            .nth(1)
                            .unwrap_or_default()
                            .to_string();
                        entry["plugin_opts"] = json!(opts);
                    }
                }
                configs.push(entry);
            }
            _ => warn!(
                "skipping node '{}' for ss json: type '{}' not supported",
                node.name(),
                node.type_name()
            ),
        }
    }
    Ok(serde_json::to_string_pretty(&configs).unwrap_or_default())
}
