//! V2RayN serializer: `vmess://` URIs and the base64 subscription wrapper.

use log::warn;
use serde_json::json;

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::models::{NodeConfig, VmessNode};
use crate::utils::base64::base64_encode;

/// Encode one node as a `vmess://<base64 JSON>` URI.
///
/// Round-trip oriented: `aid` is re-emitted exactly as decoded and `tls` is
/// the literal string `"tls"` or `""`, matching the target's historical
/// JSON shape.
pub fn format_vmess_uri(node: &VmessNode) -> String {
    let payload = json!({
        "v": "2",
        "ps": node.name,
        "add": node.hostname,
        "port": node.port,
        "id": node.uuid,
        "aid": node.alter_id,
        "net": node.network,
        "type": "none",
        "host": node.host,
        "path": node.path,
        "tls": if node.tls { "tls" } else { "" },
    });
    format!("vmess://{}", base64_encode(&payload.to_string()))
}

/// Convert nodes to one `vmess://` URI per line. Non-VMess nodes are
/// dropped with a warning.
pub fn proxy_to_v2rayn(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Vmess(vmess) => lines.push(format_vmess_uri(vmess)),
            NodeConfig::Shadowsocks(_)
            | NodeConfig::ShadowsocksR(_)
            | NodeConfig::Https(_)
            | NodeConfig::Snell(_) => {
                warn!(
                    "skipping node '{}' for v2rayn: type '{}' not supported",
                    node.name(),
                    node.type_name()
                );
            }
        }
    }
    Ok(lines.join("\n"))
}

/// The subscription form providers actually serve: the URI list, base64
/// encoded as a whole.
pub fn proxy_to_v2rayn_sub(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    Ok(base64_encode(&proxy_to_v2rayn(nodes, filter)?))
}
