//! ShadowsocksR subscription serializer: `ssr://` URIs.

use log::warn;

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::models::NodeConfig;
use crate::parser::ssr::format_ssr_uri;
use crate::utils::base64::base64_encode;

/// Convert nodes to one `ssr://` URI per line. Only ShadowsocksR nodes can
/// be expressed.
pub fn proxy_to_ssr_sub(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::ShadowsocksR(ssr) => lines.push(format_ssr_uri(ssr)),
            NodeConfig::Shadowsocks(_)
            | NodeConfig::Vmess(_)
            | NodeConfig::Https(_)
            | NodeConfig::Snell(_) => {
                warn!(
                    "skipping node '{}' for ssr subscription: type '{}' not supported",
                    node.name(),
                    node.type_name()
                );
            }
        }
    }
    Ok(lines.join("\n"))
}

/// The base64-wrapped subscription form.
pub fn proxy_to_ssr_sub_b64(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    Ok(base64_encode(&proxy_to_ssr_sub(nodes, filter)?))
}
