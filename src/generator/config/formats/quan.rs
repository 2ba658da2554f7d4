//! Quantumult (legacy) serializer.
//!
//! Each VMess/HTTPS node is composed as a `name = attrs` config line and
//! then wrapped as `scheme://base64(line)`; Shadowsocks and ShadowsocksR
//! nodes are carried as their own URI forms, which Quantumult imports
//! directly.

use log::warn;

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::generator::config::formats::ss_sub::format_ss_uri;
use crate::generator::config::line_builder::LineBuilder;
use crate::models::{ExtraSettings, HttpsNode, NodeConfig, VmessNode};
use crate::parser::ssr::format_ssr_uri;
use crate::utils::base64::base64_encode;

/// Quantumult rejects the literal `auto`; substitute the cipher it ships
/// with.
fn quan_method(method: &str) -> &str {
    if method == "auto" {
        "chacha20-ietf-poly1305"
    } else {
        method
    }
}

fn vmess_line(node: &VmessNode, ext: &ExtraSettings) -> String {
    let name = node.name.replace(',', "_");
    let mut b = LineBuilder::new();
    b.push(format!("{} = vmess", name))
        .push(node.hostname.clone())
        .push(node.port.to_string())
        .push(quan_method(&node.method).to_string())
        .push(format!("\"{}\"", node.uuid))
        .kv("over-tls", node.tls)
        .kv("certificate", 1);
    if node.network == "ws" {
        b.kv("obfs", "ws");
        b.kv("obfs-path", format!("\"{}\"", node.path));
        let host = if node.host.is_empty() {
            &node.hostname
        } else {
            &node.host
        };
        // The [Rr][Nn] token stands in for CRLF so the line survives
        // Quantumult's own config parser
        b.kv(
            "obfs-header",
            format!(
                "\"Host:{}[Rr][Nn]User-Agent:{}\"",
                host, ext.quan_user_agent
            ),
        );
    }
    format!("vmess://{}", base64_encode(&b.build()))
}

fn https_line(node: &HttpsNode) -> String {
    let name = node.name.replace(',', "_");
    let mut b = LineBuilder::new();
    b.push(format!("{} = http", name))
        .kv("upstream-proxy-address", &node.hostname)
        .kv("upstream-proxy-port", node.port)
        .kv("username", &node.username)
        .kv("password", &node.password)
        .kv("over-tls", true)
        .kv("certificate", 1);
    format!("http://{}", base64_encode(&b.build()))
}

/// Convert nodes to Quantumult subscription lines.
pub fn proxy_to_quan(
    nodes: &[NodeConfig],
    filter: Option<&NodeFilter>,
    ext: &ExtraSettings,
) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Vmess(vmess) => lines.push(vmess_line(vmess, ext)),
            NodeConfig::Shadowsocks(ss) => lines.push(format_ss_uri(ss)),
            NodeConfig::ShadowsocksR(ssr) => lines.push(format_ssr_uri(ssr)),
            NodeConfig::Https(https) => lines.push(https_line(https)),
            NodeConfig::Snell(snell) => {
                warn!(
                    "skipping node '{}' for quantumult: type 'snell' not supported",
                    snell.name
                );
            }
        }
    }
    Ok(lines.join("\n"))
}

/// The base64-wrapped subscription form.
pub fn proxy_to_quan_sub(
    nodes: &[NodeConfig],
    filter: Option<&NodeFilter>,
    ext: &ExtraSettings,
) -> Result<String> {
    Ok(base64_encode(&proxy_to_quan(nodes, filter, ext)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::base64::base64_decode;

    fn vmess(method: &str) -> VmessNode {
        VmessNode {
            name: "VM".to_string(),
            hostname: "vm.example.com".to_string(),
            port: 443,
            uuid: "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a".to_string(),
            alter_id: "0".to_string(),
            method: method.to_string(),
            network: "ws".to_string(),
            host: "cdn.example.com".to_string(),
            path: "/ws".to_string(),
            tls: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_auto_method_is_substituted() {
        let line = vmess_line(&vmess("auto"), &ExtraSettings::default());
        let decoded = base64_decode(&line["vmess://".len()..]);
        assert!(!decoded.contains("auto"));
        assert!(decoded.contains("chacha20-ietf-poly1305"));
    }

    #[test]
    fn test_obfs_header_uses_crlf_token() {
        let line = vmess_line(&vmess("aes-128-gcm"), &ExtraSettings::default());
        let decoded = base64_decode(&line["vmess://".len()..]);
        assert!(decoded.contains("Host:cdn.example.com[Rr][Nn]User-Agent:"));
        assert!(!decoded.contains('\r'));
        assert!(decoded.contains("over-tls=true"));
    }

    #[test]
    fn test_node_line_is_base64_wrapped() {
        let line = vmess_line(&vmess("auto"), &ExtraSettings::default());
        assert!(line.starts_with("vmess://"));
        let decoded = base64_decode(&line["vmess://".len()..]);
        assert!(decoded.starts_with("VM = vmess, vm.example.com, 443,"));
    }
}
