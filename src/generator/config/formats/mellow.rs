//! Mellow serializer. Only VMess nodes can be expressed.

use log::warn;

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::generator::config::formats::v2ray::format_vmess_uri;
use crate::models::NodeConfig;

/// Convert nodes to Mellow CSV-like lines.
///
/// Reuses the VMess URI encoder with the scheme token rewritten to
/// Mellow's `vmess1://`; any non-VMess node is dropped with a warning.
pub fn proxy_to_mellow(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Vmess(vmess) => {
                let uri = format_vmess_uri(vmess).replacen("vmess://", "vmess1://", 1);
                lines.push(format!("{}, vmess1, {}", vmess.name.replace(',', "_"), uri));
            }
            NodeConfig::Shadowsocks(_)
            | NodeConfig::ShadowsocksR(_)
            | NodeConfig::Https(_)
            | NodeConfig::Snell(_) => {
                warn!(
                    "skipping node '{}' for mellow: type '{}' not supported",
                    node.name(),
                    node.type_name()
                );
            }
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShadowsocksNode, VmessNode};

    #[test]
    fn test_only_vmess_survives_and_scheme_is_rewritten() {
        let nodes = vec![
            NodeConfig::Shadowsocks(ShadowsocksNode {
                name: "SS".to_string(),
                hostname: "ss.example.com".to_string(),
                port: 8388,
                ..Default::default()
            }),
            NodeConfig::Vmess(VmessNode {
                name: "VM".to_string(),
                hostname: "vm.example.com".to_string(),
                port: 443,
                uuid: "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a".to_string(),
                method: "auto".to_string(),
                network: "tcp".to_string(),
                ..Default::default()
            }),
        ];
        let out = proxy_to_mellow(&nodes, None).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("VM, vmess1, vmess1://"));
        assert!(!out.contains("vmess1://vmess://"));
    }
}
