//! Quantumult X serializer. Plain `key=value` lines, one node per line.

use log::warn;

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::generator::config::line_builder::LineBuilder;
use crate::models::{
    ExtraSettings, HttpsNode, NodeConfig, ShadowsocksNode, ShadowsocksRNode, VmessNode,
};

fn quanx_method(method: &str) -> &str {
    // Same substitution as legacy Quantumult: the target rejects `auto`
    if method == "auto" {
        "chacha20-ietf-poly1305"
    } else {
        method
    }
}

fn tag(name: &str) -> String {
    name.replace(',', "_")
}

fn vmess_line(node: &VmessNode) -> String {
    let mut b = LineBuilder::new();
    b.push(format!("vmess={}:{}", node.hostname, node.port))
        .kv("method", quanx_method(&node.method))
        .kv("password", &node.uuid);
    // QuantumultX quirk: vmess udp-relay defaults to true when unset,
    // unlike ss/ssr where an unset flag is omitted
    b.kv("udp-relay", node.udp_relay.unwrap_or(true));
    if node.network == "ws" {
        b.kv("obfs", if node.tls { "wss" } else { "ws" });
        b.kv("obfs-uri", &node.path);
        if !node.host.is_empty() {
            b.kv("obfs-host", &node.host);
        }
    }
    if let Some(scv) = node.skip_cert_verify {
        b.kv("tls-verification", !scv);
    }
    b.kv("tag", tag(&node.name));
    b.build()
}

fn ss_line(node: &ShadowsocksNode) -> String {
    let mut b = LineBuilder::new();
    b.push(format!("shadowsocks={}:{}", node.hostname, node.port))
        .kv("method", &node.method)
        .kv("password", &node.password);
    if let Some(obfs) = node.obfs {
        b.kv("obfs", obfs.as_str());
        b.kv_opt("obfs-host", node.obfs_host.as_deref());
        if obfs.is_websocket() {
            b.kv_opt("obfs-uri", node.obfs_uri.as_deref());
        }
    }
    b.kv_bool("udp-relay", node.udp_relay);
    b.kv("tag", tag(&node.name));
    b.build()
}

fn ssr_line(node: &ShadowsocksRNode) -> String {
    let mut b = LineBuilder::new();
    b.push(format!("shadowsocks={}:{}", node.hostname, node.port))
        .kv("method", &node.method)
        .kv("password", &node.password)
        .kv("ssr-protocol", &node.protocol);
    if !node.protocol_param.is_empty() {
        b.kv("ssr-protocol-param", &node.protocol_param);
    }
    b.kv("obfs", &node.obfs);
    if !node.obfs_param.is_empty() {
        b.kv("obfs-host", &node.obfs_param);
    }
    b.kv_bool("udp-relay", node.udp_relay);
    b.kv("tag", tag(&node.name));
    b.build()
}

fn https_line(node: &HttpsNode) -> String {
    let mut b = LineBuilder::new();
    b.push(format!("http={}:{}", node.hostname, node.port))
        .kv("username", &node.username)
        .kv("password", &node.password)
        .kv("over-tls", true);
    if let Some(scv) = node.skip_cert_verify {
        b.kv("tls-verification", !scv);
    }
    b.kv_bool("tls13", node.tls13);
    b.kv("tag", tag(&node.name));
    b.build()
}

/// Convert nodes to QuantumultX server lines.
pub fn proxy_to_quanx(
    nodes: &[NodeConfig],
    filter: Option<&NodeFilter>,
    _ext: &ExtraSettings,
) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Vmess(vmess) => lines.push(vmess_line(vmess)),
            NodeConfig::Shadowsocks(ss) => lines.push(ss_line(ss)),
            NodeConfig::ShadowsocksR(ssr) => lines.push(ssr_line(ssr)),
            NodeConfig::Https(https) => lines.push(https_line(https)),
            NodeConfig::Snell(snell) => {
                warn!(
                    "skipping node '{}' for quantumult x: type 'snell' not supported",
                    snell.name
                );
            }
        }
    }
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vmess_udp_relay_defaults_to_true() {
        let node = VmessNode {
            name: "VM".to_string(),
            hostname: "vm.example.com".to_string(),
            port: 443,
            uuid: "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a".to_string(),
            method: "auto".to_string(),
            network: "tcp".to_string(),
            ..Default::default()
        };
        let line = vmess_line(&node);
        assert!(line.contains("udp-relay=true"));
        assert!(line.contains("method=chacha20-ietf-poly1305"));
        assert!(line.ends_with("tag=VM"));

        let mut node = node;
        node.udp_relay = Some(false);
        assert!(vmess_line(&node).contains("udp-relay=false"));
    }

    #[test]
    fn test_ss_udp_relay_is_omitted_when_unset() {
        let node = ShadowsocksNode {
            name: "SS".to_string(),
            hostname: "ss.example.com".to_string(),
            port: 8388,
            method: "aes-256-gcm".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };
        let line = ss_line(&node);
        assert!(!line.contains("udp-relay"));
        assert_eq!(
            line,
            "shadowsocks=ss.example.com:8388, method=aes-256-gcm, password=pw, tag=SS"
        );
    }

    #[test]
    fn test_vmess_wss_obfs_tracks_tls() {
        let mut node = VmessNode {
            name: "VM".to_string(),
            hostname: "vm.example.com".to_string(),
            port: 443,
            uuid: "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a".to_string(),
            method: "aes-128-gcm".to_string(),
            network: "ws".to_string(),
            host: "cdn.example.com".to_string(),
            path: "/ws".to_string(),
            tls: true,
            ..Default::default()
        };
        assert!(vmess_line(&node).contains("obfs=wss"));
        node.tls = false;
        assert!(vmess_line(&node).contains("obfs=ws,"));
    }

    #[test]
    fn test_ssr_line_carries_protocol_params() {
        let node = ShadowsocksRNode {
            name: "SSR".to_string(),
            hostname: "ssr.example.com".to_string(),
            port: 443,
            method: "chacha20".to_string(),
            password: "pw".to_string(),
            protocol: "auth_aes128_md5".to_string(),
            protocol_param: "1234:u".to_string(),
            obfs: "tls1.2_ticket_auth".to_string(),
            obfs_param: "fake.example.com".to_string(),
            ..Default::default()
        };
        let line = ssr_line(&node);
        assert!(line.contains("ssr-protocol=auth_aes128_md5"));
        assert!(line.contains("ssr-protocol-param=1234:u"));
        assert!(line.contains("obfs-host=fake.example.com"));
    }
}
