//! Surge proxy-line serializer.

use std::fs;

use log::warn;
use serde_json::json;

use crate::error::{Error, Result};
use crate::filter::{apply_filter, NodeFilter};
use crate::generator::config::line_builder::LineBuilder;
use crate::models::{
    ExtraSettings, HttpsNode, NodeConfig, ShadowsocksNode, ShadowsocksRNode, SnellNode, SsObfs,
    VmessNode,
};
use crate::utils::system::{ensure_config_dir, portable_home};

/// Convert nodes to Surge `Name = type, ...` proxy lines.
///
/// Nodes a Surge build cannot express (websocket-obfs Shadowsocks) are
/// skipped with a warning; a missing ShadowsocksR binary path aborts the
/// run.
pub fn proxy_to_surge(
    nodes: &[NodeConfig],
    filter: Option<&NodeFilter>,
    ext: &ExtraSettings,
) -> Result<String> {
    let mut lines = Vec::new();
    for node in apply_filter(nodes, filter) {
        match &node {
            NodeConfig::Shadowsocks(ss) => {
                if ss.obfs.is_some_and(SsObfs::is_websocket) {
                    warn!(
                        "skipping node '{}' for surge: websocket obfs has no native support",
                        ss.name
                    );
                    continue;
                }
                if ss.surge_external == Some(true) {
                    lines.push(ss_external_line(ss, ext));
                } else {
                    lines.push(ss_native_line(ss));
                }
            }
            NodeConfig::ShadowsocksR(ssr) => lines.push(ssr_external_line(ssr, ext)?),
            NodeConfig::Vmess(vmess) => {
                if vmess.surge_native == Some(true) {
                    lines.push(vmess_native_line(vmess));
                } else {
                    lines.push(vmess_external_line(vmess, ext)?);
                }
            }
            NodeConfig::Https(https) => lines.push(https_line(https)),
            NodeConfig::Snell(snell) => lines.push(snell_line(snell)),
        }
    }
    Ok(lines.join("\n"))
}

fn display_name(name: &str) -> String {
    // Commas delimit Surge attributes
    name.replace(',', "_")
}

fn ss_native_line(node: &ShadowsocksNode) -> String {
    let mut b = LineBuilder::new();
    b.push(node.hostname.clone())
        .push(node.port.to_string())
        .kv("encrypt-method", &node.method)
        .kv("password", &node.password);
    if let Some(obfs) = node.obfs {
        b.kv("obfs", obfs.as_str());
        b.kv_opt("obfs-host", node.obfs_host.as_deref());
    }
    b.kv_bool("udp-relay", node.udp_relay);
    format!("{} = ss, {}", display_name(&node.name), b.build())
}

fn ss_external_line(node: &ShadowsocksNode, ext: &ExtraSettings) -> String {
    let local_port = node.local_port.unwrap_or(1080);
    let port = node.port.to_string();
    let local = local_port.to_string();
    let mut b = LineBuilder::new();
    b.kv("exec", format!("\"{}\"", portable_home(&ext.ss_local_path)));
    let args: [&str; 12] = [
        "-s",
        &node.hostname,
        "-p",
        &port,
        "-m",
        &node.method,
        "-k",
        &node.password,
        "-b",
        "127.0.0.1",
        "-l",
        &local,
    ];
    for arg in args {
        b.kv("args", format!("\"{}\"", arg));
    }
    b.kv("local-port", local_port);
    b.kv("addresses", &node.hostname);
    format!("{} = external, {}", display_name(&node.name), b.build())
}

fn ssr_external_line(node: &ShadowsocksRNode, ext: &ExtraSettings) -> Result<String> {
    let bin_path = node
        .bin_path
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| {
            if ext.surge_ssr_path.is_empty() {
                None
            } else {
                Some(ext.surge_ssr_path.clone())
            }
        })
        .ok_or_else(|| {
            Error::Configuration(format!(
                "node '{}' needs a shadowsocksr binary path for surge output",
                node.name
            ))
        })?;

    let local_port = node.local_port.unwrap_or(1080);
    let port = node.port.to_string();
    let local = local_port.to_string();
    let mut b = LineBuilder::new();
    b.kv("exec", format!("\"{}\"", portable_home(&bin_path)));
    let args: [&str; 20] = [
        "-s",
        &node.hostname,
        "-p",
        &port,
        "-m",
        &node.method,
        "-k",
        &node.password,
        "-o",
        &node.obfs,
        "-O",
        &node.protocol,
        "-g",
        &node.obfs_param,
        "-G",
        &node.protocol_param,
        "-b",
        "127.0.0.1",
        "-l",
        &local,
    ];
    for arg in args {
        b.kv("args", format!("\"{}\"", arg));
    }
    b.kv("local-port", local_port);
    // Every pre-resolved address, then the hostname itself
    if let Some(addresses) = &node.hostname_ip {
        for address in addresses {
            b.kv("addresses", address);
        }
    }
    b.kv("addresses", &node.hostname);
    Ok(format!(
        "{} = external, {}",
        display_name(&node.name),
        b.build()
    ))
}

fn vmess_native_line(node: &VmessNode) -> String {
    let mut b = LineBuilder::new();
    b.push(node.hostname.clone())
        .push(node.port.to_string())
        .kv("username", &node.uuid);
    if node.network == "ws" {
        b.kv("ws", "true");
        b.kv("ws-path", &node.path);
        if !node.host.is_empty() {
            b.kv("ws-headers", format!("Host:{}", node.host));
        }
    }
    if node.tls {
        b.kv("tls", "true");
        b.kv_bool("tls13", node.tls13);
    }
    b.kv_bool("skip-cert-verify", node.skip_cert_verify);
    b.kv_bool("udp-relay", node.udp_relay);
    format!("{} = vmess, {}", display_name(&node.name), b.build())
}

/// External v2ray-core form. Writes the generated JSON config into the
/// per-user config directory and references it from the emitted args, with
/// the home directory rewritten to the portable `$HOME` token.
fn vmess_external_line(node: &VmessNode, ext: &ExtraSettings) -> Result<String> {
    let dir = match &ext.config_dir {
        Some(dir) => dir.clone(),
        None => ensure_config_dir("subforge"),
    };
    let file_name: String = node
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let config_path = dir.join(format!("{}.json", file_name));

    let local_port = node.local_port.unwrap_or(1080);
    let config = json!({
        "log": { "loglevel": "warning" },
        "inbound": {
            "port": local_port,
            "listen": "127.0.0.1",
            "protocol": "socks",
            "settings": { "auth": "noauth", "udp": true }
        },
        "outbound": {
            "protocol": "vmess",
            "settings": {
                "vnext": [{
                    "address": node.hostname,
                    "port": node.port,
                    "users": [{
                        "id": node.uuid,
                        "alterId": node.alter_id.parse::<u32>().unwrap_or(0),
                        "security": node.method,
                    }]
                }]
            },
            "streamSettings": {
                "network": node.network,
                "security": if node.tls { "tls" } else { "none" },
                "wsSettings": {
                    "path": node.path,
                    "headers": { "Host": node.host }
                },
                "tlsSettings": {
                    "serverName": if node.host.is_empty() { &node.hostname } else { &node.host },
                    "allowInsecure": node.skip_cert_verify.unwrap_or(false),
                }
            }
        }
    });

    // Re-writing the same path with the same content is expected and safe
    fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).map_err(|e| {
        Error::Io {
            path: config_path.display().to_string(),
            message: e.to_string(),
        }
    })?;

    let mut b = LineBuilder::new();
    b.kv("exec", format!("\"{}\"", portable_home(&ext.v2ray_bin_path)));
    b.kv("args", "\"--config\"");
    b.kv(
        "args",
        format!("\"{}\"", portable_home(&config_path.display().to_string())),
    );
    b.kv("local-port", local_port);
    Ok(format!(
        "{} = external, {}",
        display_name(&node.name),
        b.build()
    ))
}

fn https_line(node: &HttpsNode) -> String {
    let mut b = LineBuilder::new();
    b.push(node.hostname.clone())
        .push(node.port.to_string())
        .push(node.username.clone())
        .push(node.password.clone());
    b.kv_bool("tls13", node.tls13);
    b.kv_bool("skip-cert-verify", node.skip_cert_verify);
    format!("{} = https, {}", display_name(&node.name), b.build())
}

fn snell_line(node: &SnellNode) -> String {
    let mut b = LineBuilder::new();
    b.push(node.hostname.clone())
        .push(node.port.to_string())
        .kv("psk", &node.psk);
    b.kv_opt("obfs", node.obfs.as_deref());
    b.kv_opt("obfs-host", node.obfs_host.as_deref());
    format!("{} = snell, {}", display_name(&node.name), b.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ss_node() -> ShadowsocksNode {
        ShadowsocksNode {
            name: "HK 1".to_string(),
            hostname: "hk.example.com".to_string(),
            port: 8388,
            method: "aes-256-gcm".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ss_native_omits_unset_flags() {
        let line = ss_native_line(&ss_node());
        assert_eq!(
            line,
            "HK 1 = ss, hk.example.com, 8388, encrypt-method=aes-256-gcm, password=pw"
        );
        assert!(!line.contains("udp-relay"));
    }

    #[test]
    fn test_ss_obfs_and_explicit_false_udp() {
        let mut node = ss_node();
        node.obfs = Some(SsObfs::Http);
        node.obfs_host = Some("bing.com".to_string());
        node.udp_relay = Some(false);
        let line = ss_native_line(&node);
        assert!(line.contains("obfs=http, obfs-host=bing.com"));
        assert!(line.ends_with("udp-relay=false"));
    }

    #[test]
    fn test_ws_shadowsocks_is_dropped() {
        let mut node = ss_node();
        node.obfs = Some(SsObfs::Wss);
        let out = proxy_to_surge(
            &[NodeConfig::Shadowsocks(node)],
            None,
            &ExtraSettings::default(),
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_ssr_requires_binary_path() {
        let node = ShadowsocksRNode {
            name: "SSR".to_string(),
            hostname: "ssr.example.com".to_string(),
            port: 443,
            method: "chacha20".to_string(),
            password: "pw".to_string(),
            protocol: "origin".to_string(),
            obfs: "plain".to_string(),
            ..Default::default()
        };
        let err = proxy_to_surge(
            &[NodeConfig::ShadowsocksR(node)],
            None,
            &ExtraSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("SSR"));
    }

    #[test]
    fn test_ssr_emits_addresses_for_each_resolved_ip() {
        let node = ShadowsocksRNode {
            name: "SSR".to_string(),
            hostname: "ssr.example.com".to_string(),
            port: 443,
            method: "chacha20".to_string(),
            password: "pw".to_string(),
            protocol: "origin".to_string(),
            obfs: "plain".to_string(),
            bin_path: Some("/usr/local/bin/ssr-local".to_string()),
            hostname_ip: Some(vec!["1.1.1.1".to_string(), "2.2.2.2".to_string()]),
            ..Default::default()
        };
        let line = ssr_external_line(&node, &ExtraSettings::default()).unwrap();
        assert!(line.contains("addresses=1.1.1.1"));
        assert!(line.contains("addresses=2.2.2.2"));
        assert!(line.contains("addresses=ssr.example.com"));
        assert!(line.starts_with("SSR = external, exec = \"/usr/local/bin/ssr-local\""));
    }

    #[test]
    fn test_vmess_native_line() {
        let node = VmessNode {
            name: "VM".to_string(),
            hostname: "vm.example.com".to_string(),
            port: 443,
            uuid: "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a".to_string(),
            alter_id: "0".to_string(),
            method: "auto".to_string(),
            network: "ws".to_string(),
            host: "cdn.example.com".to_string(),
            path: "/ws".to_string(),
            tls: true,
            surge_native: Some(true),
            ..Default::default()
        };
        let line = vmess_native_line(&node);
        assert!(line.starts_with("VM = vmess, vm.example.com, 443, username=2f1f54b4"));
        assert!(line.contains("ws=true, ws-path=/ws, ws-headers=Host:cdn.example.com"));
        assert!(line.contains("tls=true"));
        assert!(!line.contains("skip-cert-verify"));
    }

    #[test]
    fn test_vmess_external_writes_config_and_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let ext = ExtraSettings {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let node = VmessNode {
            name: "VM Ext".to_string(),
            hostname: "vm.example.com".to_string(),
            port: 443,
            uuid: "2f1f54b4-1b42-4e7f-9aa6-1e2b2d5c3f9a".to_string(),
            alter_id: "64".to_string(),
            method: "auto".to_string(),
            network: "ws".to_string(),
            path: "/".to_string(),
            ..Default::default()
        };
        let line = vmess_external_line(&node, &ext).unwrap();
        let config_path = dir.path().join("VM_Ext.json");
        assert!(config_path.exists());
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
        assert_eq!(
            written["outbound"]["settings"]["vnext"][0]["users"][0]["alterId"],
            64
        );
        assert!(line.contains("--config"));
        // writing the same node twice is idempotent
        vmess_external_line(&node, &ext).unwrap();
    }

    #[test]
    fn test_disabled_node_never_reaches_output() {
        let mut node = ss_node();
        node.enable = Some(false);
        let out = proxy_to_surge(
            &[NodeConfig::Shadowsocks(node)],
            None,
            &ExtraSettings::default(),
        )
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_comma_in_name_is_sanitized() {
        let mut node = ss_node();
        node.name = "HK, Express".to_string();
        let line = ss_native_line(&node);
        assert!(line.starts_with("HK_ Express = ss,"));
    }
}
