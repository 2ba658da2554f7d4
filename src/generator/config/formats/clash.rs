//! Clash serializer. Emits structured YAML objects, not text lines.

use log::warn;
use serde_yaml::{Mapping, Value};

use crate::error::Result;
use crate::filter::{apply_filter, NodeFilter};
use crate::models::{ExtraSettings, NodeConfig, ProxyGroupConfig, SsObfs};

fn kv(map: &mut Mapping, key: &str, value: Value) {
    map.insert(Value::String(key.to_string()), value);
}

fn s(value: &str) -> Value {
    Value::String(value.to_string())
}

/// Convert nodes into Clash proxy mappings.
pub fn clash_proxy_objects(
    nodes: &[NodeConfig],
    filter: Option<&NodeFilter>,
    ext: &ExtraSettings,
) -> Vec<Value> {
    let mut proxies = Vec::new();
    for node in apply_filter(nodes, filter) {
        let mut proxy = Mapping::new();
        kv(&mut proxy, "name", s(node.name()));
        match &node {
            NodeConfig::Shadowsocks(ss) => {
                kv(&mut proxy, "type", s("ss"));
                kv(&mut proxy, "server", s(&ss.hostname));
                kv(&mut proxy, "port", Value::Number(ss.port.into()));
                kv(&mut proxy, "cipher", s(&ss.method));
                kv(&mut proxy, "password", s(&ss.password));
                if let Some(udp) = ss.udp_relay.or(ext.udp_relay) {
                    kv(&mut proxy, "udp", Value::Bool(udp));
                }
                if let Some(obfs) = ss.obfs {
                    let mut opts = Mapping::new();
                    if obfs.is_websocket() {
                        kv(&mut proxy, "plugin", s("v2ray-plugin"));
                        kv(&mut opts, "mode", s("websocket"));
                        // tls is set iff the wrapper is wss
                        kv(&mut opts, "tls", Value::Bool(obfs == SsObfs::Wss));
                        if let Some(host) = &ss.obfs_host {
                            kv(&mut opts, "host", s(host));
                        }
                        if let Some(path) = &ss.obfs_uri {
                            kv(&mut opts, "path", s(path));
                        }
                    } else {
                        kv(&mut proxy, "plugin", s("obfs"));
                        kv(&mut opts, "mode", s(obfs.as_str()));
                        if let Some(host) = &ss.obfs_host {
                            kv(&mut opts, "host", s(host));
                        }
                    }
                    kv(&mut proxy, "plugin-opts", Value::Mapping(opts));
                }
            }
            NodeConfig::ShadowsocksR(ssr) => {
                kv(&mut proxy, "type", s("ssr"));
                kv(&mut proxy, "server", s(&ssr.hostname));
                kv(&mut proxy, "port", Value::Number(ssr.port.into()));
                kv(&mut proxy, "cipher", s(&ssr.method));
                kv(&mut proxy, "password", s(&ssr.password));
                kv(&mut proxy, "protocol", s(&ssr.protocol));
                kv(&mut proxy, "protocol-param", s(&ssr.protocol_param));
                kv(&mut proxy, "obfs", s(&ssr.obfs));
                kv(&mut proxy, "obfs-param", s(&ssr.obfs_param));
                if let Some(udp) = ssr.udp_relay.or(ext.udp_relay) {
                    kv(&mut proxy, "udp", Value::Bool(udp));
                }
            }
            NodeConfig::Vmess(vmess) => {
                kv(&mut proxy, "type", s("vmess"));
                kv(&mut proxy, "server", s(&vmess.hostname));
                kv(&mut proxy, "port", Value::Number(vmess.port.into()));
                kv(&mut proxy, "uuid", s(&vmess.uuid));
                kv(
                    &mut proxy,
                    "alterId",
                    Value::Number(vmess.alter_id.parse::<u64>().unwrap_or(0).into()),
                );
                kv(&mut proxy, "cipher", s(&vmess.method));
                if vmess.tls {
                    kv(&mut proxy, "tls", Value::Bool(true));
                }
                if let Some(scv) = vmess.skip_cert_verify {
                    kv(&mut proxy, "skip-cert-verify", Value::Bool(scv));
                }
                if vmess.network != "tcp" {
                    kv(&mut proxy, "network", s(&vmess.network));
                }
                if vmess.network == "ws" {
                    kv(&mut proxy, "ws-path", s(&vmess.path));
                    // omitted entirely when no custom host is set
                    if !vmess.host.is_empty() {
                        let mut headers = Mapping::new();
                        kv(&mut headers, "Host", s(&vmess.host));
                        kv(&mut proxy, "ws-headers", Value::Mapping(headers));
                    }
                }
                if let Some(udp) = vmess.udp_relay.or(ext.udp_relay) {
                    kv(&mut proxy, "udp", Value::Bool(udp));
                }
            }
            NodeConfig::Https(https) => {
                kv(&mut proxy, "type", s("http"));
                kv(&mut proxy, "server", s(&https.hostname));
                kv(&mut proxy, "port", Value::Number(https.port.into()));
                kv(&mut proxy, "username", s(&https.username));
                kv(&mut proxy, "password", s(&https.password));
                kv(&mut proxy, "tls", Value::Bool(true));
                if let Some(scv) = https.skip_cert_verify {
                    kv(&mut proxy, "skip-cert-verify", Value::Bool(scv));
                }
            }
            NodeConfig::Snell(snell) => {
                kv(&mut proxy, "type", s("snell"));
                kv(&mut proxy, "server", s(&snell.hostname));
                kv(&mut proxy, "port", Value::Number(snell.port.into()));
                kv(&mut proxy, "psk", s(&snell.psk));
                if let Some(obfs) = &snell.obfs {
                    let mut opts = Mapping::new();
                    kv(&mut opts, "mode", s(obfs));
                    if let Some(host) = &snell.obfs_host {
                        kv(&mut opts, "host", s(host));
                    }
                    kv(&mut proxy, "obfs-opts", Value::Mapping(opts));
                }
            }
        }
        proxies.push(Value::Mapping(proxy));
    }
    if proxies.is_empty() {
        warn!("clash output contains no proxies");
    }
    proxies
}

/// Convert proxy groups into Clash group mappings.
pub fn clash_group_objects(groups: &[ProxyGroupConfig]) -> Vec<Value> {
    let mut out = Vec::new();
    for group in groups {
        let mut mapping = Mapping::new();
        kv(&mut mapping, "name", s(&group.name));
        kv(&mut mapping, "type", s(group.group_type.as_str()));
        kv(
            &mut mapping,
            "proxies",
            Value::Sequence(group.proxies.iter().map(|p| s(p)).collect()),
        );
        if let Some(url) = &group.url {
            kv(&mut mapping, "url", s(url));
        }
        if let Some(interval) = group.interval {
            kv(&mut mapping, "interval", Value::Number(interval.into()));
        }
        out.push(Value::Mapping(mapping));
    }
    out
}

/// Render a full `proxies` + `proxy-groups` document as YAML text.
pub fn proxy_to_clash(
    nodes: &[NodeConfig],
    filter: Option<&NodeFilter>,
    groups: &[ProxyGroupConfig],
    ext: &ExtraSettings,
) -> Result<String> {
    let mut doc = Mapping::new();
    kv(
        &mut doc,
        "proxies",
        Value::Sequence(clash_proxy_objects(nodes, filter, ext)),
    );
    if !groups.is_empty() {
        kv(
            &mut doc,
            "proxy-groups",
            Value::Sequence(clash_group_objects(groups)),
        );
    }
    Ok(serde_yaml::to_string(&Value::Mapping(doc)).unwrap_or_default())
}
