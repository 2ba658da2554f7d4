//! Canonical node model.
//!
//! Every decoder normalizes into [`NodeConfig`]; every serializer matches
//! exhaustively over it. Optional boolean fields are tri-state: `None` means
//! the source never specified the flag, and serializers must omit it rather
//! than defaulting it.

/// Transport obfuscation attached to a Shadowsocks node.
///
/// `Http`/`Tls` describe a simple-obfs (`obfs-local`) wrapper, `Ws`/`Wss` a
/// v2ray-plugin websocket wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsObfs {
    Http,
    Tls,
    Ws,
    Wss,
}

impl SsObfs {
    pub fn as_str(self) -> &'static str {
        match self {
            SsObfs::Http => "http",
            SsObfs::Tls => "tls",
            SsObfs::Ws => "ws",
            SsObfs::Wss => "wss",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "http" => Some(SsObfs::Http),
            "tls" => Some(SsObfs::Tls),
            "ws" => Some(SsObfs::Ws),
            "wss" => Some(SsObfs::Wss),
            _ => None,
        }
    }

    /// Whether this obfs mode requires the v2ray-plugin wrapper.
    pub fn is_websocket(self) -> bool {
        matches!(self, SsObfs::Ws | SsObfs::Wss)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowsocksNode {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub enable: Option<bool>,
    pub method: String,
    pub password: String,
    pub obfs: Option<SsObfs>,
    pub obfs_host: Option<String>,
    pub obfs_uri: Option<String>,
    pub udp_relay: Option<bool>,
    /// Surge only: emit the `external` binary form instead of native `ss`.
    pub surge_external: Option<bool>,
    /// Local listen port used by the Surge external form.
    pub local_port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadowsocksRNode {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub enable: Option<bool>,
    pub method: String,
    pub password: String,
    pub protocol: String,
    pub protocol_param: String,
    pub obfs: String,
    pub obfs_param: String,
    /// Path to the ssr-local binary, required by external-process targets.
    pub bin_path: Option<String>,
    pub local_port: Option<u16>,
    /// Pre-resolved addresses emitted alongside the hostname on external
    /// lines.
    pub hostname_ip: Option<Vec<String>>,
    pub udp_relay: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmessNode {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub enable: Option<bool>,
    pub uuid: String,
    /// Kept as the source string so round-trip outputs re-emit it as given.
    pub alter_id: String,
    pub method: String,
    pub network: String,
    pub host: String,
    pub path: String,
    pub tls: bool,
    pub skip_cert_verify: Option<bool>,
    pub tls13: Option<bool>,
    pub udp_relay: Option<bool>,
    /// Surge only: emit native `vmess` syntax instead of the external
    /// v2ray-core form.
    pub surge_native: Option<bool>,
    pub local_port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpsNode {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub enable: Option<bool>,
    pub username: String,
    pub password: String,
    pub tls13: Option<bool>,
    pub skip_cert_verify: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnellNode {
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub enable: Option<bool>,
    pub psk: String,
    pub obfs: Option<String>,
    pub obfs_host: Option<String>,
}

/// A single proxy node in canonical form.
///
/// The discriminant is fixed at construction; serializers match exhaustively
/// so an added variant fails compilation in every target rather than being
/// silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    Shadowsocks(ShadowsocksNode),
    ShadowsocksR(ShadowsocksRNode),
    Vmess(VmessNode),
    Https(HttpsNode),
    Snell(SnellNode),
}

impl NodeConfig {
    pub fn name(&self) -> &str {
        match self {
            NodeConfig::Shadowsocks(n) => &n.name,
            NodeConfig::ShadowsocksR(n) => &n.name,
            NodeConfig::Vmess(n) => &n.name,
            NodeConfig::Https(n) => &n.name,
            NodeConfig::Snell(n) => &n.name,
        }
    }

    pub fn hostname(&self) -> &str {
        match self {
            NodeConfig::Shadowsocks(n) => &n.hostname,
            NodeConfig::ShadowsocksR(n) => &n.hostname,
            NodeConfig::Vmess(n) => &n.hostname,
            NodeConfig::Https(n) => &n.hostname,
            NodeConfig::Snell(n) => &n.hostname,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            NodeConfig::Shadowsocks(n) => n.port,
            NodeConfig::ShadowsocksR(n) => n.port,
            NodeConfig::Vmess(n) => n.port,
            NodeConfig::Https(n) => n.port,
            NodeConfig::Snell(n) => n.port,
        }
    }

    /// Absence of the `enable` flag means the node is enabled.
    pub fn enabled(&self) -> bool {
        let enable = match self {
            NodeConfig::Shadowsocks(n) => n.enable,
            NodeConfig::ShadowsocksR(n) => n.enable,
            NodeConfig::Vmess(n) => n.enable,
            NodeConfig::Https(n) => n.enable,
            NodeConfig::Snell(n) => n.enable,
        };
        enable.unwrap_or(true)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NodeConfig::Shadowsocks(_) => "shadowsocks",
            NodeConfig::ShadowsocksR(_) => "shadowsocksr",
            NodeConfig::Vmess(_) => "vmess",
            NodeConfig::Https(_) => "https",
            NodeConfig::Snell(_) => "snell",
        }
    }
}
