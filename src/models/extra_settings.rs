//! Settings for subscription export operations.

use std::path::PathBuf;

/// Per-run export knobs shared by every serializer.
#[derive(Debug, Clone)]
pub struct ExtraSettings {
    /// UDP relay override applied when a node leaves it unspecified.
    pub udp_relay: Option<bool>,
    /// Path to the ssr-local binary for Surge external lines.
    pub surge_ssr_path: String,
    /// Path to the v2ray binary for Surge external VMess lines.
    pub v2ray_bin_path: String,
    /// Path to the ss-local binary for Surge external Shadowsocks lines.
    pub ss_local_path: String,
    /// Public base URL of this service, used for QuantumultX script
    /// callbacks.
    pub public_url: String,
    /// User-Agent baked into Quantumult websocket obfs headers.
    pub quan_user_agent: String,
    /// Overrides the default `~/.config/subforge` side-config directory.
    pub config_dir: Option<PathBuf>,
}

impl Default for ExtraSettings {
    fn default() -> Self {
        ExtraSettings {
            udp_relay: None,
            surge_ssr_path: String::new(),
            v2ray_bin_path: "/usr/local/bin/v2ray".to_string(),
            ss_local_path: "/usr/local/bin/ss-local".to_string(),
            public_url: "http://127.0.0.1:8080/".to_string(),
            quan_user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 13_3 like Mac OS X) \
                              AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148"
                .to_string(),
            config_dir: None,
        }
    }
}
