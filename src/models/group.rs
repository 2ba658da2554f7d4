//! Proxy group model.

/// Type of proxy group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyGroupType {
    Select,
    URLTest,
    Fallback,
    LoadBalance,
}

impl ProxyGroupType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyGroupType::Select => "select",
            ProxyGroupType::URLTest => "url-test",
            ProxyGroupType::Fallback => "fallback",
            ProxyGroupType::LoadBalance => "load-balance",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "select" => Some(ProxyGroupType::Select),
            "url-test" => Some(ProxyGroupType::URLTest),
            "fallback" => Some(ProxyGroupType::Fallback),
            "load-balance" => Some(ProxyGroupType::LoadBalance),
            _ => None,
        }
    }

    /// Whether the group polls a health-check URL. `select` groups never do.
    pub fn needs_health_check(self) -> bool {
        !matches!(self, ProxyGroupType::Select)
    }
}

/// Configuration for a proxy group.
///
/// `url`/`interval` are populated only for the health-checked group types.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyGroupConfig {
    pub name: String,
    pub group_type: ProxyGroupType,
    /// Member proxy names, pre-existing names first, in insertion order.
    pub proxies: Vec<String>,
    pub url: Option<String>,
    pub interval: Option<u32>,
}

/// A collection of proxy group configurations.
pub type ProxyGroupConfigs = Vec<ProxyGroupConfig>;
