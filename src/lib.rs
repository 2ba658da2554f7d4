pub mod cache;
pub mod error;
pub mod filter;
pub mod generator;
pub mod models;
pub mod parser;
pub mod utils;

// Re-export the main types for easier access
pub use cache::ConfigCache;
pub use error::{Error, Result};
pub use filter::{apply_filter, build_proxy_group, FilterSpec, GroupOptions, NodeFilter};
pub use models::{ExtraSettings, NodeConfig, ProxyGroupConfig, ProxyGroupType};
pub use parser::{fetch_nodes, Subscription, SubscriptionKind};
