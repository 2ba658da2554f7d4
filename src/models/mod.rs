//! Core data models.
//!
//! Pure data plus invariants, separated from the decoders and serializers
//! that operate on them.

mod extra_settings;
mod group;
mod node;

pub use extra_settings::ExtraSettings;
pub use group::{ProxyGroupConfig, ProxyGroupConfigs, ProxyGroupType};
pub use node::{
    HttpsNode, NodeConfig, ShadowsocksNode, ShadowsocksRNode, SnellNode, SsObfs, VmessNode,
};
