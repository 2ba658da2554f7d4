//! Node filtering and proxy group construction.

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{NodeConfig, ProxyGroupConfig, ProxyGroupType};

/// Default health-check endpoint for url-test/fallback/load-balance groups.
const DEFAULT_TEST_URL: &str = "http://www.gstatic.com/generate_204";
const DEFAULT_TEST_INTERVAL: u32 = 600;

/// A validated node filter.
///
/// Either a keep/drop predicate over a single node, or a composite pass
/// over the whole sequence (which may reorder, not just keep). The variant
/// is decided once when the filter is built; call sites never duck-type.
pub enum NodeFilter {
    Predicate(Box<dyn Fn(&NodeConfig) -> bool + Send + Sync>),
    Composite(Box<dyn Fn(&[NodeConfig]) -> Vec<NodeConfig> + Send + Sync>),
}

impl std::fmt::Debug for NodeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeFilter::Predicate(_) => f.write_str("NodeFilter::Predicate(..)"),
            NodeFilter::Composite(_) => f.write_str("NodeFilter::Composite(..)"),
        }
    }
}

impl NodeFilter {
    pub fn predicate(f: impl Fn(&NodeConfig) -> bool + Send + Sync + 'static) -> Self {
        NodeFilter::Predicate(Box::new(f))
    }

    pub fn composite(f: impl Fn(&[NodeConfig]) -> Vec<NodeConfig> + Send + Sync + 'static) -> Self {
        NodeFilter::Composite(Box::new(f))
    }
}

/// Declarative filter, as it appears in a profile. Compiled into a
/// [`NodeFilter`] before any node is processed; an invalid declaration is a
/// fatal configuration error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FilterSpec {
    /// Keep nodes whose name contains any of the keywords.
    NameKeyword { keywords: Vec<String> },
    /// Keep nodes whose name matches the regex.
    NameRegex { pattern: String },
    /// Reorder the surviving nodes by name.
    SortByName,
}

impl FilterSpec {
    pub fn compile(&self) -> Result<NodeFilter> {
        match self {
            FilterSpec::NameKeyword { keywords } => {
                if keywords.is_empty() || keywords.iter().any(|k| k.is_empty()) {
                    return Err(Error::Configuration(format!(
                        "invalid filter: empty keyword in {:?}",
                        keywords
                    )));
                }
                let keywords = keywords.clone();
                Ok(NodeFilter::predicate(move |node| {
                    keywords.iter().any(|k| node.name().contains(k.as_str()))
                }))
            }
            FilterSpec::NameRegex { pattern } => {
                let re = Regex::new(pattern).map_err(|e| {
                    Error::Configuration(format!("invalid filter regex '{}': {}", pattern, e))
                })?;
                Ok(NodeFilter::predicate(move |node| re.is_match(node.name())))
            }
            FilterSpec::SortByName => Ok(NodeFilter::composite(|nodes| {
                let mut sorted = nodes.to_vec();
                sorted.sort_by(|a, b| a.name().cmp(b.name()));
                sorted
            })),
        }
    }
}

/// Applies a filter to a node sequence.
///
/// Disabled nodes (`enable == false`) are dropped first, unconditionally. A
/// predicate then restricts the enabled set in order; a composite filter is
/// handed the whole enabled set and may reorder it.
pub fn apply_filter(nodes: &[NodeConfig], filter: Option<&NodeFilter>) -> Vec<NodeConfig> {
    let enabled = nodes.iter().filter(|n| n.enabled());
    match filter {
        None => enabled.cloned().collect(),
        Some(NodeFilter::Predicate(keep)) => enabled.filter(|n| keep(n)).cloned().collect(),
        Some(NodeFilter::Composite(pass)) => {
            let enabled: Vec<NodeConfig> = enabled.cloned().collect();
            pass(&enabled)
        }
    }
}

/// Optional inputs to [`build_proxy_group`].
#[derive(Default)]
pub struct GroupOptions<'a> {
    /// Pre-existing proxy names placed ahead of any filtered candidates.
    pub existing_proxies: Option<Vec<String>>,
    pub filter: Option<&'a NodeFilter>,
    pub url: Option<String>,
    pub interval: Option<u32>,
}

/// Builds a proxy group from candidate nodes.
///
/// Member resolution takes exactly one of three branches, selected by which
/// optional inputs are present: existing proxies concatenated with the
/// filtered candidate names, the existing proxies alone, or the filtered
/// candidate names alone. Health-check url/interval are attached only for
/// group types that poll.
pub fn build_proxy_group(
    name: &str,
    group_type: ProxyGroupType,
    candidates: &[NodeConfig],
    options: GroupOptions,
) -> ProxyGroupConfig {
    let proxies = match (options.existing_proxies, options.filter) {
        (Some(existing), Some(filter)) => {
            let mut members = existing;
            members.extend(
                apply_filter(candidates, Some(filter))
                    .iter()
                    .map(|n| n.name().to_string()),
            );
            members
        }
        (Some(existing), None) => existing,
        (None, filter) => apply_filter(candidates, filter)
            .iter()
            .map(|n| n.name().to_string())
            .collect(),
    };
    debug!("group '{}' resolved {} member(s)", name, proxies.len());

    let (url, interval) = if group_type.needs_health_check() {
        (
            Some(
                options
                    .url
                    .unwrap_or_else(|| DEFAULT_TEST_URL.to_string()),
            ),
            Some(options.interval.unwrap_or(DEFAULT_TEST_INTERVAL)),
        )
    } else {
        (None, None)
    };

    ProxyGroupConfig {
        name: name.to_string(),
        group_type,
        proxies,
        url,
        interval,
    }
}
