use std::fs;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn, LevelFilter};
use serde::Deserialize;

use subforge::generator::config::formats::{
    clash, mellow, quan, quanx, ss_sub, ssr_sub, surge, v2ray,
};
use subforge::models::ExtraSettings;
use subforge::utils::HttpFetcher;
use subforge::{
    build_proxy_group, fetch_nodes, ConfigCache, Error, FilterSpec, GroupOptions, NodeConfig,
    ProxyGroupType, Result, Subscription,
};

/// Convert proxy subscriptions into client configurations.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the profile JSON
    profile: PathBuf,

    /// Directory the generated artifacts are written into
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Increase log verbosity
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
struct Profile {
    subscriptions: Vec<Subscription>,
    #[serde(default)]
    filter: Option<FilterSpec>,
    #[serde(default)]
    groups: Vec<GroupEntry>,
    targets: Vec<String>,
    #[serde(default)]
    settings: ProfileSettings,
    /// Subscription cache max-age in seconds
    #[serde(default = "default_cache_ttl")]
    cache_ttl: u64,
}

fn default_cache_ttl() -> u64 {
    600
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    name: String,
    #[serde(rename = "type")]
    group_type: String,
    #[serde(default)]
    existing_proxies: Option<Vec<String>>,
    #[serde(default)]
    filter: Option<FilterSpec>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    interval: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileSettings {
    #[serde(default)]
    udp_relay: Option<bool>,
    #[serde(default)]
    surge_ssr_path: Option<String>,
    #[serde(default)]
    v2ray_bin_path: Option<String>,
    #[serde(default)]
    public_url: Option<String>,
}

impl ProfileSettings {
    fn to_extra(&self) -> ExtraSettings {
        let mut ext = ExtraSettings {
            udp_relay: self.udp_relay,
            ..Default::default()
        };
        if let Some(path) = &self.surge_ssr_path {
            ext.surge_ssr_path = path.clone();
        }
        if let Some(path) = &self.v2ray_bin_path {
            ext.v2ray_bin_path = path.clone();
        }
        if let Some(url) = &self.public_url {
            ext.public_url = url.clone();
        }
        ext
    }
}

fn run(args: &Args) -> Result<()> {
    let raw = fs::read_to_string(&args.profile).map_err(|e| Error::Io {
        path: args.profile.display().to_string(),
        message: e.to_string(),
    })?;
    let profile: Profile = serde_json::from_str(&raw)
        .map_err(|e| Error::Configuration(format!("invalid profile: {}", e)))?;

    let ext = profile.settings.to_extra();
    let cache = ConfigCache::new(Duration::from_secs(profile.cache_ttl));
    let fetcher = HttpFetcher::default();

    // A malformed subscription loses only itself; the rest of the run
    // continues.
    let mut nodes: Vec<NodeConfig> = Vec::new();
    for sub in &profile.subscriptions {
        match fetch_nodes(&fetcher, &cache, sub) {
            Ok(batch) => nodes.extend(batch),
            Err(e @ Error::Configuration(_)) => return Err(e),
            Err(e) => warn!("subscription '{}' skipped: {}", sub.name, e),
        }
    }
    info!("decoded {} node(s) in total", nodes.len());

    let filter = profile.filter.as_ref().map(|f| f.compile()).transpose()?;

    let mut groups = Vec::new();
    for entry in &profile.groups {
        let group_type = ProxyGroupType::from_name(&entry.group_type).ok_or_else(|| {
            Error::Configuration(format!(
                "group '{}' has unknown type '{}'",
                entry.name, entry.group_type
            ))
        })?;
        let group_filter = entry.filter.as_ref().map(|f| f.compile()).transpose()?;
        groups.push(build_proxy_group(
            &entry.name,
            group_type,
            &nodes,
            GroupOptions {
                existing_proxies: entry.existing_proxies.clone(),
                filter: group_filter.as_ref(),
                url: entry.url.clone(),
                interval: entry.interval,
            },
        ));
    }

    fs::create_dir_all(&args.output).map_err(|e| Error::Io {
        path: args.output.display().to_string(),
        message: e.to_string(),
    })?;

    for target in &profile.targets {
        let (file_name, content) = match target.as_str() {
            "surge" => ("surge.conf", surge::proxy_to_surge(&nodes, filter.as_ref(), &ext)?),
            "clash" => (
                "clash.yaml",
                clash::proxy_to_clash(&nodes, filter.as_ref(), &groups, &ext)?,
            ),
            "quan" => ("quan.txt", quan::proxy_to_quan_sub(&nodes, filter.as_ref(), &ext)?),
            "quanx" => ("quanx.conf", quanx::proxy_to_quanx(&nodes, filter.as_ref(), &ext)?),
            "mellow" => ("mellow.conf", mellow::proxy_to_mellow(&nodes, filter.as_ref())?),
            "v2rayn" => ("v2rayn.txt", v2ray::proxy_to_v2rayn_sub(&nodes, filter.as_ref())?),
            "ss" => ("ss.txt", ss_sub::proxy_to_ss_sub_b64(&nodes, filter.as_ref())?),
            "ss-json" => ("ss.json", ss_sub::proxy_to_ss_json(&nodes, filter.as_ref())?),
            "ssr" => ("ssr.txt", ssr_sub::proxy_to_ssr_sub_b64(&nodes, filter.as_ref())?),
            other => {
                return Err(Error::Configuration(format!("unknown target '{}'", other)));
            }
        };
        let path = args.output.join(file_name);
        fs::write(&path, content).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        exit(1);
    }
}
