//! Rule-line translation between client dialects.
//!
//! Inputs are Surge-style rule lines; each filter maps a whole multi-line
//! text to the target's dialect. Blank lines and `#` comments pass through
//! untouched.

use std::collections::HashSet;

use lazy_static::lazy_static;
use log::warn;
use url::Url;

lazy_static! {
    static ref CLASH_UNSUPPORTED: HashSet<&'static str> =
        ["URL-REGEX", "USER-AGENT", "PROCESS-NAME"].into_iter().collect();
    static ref MELLOW_UNSUPPORTED: HashSet<&'static str> =
        ["URL-REGEX", "USER-AGENT", "PROCESS-NAME", "DEST-PORT", "SRC-IP"]
            .into_iter()
            .collect();
    static ref QUANX_SUPPORTED: Vec<&'static str> = vec![
        "DOMAIN",
        "DOMAIN-SUFFIX",
        "DOMAIN-KEYWORD",
        "HOST",
        "HOST-SUFFIX",
        "HOST-KEYWORD",
        "IP-CIDR",
        "IP6-CIDR",
        "GEOIP",
        "USER-AGENT",
        "FINAL",
    ];
}

/// Strip the `,no-resolve` suffix and any trailing `//` comment.
fn strip_decorations(line: &str) -> String {
    let line = match line.find("//") {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    };
    line.replace(",no-resolve", "").trim_end().to_string()
}

fn is_passthrough(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Clash dialect: drop unsupported rule types, strip decorations, and
/// prefix every surviving rule with the YAML list marker.
pub fn convert_rules_to_clash(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if is_passthrough(line) {
            out.push(line.to_string());
            continue;
        }
        let upper = line.to_uppercase();
        if CLASH_UNSUPPORTED.iter().any(|p| upper.starts_with(p)) {
            continue;
        }
        out.push(format!("- {}", strip_decorations(line)));
    }
    out.join("\n")
}

/// Mellow dialect: same stripping as Clash, no list marker.
pub fn convert_rules_to_mellow(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if is_passthrough(line) {
            out.push(line.to_string());
            continue;
        }
        let upper = line.to_uppercase();
        if MELLOW_UNSUPPORTED.iter().any(|p| upper.starts_with(p)) {
            continue;
        }
        out.push(strip_decorations(line));
    }
    out.join("\n")
}

/// QuantumultX dialect: keep only rule types the client understands; a
/// Surge script-response rule is rewritten into a remote-rewrite rule
/// instead of passed through.
pub fn convert_rules_to_quanx(text: &str, public_url: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if is_passthrough(line) {
            out.push(line.to_string());
            continue;
        }
        if let Some(rewritten) = convert_surge_script_rule(line, public_url) {
            out.push(rewritten);
            continue;
        }
        let upper = line.to_uppercase();
        if QUANX_SUPPORTED.iter().any(|p| upper.starts_with(p)) {
            out.push(strip_decorations(line));
        }
    }
    out.join("\n")
}

/// Rewrite `<pattern> http-response <attrs>` into a QuantumultX
/// `script-response-body` rule pointing at this service's `/qx-script`
/// callback. Any other rule type yields nothing.
pub fn convert_surge_script_rule(line: &str, public_url: &str) -> Option<String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 || tokens[1] != "http-response" {
        return None;
    }
    let pattern = tokens[0];
    let attrs = tokens[2..].join(" ");
    let script_path = attrs
        .split(',')
        .map(str::trim)
        .find_map(|attr| attr.strip_prefix("script-path="))?;

    let mut callback = match Url::parse(public_url) {
        Ok(url) => url,
        Err(e) => {
            warn!("invalid public url '{}': {}", public_url, e);
            return None;
        }
    };
    callback.set_path("/qx-script");
    callback
        .query_pairs_mut()
        .clear()
        .append_pair("url", script_path);

    Some(format!("{} url script-response-body {}", pattern, callback))
}

/// Extract Surge URL-rewrite redirections.
///
/// Splits each line on whitespace, discards the `hostname` directive, and
/// keeps exactly-4-token tuples of the form `<pattern> url <302|307>
/// <target>`, re-emitted as `<pattern> <target> <code>`.
pub fn extract_url_rewrite(text: &str) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.first() == Some(&"hostname") {
            continue;
        }
        if tokens.len() == 4 && tokens[1] == "url" && (tokens[2] == "302" || tokens[2] == "307") {
            out.push(format!("{} {} {}", tokens[0], tokens[3], tokens[2]));
        }
    }
    out.join("\n")
}
