//! Attribute-list codec for `key=value;key2=value2` option strings.
//!
//! Used for SIP002 `plugin` parameters and provider `plugin_opts` fields. A
//! bare key with no `=value` is truthy. The encoder is lossy by design: a
//! `"true"` value is re-emitted as a bare key.

use linked_hash_map::LinkedHashMap;

/// Parses an attribute list, preserving key order.
pub fn parse_attributes(input: &str) -> LinkedHashMap<String, String> {
    let mut map = LinkedHashMap::new();
    for token in input.split(';') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.find('=') {
            Some(pos) => {
                map.insert(token[..pos].to_string(), token[pos + 1..].to_string());
            }
            None => {
                map.insert(token.to_string(), "true".to_string());
            }
        }
    }
    map
}

/// Encodes an attribute list in insertion order.
pub fn encode_attributes(attrs: &LinkedHashMap<String, String>) -> String {
    attrs
        .iter()
        .map(|(key, value)| {
            if value == "true" {
                key.clone()
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order_and_bare_keys() {
        let attrs = parse_attributes("v2ray-plugin;tls;host=cdn.example.com");
        let keys: Vec<&String> = attrs.keys().collect();
        assert_eq!(keys, ["v2ray-plugin", "tls", "host"]);
        assert_eq!(attrs.get("tls").map(String::as_str), Some("true"));
        assert_eq!(
            attrs.get("host").map(String::as_str),
            Some("cdn.example.com")
        );
    }

    #[test]
    fn test_parse_skips_empty_tokens() {
        let attrs = parse_attributes("obfs=http;;obfs-host=example.com;");
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_encode_is_lossy_on_truthy_values() {
        let attrs = parse_attributes("obfs-local;obfs=tls");
        assert_eq!(encode_attributes(&attrs), "obfs-local;obfs=tls");
    }
}
