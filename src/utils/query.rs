//! Query-string build/parse with stable key order.
//!
//! Keys are kept exactly as given (no alphabetical re-sort) and values are
//! passed through verbatim: some targets require literal `%xx` sequences to
//! survive untouched, so neither side percent-re-encodes.

/// Parses `k1=v1&k2=v2` into ordered pairs. A bare key maps to an empty
/// value.
pub fn parse_query(input: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for token in input.split('&') {
        if token.is_empty() {
            continue;
        }
        match token.find('=') {
            Some(pos) => pairs.push((token[..pos].to_string(), token[pos + 1..].to_string())),
            None => pairs.push((token.to_string(), String::new())),
        }
    }
    pairs
}

/// Builds a query string from ordered pairs without re-encoding values.
pub fn build_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{}={}", key, value)
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved() {
        let pairs = parse_query("zeta=1&alpha=2&mid=3");
        assert_eq!(
            pairs,
            vec![
                ("zeta".to_string(), "1".to_string()),
                ("alpha".to_string(), "2".to_string()),
                ("mid".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(build_query(&pairs), "zeta=1&alpha=2&mid=3");
    }

    #[test]
    fn test_encoded_values_pass_through() {
        let pairs = parse_query("plugin=obfs-local%3Bobfs%3Dhttp");
        assert_eq!(pairs[0].1, "obfs-local%3Bobfs%3Dhttp");
        assert_eq!(build_query(&pairs), "plugin=obfs-local%3Bobfs%3Dhttp");
    }
}
