//! URL encoding/decoding utilities.

/// Encodes a string using URL percent-encoding.
pub fn url_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Decodes a URL-encoded string, returning the original string when
/// decoding fails.
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        assert_eq!(url_decode(&url_encode("Hong Kong #1")), "Hong Kong #1");
    }

    #[test]
    fn test_decode_passes_invalid_through() {
        assert_eq!(url_decode("100%legit"), "100%legit");
    }
}
