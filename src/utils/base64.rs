use base64::{engine::general_purpose, Engine as _};

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Decodes a Base64 string to its original form.
///
/// Returns an empty string when the input is not valid Base64.
pub fn base64_decode(input: &str) -> String {
    match general_purpose::STANDARD.decode(input.trim()) {
        Ok(decoded) => String::from_utf8_lossy(&decoded).to_string(),
        Err(_) => String::new(),
    }
}

/// Converts a Base64 string to URL-safe Base64 by character substitution,
/// dropping padding.
pub fn url_safe_base64_apply(input: &str) -> String {
    input.replace('+', "-").replace('/', "_").replace('=', "")
}

/// Reverses URL-safe Base64 back to the standard alphabet.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Decodes a URL-safe Base64 string, falling back to the standard alphabet
/// when the input is not URL-safe. Whitespace and missing padding are
/// tolerated, since subscription payloads carry both alphabets with and
/// without padding.
pub fn url_safe_base64_decode(input: &str) -> String {
    let normalized = url_safe_base64_reverse(input.trim());
    let padded = match normalized.len() % 4 {
        2 => format!("{}==", normalized),
        3 => format!("{}=", normalized),
        _ => normalized,
    };
    match general_purpose::STANDARD.decode(padded.as_bytes()) {
        Ok(decoded) => String::from_utf8_lossy(&decoded).to_string(),
        Err(_) => String::new(),
    }
}

/// Encodes a string to URL-safe Base64 format without padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    url_safe_base64_apply(&base64_encode(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        assert_eq!(base64_decode(&base64_encode("hello")), "hello");
        assert_eq!(url_safe_base64_decode(&url_safe_base64_encode("hello")), "hello");
    }

    #[test]
    fn test_url_safe_strips_padding() {
        // "aes-256-gcm:pwd" encodes with a '+'-free body but padding
        let encoded = url_safe_base64_encode("aes-256-gcm:pwd");
        assert!(!encoded.contains('='));
        assert_eq!(url_safe_base64_decode(&encoded), "aes-256-gcm:pwd");
    }

    #[test]
    fn test_url_safe_decode_accepts_standard_alphabet() {
        let standard = base64_encode("subject?/data+more");
        assert!(standard.contains('+') || standard.contains('/'));
        assert_eq!(url_safe_base64_decode(&standard), "subject?/data+more");
    }

    #[test]
    fn test_invalid_input_yields_empty() {
        assert_eq!(base64_decode("!!not base64!!"), "");
        assert_eq!(url_safe_base64_decode("!!not base64!!"), "");
    }
}
