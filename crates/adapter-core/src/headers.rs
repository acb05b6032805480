//! Parsing of caller-supplied custom header strings.

use tracing::warn;

use crate::ports::CustomHeaders;

/// Parse `"key1:value1,key2:value2"` into a header map.
///
/// Every comma-separated item must contain exactly one `:`. Keys and values
/// are trimmed and a repeated key keeps its last value. Empty input yields
/// `None`, and so does malformed input: a bad header string degrades to "no
/// custom headers" instead of failing the request.
pub fn parse_custom_headers(raw: Option<&str>) -> Option<CustomHeaders> {
    let raw = raw.filter(|s| !s.is_empty())?;

    let mut headers = CustomHeaders::new();
    for item in raw.split(',') {
        let mut parts = item.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
            _ => {
                warn!(item = %item, "Failed to parse custom headers, using defaults");
                return None;
            }
        }
    }
    Some(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_kept_for_the_transport_to_skip() {
        let headers = parse_custom_headers(Some(":v,b:2")).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[""], "v");
        assert_eq!(headers["b"], "2");
    }

    #[test]
    fn test_parses_pairs() {
        let headers = parse_custom_headers(Some("a:1,b:2")).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["a"], "1");
        assert_eq!(headers["b"], "2");
    }

    #[test]
    fn test_trims_and_last_duplicate_wins() {
        let headers = parse_custom_headers(Some(" X-Token : abc , X-Token:def ")).unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["X-Token"], "def");
    }

    #[test]
    fn test_malformed_item_yields_none() {
        assert_eq!(parse_custom_headers(Some("a1,b:2")), None);
        assert_eq!(parse_custom_headers(Some("a:1:2")), None);
        assert_eq!(parse_custom_headers(Some("a:1,")), None);
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert_eq!(parse_custom_headers(None), None);
        assert_eq!(parse_custom_headers(Some("")), None);
    }
}
