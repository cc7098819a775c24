//! Path and query encoding shared by the matcher and reverse router.

use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escape a value substituted for a `:name` placeholder.
pub fn encode_segment(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, SEGMENT).into()
}

/// Escape a value substituted for a `*name` catch-all; `/` is kept.
pub fn encode_catch_all(value: &str) -> String {
    value
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode a raw request path before matching.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Form-encode leftover arguments, keys in sorted order.
pub fn encode_query(args: &BTreeMap<String, String>) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(args.iter())
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_escapes_separators() {
        assert_eq!(encode_segment("a b/c?d"), "a%20b%2Fc%3Fd");
        assert_eq!(encode_segment("plain-value_1"), "plain-value_1");
    }

    #[test]
    fn test_catch_all_keeps_slashes() {
        assert_eq!(encode_catch_all("css/site main.css"), "css/site%20main.css");
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/users/j%C3%BCrgen"), "/users/jürgen");
        assert_eq!(decode_path("/a%20b"), "/a b");
    }

    #[test]
    fn test_query_sorted_and_escaped() {
        let mut args = BTreeMap::new();
        args.insert("sort".to_string(), "asc".to_string());
        args.insert("q".to_string(), "a b&c".to_string());
        assert_eq!(encode_query(&args), "q=a+b%26c&sort=asc");
    }
}
