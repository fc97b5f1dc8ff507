//! Header names, media types and header-value parsers.
//!
//! Two negotiation flavors share these:
//! - Delta (RFC 3229 style): `A-IM`, `If-None-Match`, `IM`, `Delta-Base`
//! - Modified-since: a single `Get-Modified-Since` header holding either a
//!   quoted Version Tag or an HTTP-date

use crate::http_date::parse_http_date;
use crate::version::{decode_tag, select_latest_tag, VersionStamp};

/// Single-header baseline claim (quoted tag or HTTP-date).
pub const GET_MODIFIED_SINCE: &str = "get-modified-since";
/// Entity tags the client already holds.
pub const IF_NONE_MATCH: &str = "if-none-match";
/// Instance manipulations the client accepts.
pub const A_IM: &str = "a-im";
/// Instance manipulations applied to the response.
pub const IM: &str = "im";
/// Entity tag of the instance a delta was computed against.
pub const DELTA_BASE: &str = "delta-base";
/// Entity tag of the current instance.
pub const ETAG: &str = "etag";
/// Response media type.
pub const CONTENT_TYPE: &str = "content-type";
/// Response generation time.
pub const DATE: &str = "date";

/// Media type of a full document.
pub const MIME_JSON: &str = "application/json";
/// Media type of a patch.
pub const MIME_JSON_PATCH: &str = "application/json-patch+json";

/// Instance manipulation token for JSON Patch deltas.
pub const IM_JSON_PATCH: &str = "jsonpatch";
/// Instance manipulation token for gzip. Recognized but never produced.
pub const IM_GZIP: &str = "gzip";

/// Wraps a tag in double quotes.
pub fn quote(tag: &str) -> String {
    format!("\"{}\"", tag)
}

/// Strips the quotes from an entity tag.
///
/// Weak tags (`W/"..."`) are accepted. Returns `None` if the value is not
/// quoted.
pub fn unquote(value: &str) -> Option<&str> {
    let value = value.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    if value.len() < 2 {
        return None;
    }
    value.strip_prefix('"')?.strip_suffix('"')
}

/// Returns true if an `A-IM` value lists `jsonpatch`.
pub fn accepts_json_patch<'a, I>(a_im_values: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    a_im_values
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(|token| token.split(';').next().unwrap_or("").trim())
        .any(|token| token.eq_ignore_ascii_case(IM_JSON_PATCH))
}

/// Splits `If-None-Match` values into unquoted tags.
///
/// Each value may hold a comma-separated list; several values may be
/// given. `*` and unquoted entries are dropped.
pub fn if_none_match_tags<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .flat_map(|value| value.split(','))
        .filter_map(unquote)
        .collect()
}

/// Resolves `If-None-Match` values to the newest decodable baseline.
pub fn latest_if_none_match<'a, I>(values: I) -> Option<(&'a str, VersionStamp)>
where
    I: IntoIterator<Item = &'a str>,
{
    select_latest_tag(if_none_match_tags(values))
}

/// Parses a `Get-Modified-Since` value.
///
/// A quoted value is a Version Tag; anything else must be an HTTP-date.
pub fn parse_get_modified_since(value: &str) -> Option<VersionStamp> {
    let value = value.trim();
    if value.starts_with('"') {
        return unquote(value).and_then(decode_tag);
    }
    parse_http_date(value)
}

/// Returns true if a `Content-Type` value names the patch media type.
///
/// Parameters and whitespace are ignored, matching is case-insensitive.
pub fn is_json_patch_media_type(content_type: &str) -> bool {
    media_type_matches(content_type, MIME_JSON_PATCH)
}

/// Returns true if a `Content-Type` value names the document media type.
pub fn is_json_media_type(content_type: &str) -> bool {
    media_type_matches(content_type, MIME_JSON)
}

fn media_type_matches(content_type: &str, expected: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quote("123"), "\"123\"");
        assert_eq!(unquote("\"123\""), Some("123"));
        assert_eq!(unquote(" W/\"123\" "), Some("123"));
        assert_eq!(unquote("123"), None);
        assert_eq!(unquote("\""), None);
        assert_eq!(unquote("\"\""), Some(""));
    }

    #[test]
    fn a_im_detection() {
        assert!(accepts_json_patch(["jsonpatch"]));
        assert!(accepts_json_patch(["gzip, JsonPatch"]));
        assert!(accepts_json_patch(["gzip", "jsonpatch;q=0.5"]));
        assert!(!accepts_json_patch(["gzip"]));
        assert!(!accepts_json_patch(Vec::<&str>::new()));
    }

    #[test]
    fn if_none_match_splitting() {
        let tags = if_none_match_tags(["\"1\", \"2\"", "*", "\"3\",bare"]);
        assert_eq!(tags, vec!["1", "2", "3"]);
    }

    #[test]
    fn if_none_match_selects_newest() {
        let latest = latest_if_none_match(["\"1\", \"not-a-number\", \"100\""]);
        assert_eq!(latest, Some(("100", VersionStamp::from_nanos(100))));
        assert_eq!(latest_if_none_match(["*"]), None);
        assert_eq!(latest_if_none_match(["\"x\""]), None);
    }

    #[test]
    fn get_modified_since_forms() {
        assert_eq!(
            parse_get_modified_since("\"1500\""),
            Some(VersionStamp::from_nanos(1500))
        );
        assert_eq!(parse_get_modified_since("\"abc\""), None);
        assert_eq!(
            parse_get_modified_since("Sun, 06 Nov 1994 08:49:37 GMT"),
            Some(VersionStamp::from_nanos(784_111_777_000_000_000))
        );
        assert_eq!(parse_get_modified_since("1500"), None);
    }

    #[test]
    fn media_types() {
        assert!(is_json_patch_media_type("application/json-patch+json"));
        assert!(is_json_patch_media_type("Application/JSON-Patch+JSON; charset=utf-8"));
        assert!(!is_json_patch_media_type("application/json"));
        assert!(is_json_media_type(" application/json ;charset=utf-8"));
    }
}
