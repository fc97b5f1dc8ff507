//! HTTP-date parsing and formatting (RFC 9110 §5.6.7).

use crate::version::VersionStamp;
use chrono::{DateTime, NaiveDateTime};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Parses an HTTP-date in any of the three permitted forms.
///
/// Returns `None` for anything unparsable; callers treat that as "no
/// baseline".
pub fn parse_http_date(value: &str) -> Option<VersionStamp> {
    let value = value.trim();
    let parsed = [IMF_FIXDATE, RFC_850, ASCTIME]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())?;
    let nanos = parsed.and_utc().timestamp().checked_mul(1_000_000_000)?;
    Some(VersionStamp::from_nanos(nanos))
}

/// Formats a stamp as an IMF-fixdate, truncating to whole seconds.
pub fn format_http_date(stamp: VersionStamp) -> String {
    let secs = stamp.as_nanos().div_euclid(1_000_000_000);
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format(IMF_FIXDATE).to_string(),
        None => String::new(),
    }
}
