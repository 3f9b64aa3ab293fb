//! Conditional request module
//!
//! If-Modified-Since evaluation and Last-Modified formatting, compliant
//! with the HTTP-date forms of RFC 7231 section 7.1.1.1.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

/// Format a filesystem timestamp as an IMF-fixdate `Last-Modified` value.
pub fn format_http_date(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP-date header value.
///
/// Accepts IMF-fixdate, the obsolete RFC 850 format and asctime, per the
/// receiving requirements of RFC 7231.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    const FORMATS: &[&str] = &[
        "%a, %d %b %Y %H:%M:%S GMT", // IMF-fixdate
        "%A, %d-%b-%y %H:%M:%S GMT", // RFC 850
        "%a %b %e %H:%M:%S %Y",      // asctime
    ];

    FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value.trim(), format)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    })
}

/// Decide whether a 304 applies: true if the file has not been modified
/// since the client's timestamp. Compared at whole-second precision, since
/// HTTP-dates carry no sub-second component.
pub fn not_modified(if_modified_since: &str, mtime: SystemTime) -> bool {
    let Some(client_time) = parse_http_date(if_modified_since) else {
        return false;
    };
    let mtime: DateTime<Utc> = mtime.into();
    mtime.timestamp() <= client_time.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_imf_fixdate() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
    }

    #[test]
    fn test_parse_obsolete_formats() {
        let imf = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        let rfc850 = parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT").unwrap();
        let asctime = parse_http_date("Sun Nov  6 08:49:37 1994").unwrap();
        assert_eq!(imf, rfc850);
        assert_eq!(imf, asctime);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_http_date("not a date").is_none());
        assert!(parse_http_date("").is_none());
    }

    #[test]
    fn test_format_round_trips() {
        let now = SystemTime::now();
        let formatted = format_http_date(now);
        let parsed = parse_http_date(&formatted).unwrap();
        let original: DateTime<Utc> = now.into();
        assert_eq!(parsed.timestamp(), original.timestamp());
    }

    #[test]
    fn test_not_modified() {
        let mtime = SystemTime::now();
        let header = format_http_date(mtime);

        // Same second: not modified
        assert!(not_modified(&header, mtime));

        // File touched after the client's copy: modified
        let newer = mtime + Duration::from_secs(5);
        assert!(!not_modified(&header, newer));

        // Client copy newer than the file: not modified
        let older = mtime - Duration::from_secs(5);
        assert!(not_modified(&header, older));
    }

    #[test]
    fn test_not_modified_ignores_bad_header() {
        assert!(!not_modified("yesterday-ish", SystemTime::now()));
    }
}
