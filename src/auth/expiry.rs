// Expiry timestamps and the safety-margin check

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Wire format of `expires` / `refresh_expires` (UTC)
pub const EXPIRY_FORMAT: &str = "%Y%m%d%H%M%S";

/// Tokens expiring within this many seconds are treated as already expired
pub const EXPIRY_MARGIN_SECS: i64 = 5;

/// Parse a `YYYYMMDDHHMMSS` UTC timestamp
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::InvalidExpiry(raw.to_string()))
}

/// Render a timestamp in the wire format
pub fn format_expiry(at: DateTime<Utc>) -> String {
    at.format(EXPIRY_FORMAT).to_string()
}

/// True when `expires` is in the past or less than the margin away from `now`
pub fn is_expired(expires: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires - now < Duration::seconds(EXPIRY_MARGIN_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_expiry() {
        let parsed = parse_expiry("20300101000000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());

        let parsed = parse_expiry("20260314235959").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_parse_expiry_rejects_other_formats() {
        assert!(matches!(
            parse_expiry("2030-01-01T00:00:00Z"),
            Err(Error::InvalidExpiry(_))
        ));
        assert!(parse_expiry("").is_err());
        assert!(parse_expiry("20301301000000").is_err()); // month 13
        assert!(parse_expiry("203001010000").is_err()); // missing seconds
    }

    #[test]
    fn test_format_expiry() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_expiry(at), "20300102030405");
        assert_eq!(parse_expiry(&format_expiry(at)).unwrap(), at);
    }

    #[test]
    fn test_margin_boundaries() {
        let now = fixed_now();
        // Past
        assert!(is_expired(now - Duration::seconds(1), now));
        // Exactly now
        assert!(is_expired(now, now));
        // Inside the margin
        assert!(is_expired(now + Duration::seconds(4), now));
        // Exactly at the margin is no longer "within" it
        assert!(!is_expired(now + Duration::seconds(5), now));
        assert!(!is_expired(now + Duration::hours(1), now));
    }

    proptest! {
        #[test]
        fn prop_expired_iff_within_margin(offset in -86_400i64..86_400i64) {
            let now = fixed_now();
            let expires = now + Duration::seconds(offset);
            prop_assert_eq!(is_expired(expires, now), offset < EXPIRY_MARGIN_SECS);
        }
    }
}
