use chrono::{DateTime, SecondsFormat, Utc};

/// Current UTC time as an RFC 9557 string with millisecond precision.
pub fn current_datetime_rfc9557() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Formats a UTC instant as ISO-8601 with a trailing `Z` instead of `+00:00`.
pub fn iso_utc_z(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn iso_utc_z_ends_with_z() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(iso_utc_z(&ts), "2025-03-14T15:09:26.000000Z");
    }

    #[test]
    fn rfc9557_has_millis_and_z() {
        let s = current_datetime_rfc9557();
        assert!(s.ends_with('Z'));
        assert_eq!(s.len(), "2025-03-14T15:09:26.123Z".len());
    }
}
