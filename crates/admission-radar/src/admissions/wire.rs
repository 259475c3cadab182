//! Lenient date handling for catalog records. Stored records carry both full
//! RFC 3339 instants and bare calendar dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an instant, reading bare dates as midnight UTC and zone-less
/// timestamps as UTC.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 instant or YYYY-MM-DD"))
}

/// Parse a calendar date, accepting a full instant and keeping its UTC date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| parse_instant(trimmed).map(|instant| instant.date_naive()))
        .map_err(|_| format!("failed to parse '{raw}' as YYYY-MM-DD"))
}

pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub mod flexible_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_instant(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_instant(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(super::DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod optional_instant {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        opt.map(|value| super::parse_instant(&value).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bare_dates_read_as_midnight_utc() {
        let instant = parse_instant("2025-09-30").expect("date parses");
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let instant = parse_instant("2025-09-30T23:59:59+06:00").expect("instant parses");
        assert_eq!(
            instant,
            Utc.with_ymd_and_hms(2025, 9, 30, 17, 59, 59).unwrap()
        );
        assert_eq!(format_instant(&instant), "2025-09-30T17:59:59Z");
    }

    #[test]
    fn dates_accept_full_instants() {
        let date = parse_date("2024-12-27T10:00:00Z").expect("instant accepted");
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 12, 27).unwrap());
        assert!(parse_date("27/12/2024").is_err());
    }
}
