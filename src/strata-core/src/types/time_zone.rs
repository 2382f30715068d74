//! Time zones used when interpreting zone-less timestamps.

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone as _, Utc};
use chrono_tz::Tz;

use common_error::{StrataError, StrataResult, value_err};

/// A session or table time zone.
///
/// Accepted spellings: IANA region names (`America/Los_Angeles`, matched
/// case-insensitively), `UTC`, `GMT`, `Z`, `±HH`, `±HH:MM`, `±HHMM`, and any
/// of the offsets prefixed by `UTC` or `GMT` (for example `UTC+08:00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZone {
    kind: ZoneKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZoneKind {
    Fixed(FixedOffset),
    Region(Tz),
}

impl TimeZone {
    /// The UTC time zone.
    pub fn utc() -> Self {
        Self::fixed(Utc.fix())
    }

    fn fixed(offset: FixedOffset) -> Self {
        Self {
            kind: ZoneKind::Fixed(offset),
        }
    }

    /// Parse a time zone identifier.
    pub fn parse(id: &str) -> StrataResult<Self> {
        let trimmed = id.trim();
        let upper = trimmed.to_ascii_uppercase();
        if matches!(upper.as_str(), "UTC" | "GMT" | "Z") {
            return Ok(Self::utc());
        }

        let offset = upper
            .strip_prefix("UTC")
            .or_else(|| upper.strip_prefix("GMT"))
            .unwrap_or(&upper);
        if offset.starts_with(['+', '-']) {
            let seconds = parse_offset_seconds(offset).ok_or_else(|| {
                StrataError::value_error(format!("unrecognized time zone offset `{id}`"))
            })?;
            return match FixedOffset::east_opt(seconds) {
                Some(offset) => Ok(Self::fixed(offset)),
                None => value_err!("time zone offset out of range in `{id}`"),
            };
        }

        match Tz::from_str_insensitive(trimmed) {
            Ok(tz) => Ok(Self {
                kind: ZoneKind::Region(tz),
            }),
            Err(_) => value_err!("unrecognized time zone `{id}`"),
        }
    }

    /// Offset from UTC in seconds (east positive), for fixed-offset zones.
    ///
    /// `None` for region zones, whose offset depends on the instant.
    pub fn fixed_offset_seconds(&self) -> Option<i32> {
        match self.kind {
            ZoneKind::Fixed(offset) => Some(offset.local_minus_utc()),
            ZoneKind::Region(_) => None,
        }
    }

    /// Interpret a local wall-clock time in this zone as nanoseconds since
    /// the Unix epoch.
    ///
    /// A wall-clock time repeated by a daylight-saving transition resolves to
    /// its earlier instant. One skipped by a transition is an error.
    pub fn local_to_utc_nanos(&self, local: NaiveDateTime) -> StrataResult<i64> {
        let nanos = match self.kind {
            ZoneKind::Fixed(offset) => local
                .and_local_timezone(offset)
                .earliest()
                .and_then(|dt| dt.timestamp_nanos_opt()),
            ZoneKind::Region(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .and_then(|dt| dt.timestamp_nanos_opt()),
        };
        nanos.ok_or_else(|| {
            StrataError::value_error(format!("timestamp `{local}` does not exist in {self}"))
        })
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl std::fmt::Display for TimeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ZoneKind::Fixed(offset) if offset.local_minus_utc() == 0 => write!(f, "UTC"),
            ZoneKind::Fixed(offset) => write!(f, "{offset}"),
            ZoneKind::Region(tz) => write!(f, "{}", tz.name()),
        }
    }
}

fn parse_offset_seconds(s: &str) -> Option<i32> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if !rest.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => (rest.get(..2)?, rest.get(2..)?),
        None => (rest, "0"),
    };

    if hours.is_empty() || hours.len() > 2 || minutes.is_empty() || minutes.contains(':') {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}
