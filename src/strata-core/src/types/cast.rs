//! Casts from raw partition strings to typed values.
//!
//! Catalogs record partition values as strings; they only acquire a type once
//! they are matched against the table's declared partition columns.

use chrono::{NaiveDate, NaiveDateTime};

use common_error::{StrataResult, type_err};

use super::{DataType, TimeZone, Value};

/// Marker a catalog stores for a partition whose column value is null.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Cast a raw partition value into `data_type`.
///
/// Missing values and [`HIVE_DEFAULT_PARTITION`] become [`Value::Null`].
/// Zone-less timestamps are read as wall-clock time in `time_zone`.
pub fn cast_partition_value(
    raw: Option<&str>,
    data_type: DataType,
    time_zone: &TimeZone,
) -> StrataResult<Value> {
    let raw = match raw {
        None => return Ok(Value::Null),
        Some(r) if r == HIVE_DEFAULT_PARTITION => return Ok(Value::Null),
        Some(r) => r,
    };

    let value = match data_type {
        DataType::Null => Some(Value::Null),
        DataType::String => Some(Value::String(raw.to_string())),
        DataType::Binary => Some(Value::Binary(raw.as_bytes().to_vec())),
        DataType::Bool => parse_bool(raw).map(Value::Bool),
        DataType::Int32 => raw.trim().parse().ok().map(Value::Int32),
        DataType::Int64 => raw.trim().parse().ok().map(Value::Int64),
        DataType::Float64 => raw.trim().parse().ok().map(Value::Float64),
        DataType::Date => parse_date(raw.trim()).map(Value::Date),
        DataType::Timestamp => match parse_local_timestamp(raw.trim()) {
            Some(local) => Some(Value::Timestamp(time_zone.local_to_utc_nanos(local)?)),
            None => None,
        },
    };

    match value {
        Some(v) => Ok(v),
        None => type_err!("cannot cast partition value `{raw}` to {data_type}"),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn parse_date(raw: &str) -> Option<i32> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    i32::try_from(date.signed_duration_since(epoch()).num_days()).ok()
}

fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NANOS_PER_HOUR: i64 = 3600 * 1_000_000_000;

    #[test]
    fn test_null_markers() {
        let utc = TimeZone::utc();
        assert_eq!(cast_partition_value(None, DataType::Int64, &utc).unwrap(), Value::Null);
        assert_eq!(
            cast_partition_value(Some(HIVE_DEFAULT_PARTITION), DataType::Date, &utc).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_scalar_casts() {
        let utc = TimeZone::utc();
        assert_eq!(
            cast_partition_value(Some(" 42 "), DataType::Int32, &utc).unwrap(),
            Value::Int32(42)
        );
        assert_eq!(
            cast_partition_value(Some("-7"), DataType::Int64, &utc).unwrap(),
            Value::Int64(-7)
        );
        assert_eq!(
            cast_partition_value(Some("1.5"), DataType::Float64, &utc).unwrap(),
            Value::Float64(1.5)
        );
        assert_eq!(
            cast_partition_value(Some("TRUE"), DataType::Bool, &utc).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            cast_partition_value(Some("us"), DataType::String, &utc).unwrap(),
            Value::from("us")
        );
    }

    #[test]
    fn test_date_cast() {
        let utc = TimeZone::utc();
        assert_eq!(
            cast_partition_value(Some("1970-01-02"), DataType::Date, &utc).unwrap(),
            Value::Date(1)
        );
        assert_eq!(
            cast_partition_value(Some("1969-12-31"), DataType::Date, &utc).unwrap(),
            Value::Date(-1)
        );
    }

    #[test]
    fn test_timestamp_cast_uses_time_zone() {
        let utc = TimeZone::utc();
        let plus_two = TimeZone::parse("+02:00").unwrap();

        assert_eq!(
            cast_partition_value(Some("1970-01-01 02:00:00"), DataType::Timestamp, &utc).unwrap(),
            Value::Timestamp(2 * NANOS_PER_HOUR)
        );
        assert_eq!(
            cast_partition_value(Some("1970-01-01 02:00:00"), DataType::Timestamp, &plus_two)
                .unwrap(),
            Value::Timestamp(0)
        );
        assert_eq!(
            cast_partition_value(Some("1970-01-01"), DataType::Timestamp, &plus_two).unwrap(),
            Value::Timestamp(-2 * NANOS_PER_HOUR)
        );
    }

    #[test]
    fn test_invalid_cast() {
        let err = cast_partition_value(Some("abc"), DataType::Int64, &TimeZone::utc()).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: cannot cast partition value `abc` to Int64");
    }
}
