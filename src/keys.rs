//! Partition and row key encoding
//!
//! Table stores order entities by comparing keys as strings. The functions in
//! this module encode timestamps as fixed-width tick counts so that a plain
//! lexicographic range scan walks records in chronological (or reverse
//! chronological) order.
//!
//! A tick is a 100 nanosecond interval counted from `0001-01-01T00:00:00Z`.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ouroboros_table::keys::{create_partition_key, create_row_key, SortOrder};
//!
//! # fn example() -> ouroboros_table::Result<()> {
//! let at = Utc.with_ymd_and_hms(2015, 3, 2, 0, 0, 0).unwrap();
//! assert_eq!(create_partition_key("myApplication", at)?, "myApplication_201503");
//!
//! let newest_first = create_row_key(&"req-42", at, SortOrder::Descending)?;
//! assert!(newest_first.ends_with("_req-42"));
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, TableError};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of ticks in one second
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Largest representable tick value (`9999-12-31T23:59:59.9999999Z`)
pub const MAX_TICKS: u64 = 3_155_378_975_999_999_999;

/// Width of the zero-padded tick segment of a row key
pub const TICK_WIDTH: usize = 19;

/// Leading digit of every date boundary string
pub const DATE_BOUNDARY_SENTINEL: char = '0';

/// Separator between key segments
pub const KEY_SEPARATOR: char = '_';

/// Ticks between `0001-01-01` and the Unix epoch
const UNIX_EPOCH_TICKS: i128 = 621_355_968_000_000_000;

/// Chronological direction encoded into row keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest record sorts first
    #[default]
    Ascending,
    /// Newest record sorts first
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// Convert a UTC timestamp to ticks
///
/// Fails with `InvalidArgument` when the timestamp lies outside
/// `0001-01-01T00:00:00Z ..= 9999-12-31T23:59:59.9999999Z`.
pub fn to_ticks(timestamp: DateTime<Utc>) -> Result<u64> {
    // Leap seconds report up to 1_999_999_999 nanos; fold them into the last tick.
    let nanos = timestamp.timestamp_subsec_nanos().min(999_999_999);
    let ticks = timestamp.timestamp() as i128 * TICKS_PER_SECOND as i128
        + (nanos / 100) as i128
        + UNIX_EPOCH_TICKS;

    if ticks < 0 || ticks > MAX_TICKS as i128 {
        return Err(TableError::InvalidArgument(format!(
            "timestamp {} is outside the tick range",
            timestamp.to_rfc3339()
        )));
    }

    Ok(ticks as u64)
}

/// Convert ticks back to a UTC timestamp
pub fn from_ticks(ticks: u64) -> Result<DateTime<Utc>> {
    if ticks > MAX_TICKS {
        return Err(TableError::InvalidArgument(format!(
            "tick value {} exceeds the maximum of {}",
            ticks, MAX_TICKS
        )));
    }

    let relative = ticks as i128 - UNIX_EPOCH_TICKS;
    let per_second = TICKS_PER_SECOND as i128;
    let seconds = relative.div_euclid(per_second) as i64;
    let nanos = (relative.rem_euclid(per_second) * 100) as u32;

    Utc.timestamp_opt(seconds, nanos).single().ok_or_else(|| {
        TableError::InvalidArgument(format!("tick value {} is not representable", ticks))
    })
}

/// Earliest timestamp in the tick domain
pub fn min_timestamp() -> DateTime<Utc> {
    from_ticks(0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Latest timestamp in the tick domain
pub fn max_timestamp() -> DateTime<Utc> {
    from_ticks(MAX_TICKS).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Render ticks as a fixed-width decimal, mirrored for descending order
///
/// Fails with `InvalidArgument` when `ticks` exceeds [`MAX_TICKS`].
pub fn encode_ticks(ticks: u64, order: SortOrder) -> Result<String> {
    if ticks > MAX_TICKS {
        return Err(TableError::InvalidArgument(format!(
            "tick value {} exceeds the maximum of {}",
            ticks, MAX_TICKS
        )));
    }

    let value = match order {
        SortOrder::Ascending => ticks,
        SortOrder::Descending => MAX_TICKS - ticks,
    };
    Ok(format!("{:0width$}", value, width = TICK_WIDTH))
}

/// Build the partition key `<application>_<YYYYMM>`
///
/// Records of one application are grouped per calendar month (UTC).
pub fn create_partition_key(application: &str, timestamp: DateTime<Utc>) -> Result<String> {
    if application.trim().is_empty() {
        return Err(TableError::InvalidArgument(
            "application name must not be empty".to_string(),
        ));
    }

    // Validates the year range as a side effect.
    to_ticks(timestamp)?;

    let period = timestamp.year() as u32 * 100 + timestamp.month();
    Ok(format!("{}{}{:06}", application, KEY_SEPARATOR, period))
}

/// Build the row key `<ticks>_<identifier>`
///
/// For [`SortOrder::Ascending`] string order equals chronological order; for
/// [`SortOrder::Descending`] it equals reverse chronological order.
pub fn create_row_key(
    identifier: &impl fmt::Display,
    timestamp: DateTime<Utc>,
    order: SortOrder,
) -> Result<String> {
    let identifier = identifier.to_string();
    if identifier.is_empty() {
        return Err(TableError::InvalidArgument(
            "row key identifier must not be empty".to_string(),
        ));
    }

    let ticks = to_ticks(timestamp)?;
    Ok(format!(
        "{}{}{}",
        encode_ticks(ticks, order)?,
        KEY_SEPARATOR,
        identifier
    ))
}

/// Split a row key produced by [`create_row_key`] into timestamp and identifier
pub fn decode_row_key(row_key: &str, order: SortOrder) -> Result<(DateTime<Utc>, String)> {
    let (encoded, identifier) = row_key
        .split_once(KEY_SEPARATOR)
        .filter(|(encoded, _)| {
            encoded.len() == TICK_WIDTH && encoded.bytes().all(|b| b.is_ascii_digit())
        })
        .ok_or_else(|| {
            TableError::InvalidArgument(format!("malformed row key: {}", row_key))
        })?;

    let value: u64 = encoded
        .parse()
        .map_err(|_| TableError::InvalidArgument(format!("malformed row key: {}", row_key)))?;

    let ticks = match order {
        SortOrder::Ascending => value,
        SortOrder::Descending => MAX_TICKS.checked_sub(value).ok_or_else(|| {
            TableError::InvalidArgument(format!("malformed row key: {}", row_key))
        })?,
    };

    Ok((from_ticks(ticks)?, identifier.to_string()))
}

/// Boundary string used by date range partition scans
///
/// The sentinel digit followed by the raw tick count, upper-cased.
pub fn date_boundary(timestamp: DateTime<Utc>) -> Result<String> {
    let ticks = to_ticks(timestamp)?;
    Ok(format!("{}{}", DATE_BOUNDARY_SENTINEL, ticks).to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_partition_key_format() {
        let key = create_partition_key("myApplication", at(2015, 3, 2)).unwrap();
        assert_eq!(key, "myApplication_201503");

        let key = create_partition_key("svc", at(987, 11, 30)).unwrap();
        assert_eq!(key, "svc_098711");
    }

    #[test]
    fn test_partition_key_rejects_blank_application() {
        assert!(create_partition_key("", at(2015, 3, 2))
            .unwrap_err()
            .is_invalid_argument());
        assert!(create_partition_key("   ", at(2015, 3, 2))
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_tick_domain_bounds() {
        assert_eq!(to_ticks(min_timestamp()).unwrap(), 0);
        assert_eq!(to_ticks(max_timestamp()).unwrap(), MAX_TICKS);
        assert_eq!(to_ticks(at(1970, 1, 1)).unwrap(), 621_355_968_000_000_000);

        let before = min_timestamp() - chrono::Duration::nanoseconds(100);
        assert!(to_ticks(before).is_err());
        assert!(from_ticks(MAX_TICKS + 1).is_err());
    }

    #[test]
    fn test_ticks_roundtrip_keeps_sub_second_precision() {
        let ts = Utc.timestamp_opt(1_425_254_400, 123_456_700).unwrap();
        assert_eq!(from_ticks(to_ticks(ts).unwrap()).unwrap(), ts);
    }

    #[test]
    fn test_row_key_extremes() {
        let nil = Uuid::nil();
        let expected = format!("0000000000000000000_{}", nil);

        let key = create_row_key(&nil, min_timestamp(), SortOrder::Ascending).unwrap();
        assert_eq!(key, expected);

        let key = create_row_key(&nil, max_timestamp(), SortOrder::Descending).unwrap();
        assert_eq!(key, expected);
    }

    #[test]
    fn test_row_key_ordering() {
        let earlier = at(2015, 3, 2);
        let later = earlier + chrono::Duration::milliseconds(1);

        let a1 = create_row_key(&"x", earlier, SortOrder::Ascending).unwrap();
        let a2 = create_row_key(&"x", later, SortOrder::Ascending).unwrap();
        assert!(a1 < a2);

        let d1 = create_row_key(&"x", earlier, SortOrder::Descending).unwrap();
        let d2 = create_row_key(&"x", later, SortOrder::Descending).unwrap();
        assert!(d1 > d2);
    }

    #[test]
    fn test_row_key_rejects_empty_identifier() {
        let err = create_row_key(&"", at(2015, 3, 2), SortOrder::Ascending).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_decode_row_key() {
        let id = Uuid::new_v4();
        let ts = at(2020, 6, 15);

        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let key = create_row_key(&id, ts, order).unwrap();
            let (decoded_ts, decoded_id) = decode_row_key(&key, order).unwrap();
            assert_eq!(decoded_ts, ts);
            assert_eq!(decoded_id, id.to_string());
        }

        assert!(decode_row_key("12_abc", SortOrder::Ascending).is_err());
        assert!(decode_row_key("no-separator", SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_decode_row_key_requires_plain_digits() {
        for key in ["+000000000000000001_x", "-000000000000000001_x", " 000000000000000001_x"] {
            let err = decode_row_key(key, SortOrder::Ascending).unwrap_err();
            assert!(err.is_invalid_argument(), "{} should be rejected", key);
        }
        assert!(decode_row_key("0000000000000000001_x", SortOrder::Ascending).is_ok());
    }

    #[test]
    fn test_encode_ticks_fixed_width() {
        assert_eq!(encode_ticks(0, SortOrder::Ascending).unwrap(), "0000000000000000000");
        assert_eq!(encode_ticks(MAX_TICKS, SortOrder::Descending).unwrap(), "0000000000000000000");
        assert_eq!(
            encode_ticks(MAX_TICKS, SortOrder::Ascending).unwrap().len(),
            TICK_WIDTH
        );
    }

    #[test]
    fn test_encode_ticks_rejects_out_of_domain() {
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            assert!(encode_ticks(MAX_TICKS + 5, order)
                .unwrap_err()
                .is_invalid_argument());
            assert!(encode_ticks(u64::MAX, order).unwrap_err().is_invalid_argument());
        }
    }

    #[test]
    fn test_date_boundary() {
        let boundary = date_boundary(at(1970, 1, 1)).unwrap();
        assert_eq!(boundary, "0621355968000000000");
        assert!(boundary.starts_with(DATE_BOUNDARY_SENTINEL));
    }

    #[test]
    fn test_sort_order_display() {
        assert_eq!(SortOrder::Ascending.to_string(), "ascending");
        assert_eq!(SortOrder::Descending.to_string(), "descending");
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }
}
