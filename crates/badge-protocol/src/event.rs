//! Badge scan events

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::codec::BadgeCode;

/// Timestamp layout: local time, millisecond precision, no offset
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// One accepted badge read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    /// ISO-8601 local time of the read
    pub timestamp: String,
    /// Badge code
    pub code: BadgeCode,
}

impl ScanEvent {
    /// Stamp a code with the current local time
    pub fn now(code: BadgeCode) -> Self {
        Self::at(code, Local::now().naive_local())
    }

    /// Stamp a code with a given time
    pub fn at(code: BadgeCode, time: NaiveDateTime) -> Self {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamp_format() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_milli_opt(8, 5, 7, 42)
            .unwrap();
        let event = ScanEvent::at("1a2b3c4d".parse().unwrap(), time);
        assert_eq!(event.timestamp, "2024-03-09T08:05:07.042");
    }

    #[test]
    fn test_now_has_millisecond_precision() {
        let event = ScanEvent::now("1a2b3c4d".parse().unwrap());
        // YYYY-MM-DDTHH:MM:SS.mmm
        assert_eq!(event.timestamp.len(), 23);
        assert_eq!(&event.timestamp[10..11], "T");
    }
}
