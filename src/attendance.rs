// src/attendance.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashMap;

use crate::tracker_client::{RecordType, TimeRecord};

/// One row per employee per calendar day, with each punch slot resolved to
/// at most one time-of-day string. Absent slots stay `None`; the display
/// placeholder is applied at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyAttendance {
    pub date: String,
    pub employee_id: i64,
    pub employee_name: String,
    pub arrival: Option<String>,
    pub lunch_start: Option<String>,
    pub lunch_end: Option<String>,
    pub departure: Option<String>,
}

/// Splits a raw timestamp into its UTC calendar day and time of day.
/// The backend emits naive isoformat (assumed UTC); offset-carrying RFC 3339
/// strings are normalized to UTC first so an event maps to the same day on
/// every client. Returns `None` when the string parses under neither form.
fn split_timestamp_utc(timestamp: &str) -> Option<(String, String)> {
    let utc: DateTime<Utc> = DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        })
        .ok()?;
    Some((
        utc.format("%Y-%m-%d").to_string(),
        utc.format("%H:%M:%S").to_string(),
    ))
}

/// Collapses a flat punch-event list into one row per (employee, day).
///
/// Grouping happens on the UTC calendar day of each timestamp. Within a
/// group, the last event of a given type in input order wins; the backend
/// returns records ordered by timestamp descending, so each slot resolves to
/// the earliest punch of that type on the day. An unparseable timestamp
/// never fails the whole list: the raw string is used as both day key and
/// slot value for that record.
///
/// Rows come back sorted by date descending, then employee name ascending.
pub fn group_daily(records: &[TimeRecord]) -> Vec<DailyAttendance> {
    let mut grouped: HashMap<(i64, String), DailyAttendance> = HashMap::new();

    for record in records {
        let (day, time) = match split_timestamp_utc(&record.timestamp) {
            Some(parts) => parts,
            // Tolerate malformed input: display the raw value instead
            None => (record.timestamp.clone(), record.timestamp.clone()),
        };

        let key = (record.employee_id, day.clone());
        let row = grouped.entry(key).or_insert_with(|| DailyAttendance {
            date: day,
            employee_id: record.employee_id,
            employee_name: record.employee_name.clone(),
            arrival: None,
            lunch_start: None,
            lunch_end: None,
            departure: None,
        });

        match record.record_type {
            RecordType::Arrival => row.arrival = Some(time),
            RecordType::LunchStart => row.lunch_start = Some(time),
            RecordType::LunchEnd => row.lunch_end = Some(time),
            RecordType::Departure => row.departure = Some(time),
        }
    }

    let mut rows: Vec<DailyAttendance> = grouped.into_values().collect();
    // ISO date strings compare correctly as bytes; name order is locale-naive
    rows.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    rows
}
