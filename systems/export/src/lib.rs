#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Delimited-text export of the stored test results.
//!
//! Fields are comma-joined and only the sample type is quoted. Values are not
//! escaped further, so a field containing a comma or quote produces a
//! malformed row; none of the generated fields can contain either.

use std::fmt::Write as _;

use aura_core::TestResult;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

/// Header row of the exported document.
pub const CSV_HEADER: &str = "Test ID,Date,Purity Grade,Purity %,Confidence %,Sample Type,Mode,Frequency Hz,Amplitude V,Q-Factor";

/// Default file name of the exported document.
pub const EXPORT_FILE_NAME: &str = "aura_test_results.csv";

/// Serialises the records into a CSV document, one line per record.
///
/// Rows follow the order of `records`; every line, including the header, is
/// terminated by a newline.
#[must_use]
pub fn to_csv(records: &[TestResult]) -> String {
    let mut document = String::with_capacity((records.len() + 1) * 96);
    document.push_str(CSV_HEADER);
    document.push('\n');

    for record in records {
        let readings = record.readings();
        // Writing into a String cannot fail.
        let _ = writeln!(
            document,
            "{},{},{},{},{},\"{}\",{},{},{},{}",
            record.id(),
            format_date(record.timestamp()),
            record.grade().label(),
            record.percentage(),
            record.confidence(),
            record.sample_type(),
            record.mode(),
            readings.frequency_hz,
            readings.amplitude_volts,
            readings.q_factor,
        );
    }

    document
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS` in UTC.
#[must_use]
pub fn format_date(timestamp: OffsetDateTime) -> String {
    let utc = timestamp.to_offset(UtcOffset::UTC);
    // Every component is present on an OffsetDateTime.
    utc.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| utc.to_string())
}
