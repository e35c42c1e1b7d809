//! CSV export of the record history.
//!
//! Fields are written unquoted. Every field is a timestamp or a number, so
//! no delimiter can appear inside one.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use csv::{QuoteStyle, WriterBuilder};

use super::store::Record;
use crate::error::{CoreError, Result};

pub const CSV_HEADER: [&str; 5] = ["时间", "金额", "货币", "持续时间(秒)", "收益增量"];

/// `今天 HH:MM:SS` for today, `MM-DD HH:MM:SS` otherwise, in the local zone of `now`.
pub fn display_time<Tz>(timestamp: DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let local = timestamp.with_timezone(&now.timezone());
    if local.date_naive() == now.date_naive() {
        format!("今天 {}", local.format("%H:%M:%S"))
    } else {
        local.format("%m-%d %H:%M:%S").to_string()
    }
}

/// `薪资流记录_YYYYMMDD_HHMMSS.csv`
pub fn export_filename(now: DateTime<Local>) -> String {
    format!("薪资流记录_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Serialize `records` in the given order, header first.
///
/// # Errors
/// Returns an error if the CSV writer fails.
pub fn records_to_csv<Tz>(records: &[Record], now: DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(&[
            display_time(record.timestamp, &now),
            record.amount.to_string(),
            record.currency.code().to_string(),
            record.seconds.to_string(),
            record.delta.to_string(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| CoreError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| CoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
