// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV export of the deletion log.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use nuketune_core::{DeletionLogEntry, NukeError};

pub const CSV_HEADERS: [&str; 6] = [
    "Timestamp",
    "Category",
    "Object ID",
    "Object Name",
    "Status",
    "Message",
];

/// Serializes log entries as CSV: a header row, then one row per entry.
///
/// The header is written bare. Every data field is quoted and embedded
/// quotes are doubled. Rows end in `\n`.
pub fn export_log_to_csv<'a, I>(entries: I) -> Result<String, NukeError>
where
    I: IntoIterator<Item = &'a DeletionLogEntry>,
{
    let mut header = CSV_HEADERS.join(",").into_bytes();
    header.push(b'\n');
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(header);

    for entry in entries {
        let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let status = entry.status.to_string();
        writer
            .write_record([
                timestamp.as_str(),
                entry.category_name.as_str(),
                entry.object_id.as_str(),
                entry.object_name.as_str(),
                status.as_str(),
                entry.message.as_deref().unwrap_or(""),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| NukeError::Internal(format!("flushing csv: {e}")))?;
    String::from_utf8(bytes).map_err(|e| NukeError::Internal(format!("csv is not utf-8: {e}")))
}

/// File name for an export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("nuketune-deletion-log-{stamp}.csv")
}

fn csv_error(err: csv::Error) -> NukeError {
    NukeError::Internal(format!("writing csv: {err}"))
}
