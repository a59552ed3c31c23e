//! Export journal data to various formats

use crate::{Error, Journal, JournalEntry, JournalStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// RON format (Rust Object Notation)
    Ron,
    /// JSON format (requires serde_json feature)
    Json,
    /// CSV format, one row per entry
    Csv,
    /// Human-readable text format
    Text,
}

/// Exporter for journal data
pub struct Exporter<'a> {
    journal: &'a Journal,
}

impl<'a> Exporter<'a> {
    /// Create a new exporter
    pub fn new(journal: &'a Journal) -> Self {
        Self { journal }
    }

    /// Export to a string in the given format
    pub fn export(&self, format: ExportFormat) -> crate::Result<String> {
        match format {
            ExportFormat::Ron => self.to_ron(),
            ExportFormat::Json => self.to_json(),
            ExportFormat::Csv => Ok(self.to_csv()),
            ExportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Export to a writer
    pub fn export_to<W: Write>(&self, writer: &mut W, format: ExportFormat) -> crate::Result<()> {
        let content = self.export(format)?;
        writer.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Export to RON format
    pub fn to_ron(&self) -> crate::Result<String> {
        let export = ExportData::from_journal(self.journal);
        ron::ser::to_string_pretty(&export, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Export to JSON format
    #[cfg(feature = "serde_json")]
    pub fn to_json(&self) -> crate::Result<String> {
        let export = ExportData::from_journal(self.journal);
        serde_json::to_string_pretty(&export).map_err(|e| Error::Serialization(e.to_string()))
    }

    #[cfg(not(feature = "serde_json"))]
    pub fn to_json(&self) -> crate::Result<String> {
        Err(Error::ExportError(
            "JSON export requires the 'serde_json' feature".to_string(),
        ))
    }

    /// Export to CSV format
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("seq,time,event,field,axis,payload\n");

        for entry in self.journal.entries() {
            let axis = entry
                .topic
                .axis()
                .map(|axis| format!("{:?}", axis))
                .unwrap_or_default();

            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                entry.seq,
                entry.time.to_rfc3339(),
                csv_quote(&entry.event),
                csv_quote(entry.field().unwrap_or_default()),
                axis,
                csv_quote(&format!("{:?}", entry.payload))
            ));
        }

        output
    }

    /// Export to human-readable text format
    pub fn to_text(&self) -> String {
        let mut output = String::new();
        let stats = self.journal.stats();

        output.push_str("=== Journal Export ===\n\n");
        output.push_str(&format!("Total entries: {}\n", stats.total_entries));
        output.push_str(&format!("Field events: {}\n", stats.field_entries));
        output.push_str(&format!("Reports: {}\n", stats.report_entries));
        output.push_str(&format!("Dropped: {}\n", stats.dropped_entries));

        if let (Some(first), Some(last)) = (stats.first_time, stats.last_time) {
            output.push_str(&format!(
                "Time range: {} - {}\n",
                first.to_rfc3339(),
                last.to_rfc3339()
            ));
        }

        output.push_str("\n=== Entries ===\n\n");

        for entry in self.journal.entries() {
            output.push_str(&format!("  #{} {}\n", entry.seq, entry.event));
            output.push_str(&format!("      payload: {:?}\n", entry.payload));
        }

        output
    }

    /// Export only entries with `start <= seq <= end`
    pub fn export_range(&self, start: u64, end: u64, format: ExportFormat) -> crate::Result<String> {
        if start > end {
            return Err(Error::InvalidRange(start, end));
        }
        let filtered = FilteredExport {
            entries: self.journal.entries_in_range(start, end),
        };

        match format {
            ExportFormat::Ron => {
                ron::ser::to_string_pretty(&filtered, ron::ser::PrettyConfig::default())
                    .map_err(|e| Error::Serialization(e.to_string()))
            }
            #[cfg(feature = "serde_json")]
            ExportFormat::Json => serde_json::to_string_pretty(&filtered)
                .map_err(|e| Error::Serialization(e.to_string())),
            #[cfg(not(feature = "serde_json"))]
            ExportFormat::Json => Err(Error::ExportError(
                "JSON export requires the 'serde_json' feature".to_string(),
            )),
            _ => Err(Error::ExportError(
                "Range export only supports RON and JSON".to_string(),
            )),
        }
    }
}

/// Quote a CSV cell, doubling embedded quotes
fn csv_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Data structure for full journal export
#[derive(Debug, Clone, Serialize)]
struct ExportData {
    version: u32,
    stats: ExportStats,
    entries: Vec<JournalEntry>,
}

impl ExportData {
    fn from_journal(journal: &Journal) -> Self {
        Self {
            version: 1,
            stats: ExportStats::from(journal.stats()),
            entries: journal.entries(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ExportStats {
    total_entries: usize,
    dropped_entries: u64,
    field_entries: usize,
    report_entries: usize,
    first_time: Option<DateTime<Utc>>,
    last_time: Option<DateTime<Utc>>,
}

impl From<JournalStats> for ExportStats {
    fn from(stats: JournalStats) -> Self {
        Self {
            total_entries: stats.total_entries,
            dropped_entries: stats.dropped_entries,
            field_entries: stats.field_entries,
            report_entries: stats.report_entries,
            first_time: stats.first_time,
            last_time: stats.last_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct FilteredExport {
    entries: Vec<JournalEntry>,
}
