//! Auditing and analytics for journal data

use crate::{Journal, JournalEntry};
use chrono::{DateTime, Utc};
use formstate_core::{Axis, FieldName, Payload, Topic, Value};
use indexmap::IndexMap;

/// Auditor for querying and analyzing journal data
pub struct Auditor<'a> {
    journal: &'a Journal,
}

impl<'a> Auditor<'a> {
    /// Create a new auditor for a journal
    pub fn new(journal: &'a Journal) -> Self {
        Self { journal }
    }

    /// Generate a comprehensive audit report
    pub fn generate_report(&self) -> AuditReport {
        let stats = self.journal.stats();
        let mut event_counts: IndexMap<String, u64> = IndexMap::new();
        let mut field_counts: IndexMap<FieldName, u64> = IndexMap::new();
        let mut invalid_reports = 0;

        for entry in self.journal.entries() {
            *event_counts.entry(kind_label(&entry.topic)).or_insert(0) += 1;

            match (&entry.topic, &entry.payload) {
                (Topic::Field { field, .. }, _) => {
                    *field_counts.entry(field.clone()).or_insert(0) += 1;
                }
                (Topic::FormState, Payload::Report(report)) if !report.is_valid => {
                    invalid_reports += 1;
                }
                _ => {}
            }
        }

        AuditReport {
            total_entries: stats.total_entries,
            dropped_entries: stats.dropped_entries,
            first_time: stats.first_time,
            last_time: stats.last_time,
            event_counts,
            field_counts,
            invalid_reports,
        }
    }

    /// Query entries matching specific criteria
    pub fn query(&self, query: &AuditQuery) -> Vec<JournalEntry> {
        self.journal
            .entries()
            .into_iter()
            .filter(|entry| query.matches(entry))
            .collect()
    }

    /// Get a summary of the activity on one field
    pub fn field_summary(&self, field: &str) -> FieldSummary {
        let mut summary = FieldSummary::default();

        for entry in self.journal.entries_for(field) {
            summary.total += 1;
            *summary
                .by_axis
                .entry(kind_label(&entry.topic))
                .or_insert(0) += 1;
            if let Payload::Value(value) = entry.payload {
                summary.last_value = Some(value);
            }
        }

        summary
    }

    /// Count entries on one axis, across all fields
    pub fn count_axis(&self, axis: Axis) -> u64 {
        self.journal
            .entries()
            .iter()
            .filter(|entry| entry.topic.axis() == Some(axis))
            .count() as u64
    }

    /// Get all fields that appear in the journal, in first-seen order
    pub fn touched_fields(&self) -> Vec<FieldName> {
        let mut fields: Vec<FieldName> = Vec::new();
        for entry in self.journal.entries() {
            if let Some(field) = entry.topic.field_name() {
                if !fields.contains(field) {
                    fields.push(field.clone());
                }
            }
        }
        fields
    }
}

fn kind_label(topic: &Topic) -> String {
    match topic.axis() {
        Some(axis) => format!("{:?}", axis),
        None => "FormState".to_string(),
    }
}

/// A comprehensive audit report
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// Number of journal entries kept
    pub total_entries: usize,
    /// Number of entries evicted by the journal's limit
    pub dropped_entries: u64,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
    /// Count per axis, plus `FormState` for aggregate reports
    pub event_counts: IndexMap<String, u64>,
    /// Field-level entries per field
    pub field_counts: IndexMap<FieldName, u64>,
    /// Aggregate reports published with `is_valid == false`
    pub invalid_reports: u64,
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Audit Report ===")?;
        writeln!(f, "Total entries: {}", self.total_entries)?;
        writeln!(f, "Dropped entries: {}", self.dropped_entries)?;
        writeln!(f, "Invalid reports: {}", self.invalid_reports)?;

        if let (Some(first), Some(last)) = (self.first_time, self.last_time) {
            writeln!(f, "Time range: {} - {}", first.to_rfc3339(), last.to_rfc3339())?;
        }

        if !self.event_counts.is_empty() {
            writeln!(f, "\nEvents by type:")?;
            let mut sorted: Vec<_> = self.event_counts.iter().collect();
            sorted.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
            for (event, count) in sorted {
                writeln!(f, "  {}: {}", event, count)?;
            }
        }

        if !self.field_counts.is_empty() {
            writeln!(f, "\nEvents by field:")?;
            for (field, count) in &self.field_counts {
                writeln!(f, "  {}: {}", field, count)?;
            }
        }

        Ok(())
    }
}

/// Activity on a single field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSummary {
    pub total: u64,
    pub by_axis: IndexMap<String, u64>,
    /// Last value published for the field
    pub last_value: Option<Value>,
}

/// Query criteria for filtering journal entries
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Start sequence number (inclusive)
    pub start_seq: Option<u64>,
    /// End sequence number (inclusive)
    pub end_seq: Option<u64>,
    /// Filter by field
    pub field: Option<String>,
    /// Filter by axis
    pub axis: Option<Axis>,
    /// Include aggregate report entries in results
    pub include_reports: bool,
}

impl AuditQuery {
    fn matches(&self, entry: &JournalEntry) -> bool {
        if let Some(start) = self.start_seq {
            if entry.seq < start {
                return false;
            }
        }
        if let Some(end) = self.end_seq {
            if entry.seq > end {
                return false;
            }
        }

        match &entry.topic {
            Topic::FormState => self.include_reports,
            Topic::Field { field, axis } => {
                if let Some(ref wanted) = self.field {
                    if field.as_str() != wanted {
                        return false;
                    }
                }
                if let Some(wanted) = self.axis {
                    if *axis != wanted {
                        return false;
                    }
                }
                true
            }
        }
    }
}
