//! Aggregate form report and the diff helpers behind it
//!
//! The report is derived data: the container rebuilds it after each logical
//! mutation and replaces the previous one wholesale.

use crate::{ErrorState, FieldConfigs, FieldName, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Debug text of a report with nothing to complain about
pub const ALL_GOOD: &str = "Everything is ok";

/// Error shadow: only failing fields have an entry, in insertion order
pub type ErrorMap = IndexMap<FieldName, ErrorState>;

/// Snapshot of the whole form's validity and change status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStateReport {
    /// The current record
    pub state: Record,
    pub is_valid: bool,
    /// True iff `changes` is non-empty
    pub has_changed: bool,
    /// Fields whose value differs from the baseline
    pub changes: Record,
    /// Failing fields and their messages
    pub errors: IndexMap<FieldName, String>,
    pub touched_fields: IndexMap<FieldName, bool>,
    /// Why `is_valid` is false, or [`ALL_GOOD`]
    pub debug: String,
}

impl Default for FormStateReport {
    fn default() -> Self {
        Self {
            state: Record::new(),
            is_valid: true,
            has_changed: false,
            changes: Record::new(),
            errors: IndexMap::new(),
            touched_fields: IndexMap::new(),
            debug: ALL_GOOD.to_string(),
        }
    }
}

/// Fields of `current` whose value differs from `baseline`
///
/// Equal records short-circuit to an empty result. Equality is structural
/// (by type and value, NaN equal to NaN); key order does not matter.
pub fn changes(baseline: &Record, current: &Record) -> Record {
    if baseline == current {
        return Record::new();
    }
    current
        .iter()
        .filter(|(key, value)| baseline.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// True when no field is failing
pub fn is_error_free(errors: &ErrorMap) -> bool {
    errors.is_empty()
}

/// Message of the earliest recorded failure, or an empty string
pub fn first_error_message(errors: &ErrorMap) -> String {
    errors
        .values()
        .next()
        .map(|state| state.message.clone())
        .unwrap_or_default()
}

/// Flatten the error shadow into field → message
pub fn error_messages(errors: &ErrorMap) -> IndexMap<FieldName, String> {
    errors
        .iter()
        .map(|(name, state)| (name.clone(), state.message.clone()))
        .collect()
}

/// Inputs to [`build_report`]
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub current: &'a Record,
    pub baseline: &'a Record,
    pub configs: &'a FieldConfigs,
    pub touched: &'a IndexMap<FieldName, bool>,
    pub errors: &'a ErrorMap,
}

/// Compute the aggregate report
///
/// Required fields that were never touched fail the report first, in
/// declaration order. Only then is the error shadow consulted.
pub fn build_report(inputs: ReportInputs<'_>) -> FormStateReport {
    let changes = changes(inputs.baseline, inputs.current);

    let untouched_required = inputs.configs.iter().find(|(name, config)| {
        config.is_required() && !inputs.touched.get(*name).copied().unwrap_or(false)
    });

    let (is_valid, debug) = match untouched_required {
        Some((name, _)) => (
            false,
            format!("Field {} is required and has not been touched yet", name),
        ),
        None if !is_error_free(inputs.errors) => (false, first_error_message(inputs.errors)),
        None => (true, ALL_GOOD.to_string()),
    };

    FormStateReport {
        state: inputs.current.clone(),
        is_valid,
        has_changed: !changes.is_empty(),
        changes,
        errors: error_messages(inputs.errors),
        touched_fields: inputs.touched.clone(),
        debug,
    }
}
