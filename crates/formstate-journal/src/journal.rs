//! In-memory recording of command logs
//!
//! A [`Journal`] is a cloneable handle; the logger it hands out records into
//! the same storage, so the journal can be inspected while the container is
//! alive.

use chrono::{DateTime, Utc};
use formstate_core::{CommandLog, Logger, Payload, Topic};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0; never reused
    pub seq: u64,
    /// Legacy event name, e.g. `email:INPUT_VALUE_CHANGED`
    pub event: String,
    pub topic: Topic,
    pub payload: Payload,
    pub time: DateTime<Utc>,
}

impl JournalEntry {
    /// Name of the field this entry is about, if any
    pub fn field(&self) -> Option<&str> {
        self.topic.field_name().map(|name| name.as_str())
    }
}

/// Configuration for the journal
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Whether recording is enabled
    pub recording_enabled: bool,
    /// Maximum number of entries to keep (0 = unlimited)
    pub max_entries: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            recording_enabled: false,
            max_entries: 0, // Unlimited
        }
    }
}

/// Statistics about the journal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalStats {
    /// Entries currently kept
    pub total_entries: usize,
    /// Entries evicted by `max_entries`
    pub dropped_entries: u64,
    /// Entries about a single field
    pub field_entries: usize,
    /// Aggregate report entries
    pub report_entries: usize,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct JournalState {
    config: JournalConfig,
    entries: Vec<JournalEntry>,
    next_seq: u64,
    dropped: u64,
}

/// Recorder for the command logs of one or more containers
#[derive(Debug, Clone, Default)]
pub struct Journal {
    state: Rc<RefCell<JournalState>>,
}

impl Journal {
    /// Create a journal with the default configuration (not recording)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a journal with custom configuration
    pub fn with_config(config: JournalConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(JournalState {
                config,
                ..Default::default()
            })),
        }
    }

    pub fn start_recording(&self) {
        self.state.borrow_mut().config.recording_enabled = true;
    }

    pub fn stop_recording(&self) {
        self.state.borrow_mut().config.recording_enabled = false;
    }

    pub fn is_recording(&self) -> bool {
        self.state.borrow().config.recording_enabled
    }

    /// A logger recording into this journal
    ///
    /// The logger holds a weak reference: once every `Journal` handle is
    /// dropped it does nothing.
    pub fn logger(&self) -> Logger {
        let state = Rc::downgrade(&self.state);
        Rc::new(move |log: &CommandLog| {
            if let Some(state) = state.upgrade() {
                Journal { state }.record(log);
            }
        })
    }

    /// Record one command log, if recording
    pub fn record(&self, log: &CommandLog) {
        let mut state = self.state.borrow_mut();
        if !state.config.recording_enabled {
            return;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.push(JournalEntry {
            seq,
            event: log.event.clone(),
            topic: log.topic.clone(),
            payload: log.payload.clone(),
            time: log.time,
        });
        Self::enforce_limits(&mut state);
    }

    /// Copy of every kept entry, oldest first
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.state.borrow().entries.clone()
    }

    /// Entries about `field`, oldest first
    pub fn entries_for(&self, field: &str) -> Vec<JournalEntry> {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.field() == Some(field))
            .cloned()
            .collect()
    }

    /// Entries with `start <= seq <= end`
    pub fn entries_in_range(&self, start: u64, end: u64) -> Vec<JournalEntry> {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.seq >= start && entry.seq <= end)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Drop every entry; sequence numbers keep counting
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.entries.clear();
        state.dropped = 0;
    }

    pub fn stats(&self) -> JournalStats {
        let state = self.state.borrow();
        let report_entries = state
            .entries
            .iter()
            .filter(|entry| entry.topic == Topic::FormState)
            .count();

        JournalStats {
            total_entries: state.entries.len(),
            dropped_entries: state.dropped,
            field_entries: state.entries.len() - report_entries,
            report_entries,
            first_time: state.entries.first().map(|entry| entry.time),
            last_time: state.entries.last().map(|entry| entry.time),
        }
    }

    fn enforce_limits(state: &mut JournalState) {
        if state.config.max_entries > 0 && state.entries.len() > state.config.max_entries {
            let excess = state.entries.len() - state.config.max_entries;
            state.entries.drain(0..excess);
            state.dropped += excess as u64;
            tracing::trace!(excess, "journal evicted oldest entries");
        }
    }
}
