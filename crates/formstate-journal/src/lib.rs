//! Formstate Journal - Recording, auditing and export of command logs
//!
//! Every notification a container publishes is first handed to its logger as
//! a `CommandLog`. This crate provides a logger that keeps those entries:
//!
//! - **Journal**: Bounded in-memory recording with per-field lookup
//! - **Auditor**: Counts and queries over recorded entries
//! - **Exporter**: Export journal data to various formats
//!
//! # Example
//!
//! ```
//! use formstate_core::{FieldConfig, StateContainer};
//! use formstate_journal::{Auditor, ExportFormat, Exporter, Journal};
//!
//! let journal = Journal::new();
//! journal.start_recording();
//!
//! let form = StateContainer::builder()
//!     .field("email", FieldConfig::new())
//!     .logger_rc(journal.logger())
//!     .build()
//!     .unwrap();
//! form.set_value("email", "ada@example.com").unwrap();
//!
//! let report = Auditor::new(&journal).generate_report();
//! println!("{}", report);
//!
//! let text = Exporter::new(&journal).export(ExportFormat::Text).unwrap();
//! assert!(text.contains("email:INPUT_VALUE_CHANGED"));
//! ```

mod auditor;
mod error;
mod exporter;
mod journal;

pub use auditor::{AuditQuery, AuditReport, Auditor, FieldSummary};
pub use error::{Error, Result};
pub use exporter::{ExportFormat, Exporter};
pub use journal::{Journal, JournalConfig, JournalEntry, JournalStats};
