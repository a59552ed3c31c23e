//! Formstate Core - Observable per-field form state
//!
//! This crate provides the building blocks of a form session:
//! - Dynamic values and records (`Value`, `Record`)
//! - A synchronous named-topic channel (`NotificationChannel`)
//! - A change dispatcher with a fixed topic vocabulary and a logging hook
//! - The state container holding values, visibility, enablement, view mode,
//!   touched and error state per field
//! - The aggregate `FormStateReport` and the diff helpers behind it
//! - Validation rule builders and the `Validator` contract
//!
//! ## Example
//!
//! ```
//! use formstate_core::{FieldConfig, Rules, StateContainer};
//!
//! let form = StateContainer::builder()
//!     .value("email", "")
//!     .field(
//!         "email",
//!         FieldConfig::new().with_rules(Rules::string().required("Email is required").get()),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert!(!form.state_report().is_valid);
//! form.set_value("email", "ada@example.com").unwrap();
//! assert!(form.state_report().is_valid);
//! ```
//!
//! Rule enforcement lives outside this crate; see `formstate-validate`.

mod channel;
mod config;
mod dispatch;
mod error;
mod identity;
mod registry;
pub mod report;
pub mod rules;
mod state;
mod topic;
mod validation;
mod value;

pub use channel::{Handler, HandlerId, NotificationChannel, Unsubscribe};
pub use config::{FieldConfig, FieldConfigs, ViewMode};
pub use dispatch::{ChangeDispatcher, CommandLog, FormChannel, LogKind, Logger, OptionMap, Payload};
pub use error::{Error, Result};
pub use identity::FieldName;
pub use registry::RegistryContext;
pub use report::{build_report, changes, ErrorMap, FormStateReport, ReportInputs, ALL_GOOD};
pub use rules::{
    Constraint, ConstraintParams, MixedRules, NumberRules, RuleKind, RuleSet, Rules, StringRules,
};
pub use state::{StateContainer, StateContainerBuilder};
pub use topic::{Axis, Topic};
pub use validation::{AcceptAll, ErrorState, ValidationContext, ValidationOutcome, Validator};
pub use value::{Record, Value, ValueMap};
