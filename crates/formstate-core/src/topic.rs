//! Structured notification topics

use crate::FieldName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The observable axis of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Value,
    Visibility,
    Disabled,
    ViewMode,
    Validation,
    OptionsRefresh,
}

impl Axis {
    /// Every axis, in a stable order
    pub const ALL: [Axis; 6] = [
        Axis::Value,
        Axis::Visibility,
        Axis::Disabled,
        Axis::ViewMode,
        Axis::Validation,
        Axis::OptionsRefresh,
    ];

    /// Legacy event suffix for this axis
    pub fn event_suffix(&self) -> &'static str {
        match self {
            Axis::Value => "INPUT_VALUE_CHANGED",
            Axis::Visibility => "INPUT_HIDDEN_CHANGED",
            Axis::Disabled => "INPUT_DISABLED_CHANGED",
            Axis::ViewMode => "INPUT_VIEW_MODE_CHANGED",
            Axis::Validation => "INPUT_VALIDATION_CHANGED",
            Axis::OptionsRefresh => "INPUT_REFRESH_OPTIONS",
        }
    }
}

/// Routing key on the notification channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// A change on one axis of one field
    Field { field: FieldName, axis: Axis },
    /// The aggregate report was replaced
    FormState,
}

impl Topic {
    pub fn field(field: impl Into<FieldName>, axis: Axis) -> Self {
        Topic::Field {
            field: field.into(),
            axis,
        }
    }

    /// The field this topic is about, if any
    pub fn field_name(&self) -> Option<&FieldName> {
        match self {
            Topic::Field { field, .. } => Some(field),
            Topic::FormState => None,
        }
    }

    pub fn axis(&self) -> Option<Axis> {
        match self {
            Topic::Field { axis, .. } => Some(*axis),
            Topic::FormState => None,
        }
    }
}

impl fmt::Display for Topic {
    /// Renders the event names used in command logs,
    /// e.g. `email:INPUT_VALUE_CHANGED` or `FORM_STATE_CHANGED`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Field { field, axis } => write!(f, "{}:{}", field, axis.event_suffix()),
            Topic::FormState => f.write_str("FORM_STATE_CHANGED"),
        }
    }
}
