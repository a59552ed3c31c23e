//! Validation rule descriptors and their builders
//!
//! A [`RuleSet`] is opaque to the state container: it is stored per field and
//! handed to the [`Validator`](crate::Validator) untouched. The serialized
//! shape is
//!
//! ```text
//! { kind: "string" | "number" | "mixed",
//!   constraints: [ { method: "...", params: { value?, message } }, ... ] }
//! ```
//!
//! and is what independently written validators consume.

use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Method name of the requiredness constraint
pub const REQUIRED: &str = "required";

/// Pattern used by [`StringRules::email`]
pub const EMAIL_PATTERN: &str = r"^$|^[\w.%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

/// Pattern used by [`StringRules::secure_password`]: a letter and a digit,
/// alphanumerics only
pub const SECURE_PASSWORD_PATTERN: &str =
    r"^(?:[A-Za-z\d]*[A-Za-z][A-Za-z\d]*\d|[A-Za-z\d]*\d[A-Za-z\d]*[A-Za-z])[A-Za-z\d]*$";

/// Pattern used by [`StringRules::nif`]: alphanumeric, not opening with two digits
pub const NIF_PATTERN: &str = r"^(?:[a-zA-Z]|[0-9](?:[^0-9]|$))";

/// The value family a rule set applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    String,
    Number,
    Mixed,
}

impl RuleKind {
    /// Whether `value` belongs to this family
    ///
    /// Null is accepted everywhere; emptiness is the `required` rule's concern.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            RuleKind::String => matches!(value, Value::Null | Value::String(_)),
            RuleKind::Number => matches!(value, Value::Null | Value::Int(_) | Value::Float(_)),
            RuleKind::Mixed => true,
        }
    }

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::String => "string",
            RuleKind::Number => "number",
            RuleKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintParams {
    /// Bound, pattern or allowed set, depending on the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Message reported when the constraint fails
    pub message: String,
}

/// One `{ method, params }` entry of a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub method: String,
    pub params: ConstraintParams,
}

impl Constraint {
    /// Constraint without a parameter value
    pub fn new(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: ConstraintParams {
                value: None,
                message: message.into(),
            },
        }
    }

    /// Constraint carrying a parameter value
    pub fn with_value(
        method: impl Into<String>,
        value: impl Into<Value>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            params: ConstraintParams {
                value: Some(value.into()),
                message: message.into(),
            },
        }
    }
}

/// Ordered constraints for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub kind: RuleKind,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl RuleSet {
    /// Empty rule set of the given kind
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            constraints: Vec::new(),
        }
    }

    /// Whether any constraint is `required`
    pub fn is_required(&self) -> bool {
        self.constraints.iter().any(|c| c.method == REQUIRED)
    }
}

/// Entry point for the rule builders
pub struct Rules;

impl Rules {
    pub fn string() -> StringRules {
        StringRules::default()
    }

    pub fn number() -> NumberRules {
        NumberRules::default()
    }

    pub fn mixed() -> MixedRules {
        MixedRules::default()
    }
}

/// Builder for string rule sets
#[derive(Debug, Default, Clone)]
pub struct StringRules {
    constraints: Vec<Constraint>,
}

impl StringRules {
    /// The string must be present and non-empty
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new(REQUIRED, message));
        self
    }

    /// The string must be empty or look like an email address
    pub fn email(mut self, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("matches", EMAIL_PATTERN, message));
        self
    }

    /// Minimum length in characters
    pub fn min(mut self, value: i64, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("min", value, message));
        self
    }

    /// Maximum length in characters
    pub fn max(mut self, value: i64, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("max", value, message));
        self
    }

    pub fn lowercase(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new("lowercase", message));
        self
    }

    pub fn uppercase(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new("uppercase", message));
        self
    }

    /// The string must match a regular expression
    pub fn matches(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("matches", pattern.into(), message));
        self
    }

    /// Exact length in characters
    pub fn length(mut self, value: i64, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("length", value, message));
        self
    }

    /// At least eight alphanumerics mixing letters and digits
    ///
    /// Appends a `min 8` length floor followed by a `matches` constraint on
    /// [`SECURE_PASSWORD_PATTERN`], both with `message`. The pattern is
    /// anchored at both ends, so the whole value must be alphanumeric:
    /// `abcd1234!` fails even though its first eight characters would pass.
    pub fn secure_password(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.constraints
            .push(Constraint::with_value("min", 8i64, message.clone()));
        self.constraints.push(Constraint::with_value(
            "matches",
            SECURE_PASSWORD_PATTERN,
            message,
        ));
        self
    }

    /// Spanish tax identifier shape
    pub fn nif(mut self, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("matches", NIF_PATTERN, message));
        self
    }

    /// Finish the rule set
    pub fn get(self) -> RuleSet {
        RuleSet {
            kind: RuleKind::String,
            constraints: self.constraints,
        }
    }
}

/// Builder for number rule sets
#[derive(Debug, Default, Clone)]
pub struct NumberRules {
    constraints: Vec<Constraint>,
}

impl NumberRules {
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new(REQUIRED, message));
        self
    }

    /// Value must be at least `value`
    pub fn min(mut self, value: impl Into<Value>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("min", value, message));
        self
    }

    /// Value must be at most `value`
    pub fn max(mut self, value: impl Into<Value>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("max", value, message));
        self
    }

    /// Value must be strictly less than `value`
    pub fn less_than(mut self, value: impl Into<Value>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("lessThan", value, message));
        self
    }

    /// Value must be strictly greater than `value`
    pub fn more_than(mut self, value: impl Into<Value>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("moreThan", value, message));
        self
    }

    pub fn positive(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new("positive", message));
        self
    }

    pub fn negative(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new("negative", message));
        self
    }

    pub fn get(self) -> RuleSet {
        RuleSet {
            kind: RuleKind::Number,
            constraints: self.constraints,
        }
    }
}

/// Builder for rule sets over any value
#[derive(Debug, Default, Clone)]
pub struct MixedRules {
    constraints: Vec<Constraint>,
}

impl MixedRules {
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.constraints.push(Constraint::new(REQUIRED, message));
        self
    }

    /// Value must be one of `values`
    pub fn one_of(mut self, values: Vec<Value>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("oneOf", values, message));
        self
    }

    /// Value must not be any of `values`
    pub fn not_one_of(mut self, values: Vec<Value>, message: impl Into<String>) -> Self {
        self.constraints
            .push(Constraint::with_value("notOneOf", values, message));
        self
    }

    pub fn get(self) -> RuleSet {
        RuleSet {
            kind: RuleKind::Mixed,
            constraints: self.constraints,
        }
    }
}
