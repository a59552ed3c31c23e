//! Validator contract
//!
//! The container never interprets rules itself. For every field with a rule
//! set it builds a [`ValidationContext`], hands it to the configured
//! [`Validator`] and records the [`ValidationOutcome`] as an [`ErrorState`].

use crate::{FieldName, Result, RuleSet, Value};
use serde::{Deserialize, Serialize};

/// Validation status of one field as published to subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    pub error: bool,
    pub message: String,
}

impl ErrorState {
    /// The "no error" state
    pub fn cleared() -> Self {
        Self::default()
    }

    /// A failing state with `message`
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

/// Input handed to a validator
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub name: &'a FieldName,
    pub value: &'a Value,
    pub rules: &'a RuleSet,
}

/// What a validator decided
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    valid: bool,
    pub message: String,
}

impl ValidationOutcome {
    /// A passing outcome
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    /// A failing outcome carrying `message`
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Convert into the published error state
    pub fn into_error_state(self) -> ErrorState {
        ErrorState {
            error: !self.valid,
            message: self.message,
        }
    }
}

/// Pluggable validation strategy
///
/// Errors returned here are not caught by the container; they surface from
/// whichever mutation triggered validation.
pub trait Validator {
    fn execute(&self, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome>;
}

impl<F> Validator for F
where
    F: Fn(&ValidationContext<'_>) -> Result<ValidationOutcome>,
{
    fn execute(&self, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        self(ctx)
    }
}

/// Validator that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn execute(&self, _ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        Ok(ValidationOutcome::pass())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Rules};

    #[test]
    fn test_outcome_to_error_state() {
        assert_eq!(ValidationOutcome::pass().into_error_state(), ErrorState::cleared());
        assert_eq!(
            ValidationOutcome::fail("nope").into_error_state(),
            ErrorState::failed("nope")
        );
    }

    #[test]
    fn test_closure_validator() {
        let validator = |ctx: &ValidationContext<'_>| -> Result<ValidationOutcome> {
            match ctx.value {
                Value::Null => Err(Error::validator(ctx.name.as_str(), "no value")),
                _ => Ok(ValidationOutcome::pass()),
            }
        };
        let name = FieldName::new("age");
        let rules = Rules::number().get();

        let ctx = ValidationContext {
            name: &name,
            value: &Value::Int(3),
            rules: &rules,
        };
        assert!(validator.execute(&ctx).unwrap().is_valid());

        let ctx = ValidationContext {
            value: &Value::Null,
            ..ctx
        };
        assert!(validator.execute(&ctx).is_err());
    }
}
