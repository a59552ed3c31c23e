//! Constraint checks behind [`RuleValidator`]

use formstate_core::{
    rules::REQUIRED, Constraint, Error, Result, ValidationContext, ValidationOutcome, Validator,
    Value,
};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

/// Validator interpreting rule sets built with `formstate_core::Rules`
///
/// Compiled patterns are cached per validator instance.
#[derive(Debug, Default)]
pub struct RuleValidator {
    patterns: RefCell<HashMap<String, Regex>>,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct patterns compiled so far
    pub fn cached_patterns(&self) -> usize {
        self.patterns.borrow().len()
    }

    fn check(&self, ctx: &ValidationContext<'_>, constraint: &Constraint) -> Result<bool> {
        let value = ctx.value;
        let method = constraint.method.as_str();

        if method == REQUIRED {
            return Ok(!value.is_empty());
        }
        // Absent values are only the `required` rule's business
        if value.is_null() {
            return Ok(true);
        }

        let passed = match method {
            "min" => measure(ctx, value)? >= bound(ctx, constraint)?,
            "max" => measure(ctx, value)? <= bound(ctx, constraint)?,
            "length" => measure(ctx, value)? == bound(ctx, constraint)?,
            "lessThan" => number(ctx, value)? < bound(ctx, constraint)?,
            "moreThan" => number(ctx, value)? > bound(ctx, constraint)?,
            "positive" => number(ctx, value)? > 0.0,
            "negative" => number(ctx, value)? < 0.0,
            "lowercase" => text(ctx, value)? == text(ctx, value)?.to_lowercase(),
            "uppercase" => text(ctx, value)? == text(ctx, value)?.to_uppercase(),
            "matches" => {
                let pattern = match param(ctx, constraint)? {
                    Value::String(pattern) => pattern,
                    other => {
                        return Err(Error::validator(
                            ctx.name.as_str(),
                            format!("pattern must be a string, got {}", other.type_name()),
                        ))
                    }
                };
                self.is_match(ctx, pattern, text(ctx, value)?)?
            }
            "oneOf" => choices(ctx, constraint)?.contains(value),
            "notOneOf" => !choices(ctx, constraint)?.contains(value),
            unknown => {
                tracing::debug!(field = %ctx.name, method = unknown, "skipping unknown constraint");
                true
            }
        };
        Ok(passed)
    }

    fn is_match(&self, ctx: &ValidationContext<'_>, pattern: &str, text: &str) -> Result<bool> {
        if let Some(regex) = self.patterns.borrow().get(pattern) {
            return Ok(regex.is_match(text));
        }
        let regex = Regex::new(pattern).map_err(|err| {
            Error::validator(ctx.name.as_str(), format!("invalid pattern {:?}: {}", pattern, err))
        })?;
        let matched = regex.is_match(text);
        self.patterns
            .borrow_mut()
            .insert(pattern.to_string(), regex);
        Ok(matched)
    }
}

impl Validator for RuleValidator {
    fn execute(&self, ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        for constraint in &ctx.rules.constraints {
            if !self.check(ctx, constraint)? {
                tracing::trace!(field = %ctx.name, method = %constraint.method, "constraint failed");
                return Ok(ValidationOutcome::fail(constraint.params.message.clone()));
            }
        }
        Ok(ValidationOutcome::pass())
    }
}

fn param<'c>(ctx: &ValidationContext<'_>, constraint: &'c Constraint) -> Result<&'c Value> {
    constraint.params.value.as_ref().ok_or_else(|| {
        Error::validator(
            ctx.name.as_str(),
            format!("constraint {} needs a value", constraint.method),
        )
    })
}

fn bound(ctx: &ValidationContext<'_>, constraint: &Constraint) -> Result<f64> {
    let value = param(ctx, constraint)?;
    value.as_float().ok_or_else(|| {
        Error::validator(
            ctx.name.as_str(),
            format!(
                "bound of {} must be numeric, got {}",
                constraint.method,
                value.type_name()
            ),
        )
    })
}

fn choices<'c>(ctx: &ValidationContext<'_>, constraint: &'c Constraint) -> Result<&'c [Value]> {
    let value = param(ctx, constraint)?;
    value.as_list().ok_or_else(|| {
        Error::validator(
            ctx.name.as_str(),
            format!("{} expects a list, got {}", constraint.method, value.type_name()),
        )
    })
}

/// Characters of a string, items of a list, or the number itself
fn measure(ctx: &ValidationContext<'_>, value: &Value) -> Result<f64> {
    match value {
        Value::String(s) => Ok(s.chars().count() as f64),
        Value::List(items) => Ok(items.len() as f64),
        _ => number(ctx, value),
    }
}

fn number(ctx: &ValidationContext<'_>, value: &Value) -> Result<f64> {
    value.as_float().ok_or_else(|| {
        Error::validator(
            ctx.name.as_str(),
            format!("expected a number, got {}", value.type_name()),
        )
    })
}

fn text<'v>(ctx: &ValidationContext<'_>, value: &'v Value) -> Result<&'v str> {
    value.as_str().ok_or_else(|| {
        Error::validator(
            ctx.name.as_str(),
            format!("expected a string, got {}", value.type_name()),
        )
    })
}
