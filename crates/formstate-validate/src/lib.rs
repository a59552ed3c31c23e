//! Formstate Validate - rule-set interpretation
//!
//! [`RuleValidator`] implements the [`Validator`] contract of
//! `formstate-core` by walking a [`RuleSet`]'s constraints in order. The
//! first failing constraint decides the outcome and supplies the message.
//!
//! Supported methods: `required`, `min`, `max`, `length`, `lowercase`,
//! `uppercase`, `matches`, `lessThan`, `moreThan`, `positive`, `negative`,
//! `oneOf` and `notOneOf`. Anything else is skipped with a debug trace.
//!
//! ```
//! use formstate_core::{FieldConfig, Rules, StateContainer};
//! use formstate_validate::RuleValidator;
//!
//! let form = StateContainer::builder()
//!     .value("email", "")
//!     .field("email", FieldConfig::new().with_rules(Rules::string().email("Bad email").get()))
//!     .validator(RuleValidator::new())
//!     .build()
//!     .unwrap();
//!
//! form.set_value("email", "nope").unwrap();
//! assert_eq!(form.error_state("email").message, "Bad email");
//! ```

mod validator;

pub use validator::RuleValidator;

#[doc(no_inline)]
pub use formstate_core::{RuleSet, Validator};
