//! Registry context: shared collaborators for building containers
//!
//! Containers built without an explicit validator or logger take them from a
//! [`RegistryContext`]. A per-thread default instance is available through
//! [`RegistryContext::with_default`]; it starts with [`AcceptAll`] and no
//! logger. Handlers are `Rc`-based, so the default cannot be process-wide.

use crate::{AcceptAll, Logger, StateContainerBuilder, Validator};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

thread_local! {
    static DEFAULT_REGISTRY: RefCell<RegistryContext> = RefCell::new(RegistryContext::default());
}

/// Validator and logger shared by the containers built from it
#[derive(Clone)]
pub struct RegistryContext {
    validator: Rc<dyn Validator>,
    logger: Option<Logger>,
}

impl Default for RegistryContext {
    fn default() -> Self {
        Self {
            validator: Rc::new(AcceptAll),
            logger: None,
        }
    }
}

impl fmt::Debug for RegistryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryContext")
            .field("has_logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl RegistryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Rc::new(validator);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn set_validator(&mut self, validator: Rc<dyn Validator>) {
        self.validator = validator;
    }

    pub fn set_logger(&mut self, logger: Option<Logger>) {
        self.logger = logger;
    }

    pub fn validator(&self) -> Rc<dyn Validator> {
        Rc::clone(&self.validator)
    }

    pub fn logger(&self) -> Option<Logger> {
        self.logger.clone()
    }

    /// A container builder seeded with this registry's collaborators
    pub fn builder(&self) -> StateContainerBuilder {
        StateContainerBuilder::new().registry(self)
    }

    /// Run `f` against this thread's default registry
    pub fn with_default<R>(f: impl FnOnce(&mut RegistryContext) -> R) -> R {
        DEFAULT_REGISTRY.with(|registry| f(&mut registry.borrow_mut()))
    }

    /// A copy of this thread's default registry
    pub fn current_default() -> RegistryContext {
        Self::with_default(|registry| registry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Result, ValidationContext, ValidationOutcome};

    fn reject_all(_: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        Ok(ValidationOutcome::fail("rejected"))
    }

    #[test]
    fn test_default_registry_is_per_thread_and_mutable() {
        assert!(RegistryContext::current_default().logger().is_none());

        RegistryContext::with_default(|registry| {
            registry.set_logger(Some(Rc::new(|_: &crate::CommandLog| {})));
        });
        assert!(RegistryContext::current_default().logger().is_some());

        let other = std::thread::spawn(|| RegistryContext::current_default().logger().is_none())
            .join()
            .unwrap();
        assert!(other);

        RegistryContext::with_default(|registry| registry.set_logger(None));
    }

    #[test]
    fn test_with_validator() {
        let registry = RegistryContext::new().with_validator(reject_all);
        let name = "x".into();
        let rules = crate::Rules::mixed().get();
        let outcome = registry
            .validator()
            .execute(&ValidationContext {
                name: &name,
                value: &crate::Value::Null,
                rules: &rules,
            })
            .unwrap();
        assert!(!outcome.is_valid());
    }
}
