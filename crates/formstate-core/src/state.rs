//! State container: the authoritative record and its per-field shadow state
//!
//! The container owns
//! - the current record and the baseline it is diffed against,
//! - one shadow map per observable axis (value, touched, hidden, disabled,
//!   view mode, error),
//! - the field configurations and the validator.
//!
//! Each mutation updates the shadows, publishes fine-grained notifications
//! and, for logical operations that can change validity, rebuilds the
//! [`FormStateReport`] and publishes it once, after every per-field event it
//! caused.
//!
//! # Re-entrancy
//!
//! `StateContainer` is a cloneable handle and every method takes `&self`. No
//! internal borrow is held while subscribers run, so a subscriber may call
//! back into the container. Unbounded feedback loops are the caller's
//! problem.
//!
//! # Unregistered fields
//!
//! The current record holds exactly the configured fields. Mutations naming
//! any other field are ignored (traced at debug level). Subscriptions to an
//! unregistered field are accepted and replay the axis default.

use crate::report::{self, build_report, ErrorMap, ReportInputs};
use crate::{
    ChangeDispatcher, CommandLog, Error, ErrorState, FieldConfig, FieldConfigs, FieldName,
    FormChannel, FormStateReport, Logger, OptionMap, Record, RegistryContext, Result, RuleSet,
    Unsubscribe, ValidationContext, Validator, Value, ViewMode,
};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct Shadow {
    current: Record,
    baseline: Record,
    values: IndexMap<FieldName, Value>,
    touched: IndexMap<FieldName, bool>,
    hidden: IndexMap<FieldName, bool>,
    disabled: IndexMap<FieldName, bool>,
    view_modes: IndexMap<FieldName, ViewMode>,
    errors: ErrorMap,
    report: Rc<FormStateReport>,
}

struct ContainerInner {
    configs: FieldConfigs,
    dispatcher: ChangeDispatcher,
    validator: RefCell<Rc<dyn Validator>>,
    shadow: RefCell<Shadow>,
}

/// Observable per-field state of one form session
#[derive(Clone)]
pub struct StateContainer {
    inner: Rc<ContainerInner>,
}

impl fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContainer")
            .field("fields", &self.inner.configs.len())
            .field("dispatcher", &self.inner.dispatcher)
            .field("shadow", &self.inner.shadow.borrow())
            .finish()
    }
}

/// Builder for [`StateContainer`]
#[derive(Default)]
pub struct StateContainerBuilder {
    record: Record,
    configs: FieldConfigs,
    validator: Option<Rc<dyn Validator>>,
    logger: Option<Logger>,
    channel: Option<FormChannel>,
}

impl StateContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial record; also the initial baseline
    pub fn record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    /// Set one initial value
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.insert(name.into(), value.into());
        self
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<FieldName>, config: FieldConfig) -> Self {
        self.configs.insert(name.into(), config);
        self
    }

    /// Declare several fields, keeping their order
    pub fn fields(mut self, configs: FieldConfigs) -> Self {
        self.configs.extend(configs);
        self
    }

    pub fn validator(self, validator: impl Validator + 'static) -> Self {
        self.validator_rc(Rc::new(validator))
    }

    pub fn validator_rc(mut self, validator: Rc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn logger(mut self, logger: impl Fn(&CommandLog) + 'static) -> Self {
        self.logger = Some(Rc::new(logger));
        self
    }

    pub fn logger_rc(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Publish on an existing channel instead of a private one
    pub fn channel(mut self, channel: FormChannel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Take the validator and logger from `registry` unless already set
    pub fn registry(mut self, registry: &RegistryContext) -> Self {
        if self.validator.is_none() {
            self.validator = Some(registry.validator());
        }
        if self.logger.is_none() {
            self.logger = registry.logger();
        }
        self
    }

    /// Build the container and publish its initial state
    ///
    /// Fails when an initial value does not fit its field's rule kind.
    /// Missing collaborators come from the thread's default registry.
    pub fn build(self) -> Result<StateContainer> {
        let Self {
            record,
            configs,
            validator,
            logger,
            channel,
        } = self;

        let defaults = RegistryContext::current_default();
        let validator = validator.unwrap_or_else(|| defaults.validator());
        let logger = logger.or_else(|| defaults.logger());

        let current = project(&configs, &record);
        for (name, value) in &current {
            if let Some(config) = configs.get(name.as_str()) {
                check_kind(name, config, value)?;
            }
        }
        for extra in record.keys().filter(|key| !configs.contains_key(key.as_str())) {
            tracing::debug!(field = %extra, "dropping value for unregistered field");
        }

        let mut shadow = Shadow {
            baseline: current.clone(),
            values: IndexMap::new(),
            touched: IndexMap::new(),
            hidden: IndexMap::new(),
            disabled: IndexMap::new(),
            view_modes: IndexMap::new(),
            errors: ErrorMap::new(),
            report: Rc::new(FormStateReport::default()),
            current,
        };
        for (name, config) in &configs {
            let value = shadow.current.get(name.as_str()).cloned().unwrap_or_default();
            shadow.values.insert(name.clone(), value);
            shadow.hidden.insert(name.clone(), config.default_hidden);
            shadow.disabled.insert(name.clone(), config.default_disabled);
            shadow.view_modes.insert(name.clone(), config.default_view_mode);
        }

        let container = StateContainer {
            inner: Rc::new(ContainerInner {
                dispatcher: ChangeDispatcher::new(channel.unwrap_or_default(), logger),
                validator: RefCell::new(validator),
                shadow: RefCell::new(shadow),
                configs,
            }),
        };

        tracing::debug!(fields = container.inner.configs.len(), "state container built");
        container.publish_layout(true);
        container.publish_report();
        Ok(container)
    }
}

/// Current record restricted to the configured fields, missing ones as null
fn project(configs: &FieldConfigs, record: &Record) -> Record {
    configs
        .keys()
        .map(|name| {
            let value = record.get(name.as_str()).cloned().unwrap_or_default();
            (name.0.clone(), value)
        })
        .collect()
}

fn check_kind(name: &str, config: &FieldConfig, value: &Value) -> Result<()> {
    match &config.validation_rules {
        Some(rules) if !rules.kind.accepts(value) => Err(Error::TypeMismatch {
            field: name.to_string(),
            expected: rules.kind.to_string(),
            got: value.type_name().to_string(),
        }),
        _ => Ok(()),
    }
}

impl StateContainer {
    pub fn builder() -> StateContainerBuilder {
        StateContainerBuilder::new()
    }

    // =====================================================================
    // Values
    // =====================================================================

    /// Set a field's value, validate it and publish the new report
    ///
    /// Marks the field touched. Fails before any change if the value does not
    /// fit the field's rule kind; validator errors propagate.
    pub fn set_value(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let Some(name) = self.registered(name, "set_value") else {
            return Ok(());
        };
        let value = value.into();
        self.check(&name, &value)?;
        self.apply_value(&name, value, true)?;
        self.publish_report();
        Ok(())
    }

    /// Set a field's value without validating or republishing the report
    pub fn set_value_silent(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let Some(name) = self.registered(name, "set_value_silent") else {
            return Ok(());
        };
        let value = value.into();
        self.check(&name, &value)?;
        self.apply_value(&name, value, false)
    }

    /// Replace the whole record
    ///
    /// Every configured field goes through `set_value` semantics; fields
    /// absent from `record` become null. The report is published once, after
    /// all per-field events.
    pub fn set_record(&self, record: Record) -> Result<()> {
        let projected = project(&self.inner.configs, &record);
        for (name, value) in &projected {
            if let Some(config) = self.inner.configs.get(name.as_str()) {
                check_kind(name, config, value)?;
            }
        }

        for (name, value) in projected {
            self.apply_value(&FieldName::from(name), value, true)?;
        }
        self.publish_report();
        Ok(())
    }

    /// Replace the baseline used for diffing and resets
    ///
    /// Does not touch the current record and publishes nothing.
    pub fn set_baseline(&self, record: Record) {
        let baseline = project(&self.inner.configs, &record);
        self.inner.shadow.borrow_mut().baseline = baseline;
    }

    /// Copy of the current record
    pub fn data(&self) -> Record {
        self.inner.shadow.borrow().current.clone()
    }

    /// Copy of the baseline record
    pub fn baseline(&self) -> Record {
        self.inner.shadow.borrow().baseline.clone()
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.inner.shadow.borrow().values.get(name).cloned()
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.inner
            .shadow
            .borrow()
            .touched
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    // =====================================================================
    // Visibility, enablement, view mode
    // =====================================================================

    pub fn show(&self, name: &str) {
        self.set_hidden(name, false);
    }

    pub fn hide(&self, name: &str) {
        self.set_hidden(name, true);
    }

    pub fn show_many<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.show(name.as_ref());
        }
    }

    pub fn hide_many<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.hide(name.as_ref());
        }
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.inner
            .shadow
            .borrow()
            .hidden
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    pub fn enable(&self, name: &str) {
        self.set_disabled(name, false);
    }

    pub fn disable(&self, name: &str) {
        self.set_disabled(name, true);
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.inner
            .shadow
            .borrow()
            .disabled
            .get(name)
            .copied()
            .unwrap_or(false)
    }

    pub fn set_view_mode(&self, name: &str, mode: ViewMode) {
        let Some(name) = self.registered(name, "set_view_mode") else {
            return;
        };
        self.inner
            .shadow
            .borrow_mut()
            .view_modes
            .insert(name.clone(), mode);
        self.inner.dispatcher.notify_view_mode(&name, mode);
    }

    /// Set the view mode from its wire name; anything but `view` or `edit`
    /// is ignored
    pub fn set_view_mode_named(&self, name: &str, mode: &str) {
        match mode.parse::<ViewMode>() {
            Ok(mode) => self.set_view_mode(name, mode),
            Err(err) => tracing::debug!(field = name, %err, "ignoring view mode"),
        }
    }

    /// Apply `mode` to every configured field
    pub fn set_form_view_mode(&self, mode: ViewMode) {
        for name in self.inner.configs.keys() {
            self.set_view_mode(name.as_str(), mode);
        }
    }

    pub fn view_mode(&self, name: &str) -> ViewMode {
        self.inner
            .shadow
            .borrow()
            .view_modes
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    // =====================================================================
    // Validation
    // =====================================================================

    /// Run the validator for one field and record the outcome
    ///
    /// A passing outcome removes the field's error entry. The validation
    /// topic is published whatever the outcome.
    pub fn validate_input(&self, name: &str, value: &Value, rules: &RuleSet) -> Result<()> {
        let name = FieldName::from(name);
        let validator = Rc::clone(&self.inner.validator.borrow());
        let outcome = validator.execute(&ValidationContext {
            name: &name,
            value,
            rules,
        })?;
        let state = outcome.into_error_state();

        {
            let mut shadow = self.inner.shadow.borrow_mut();
            if state.error {
                shadow.errors.insert(name.clone(), state.clone());
            } else {
                shadow.errors.shift_remove(&name);
            }
        }
        self.inner.dispatcher.notify_validation(&name, &state);
        Ok(())
    }

    /// Validate every field with rules, then publish the report
    pub fn validate_all(&self) -> Result<()> {
        self.validate_where(|_| true)
    }

    /// Validate only the named fields, then publish the report
    pub fn validate_only<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            if let Some(name) = self.registered(name.as_ref(), "validate_only") {
                self.validate_field(&name)?;
            }
        }
        self.publish_report();
        Ok(())
    }

    /// Validate every field except the named ones, then publish the report
    pub fn validate_skip<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skipped: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        self.validate_where(|name| !skipped.iter().any(|s| s == name.as_str()))
    }

    /// True iff no field currently fails validation
    ///
    /// Unlike the report's `is_valid`, requiredness is not considered.
    pub fn is_valid(&self) -> bool {
        report::is_error_free(&self.inner.shadow.borrow().errors)
    }

    pub fn error_state(&self, name: &str) -> ErrorState {
        self.inner
            .shadow
            .borrow()
            .errors
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_validator(&self, validator: impl Validator + 'static) {
        *self.inner.validator.borrow_mut() = Rc::new(validator);
    }

    /// Replace the logger
    ///
    /// `None` is rejected with [`Error::InvalidHandlerType`] and the current
    /// logger stays; use [`clear_logger`](Self::clear_logger) to stop logging.
    pub fn set_logger(&self, logger: Option<Logger>) -> Result<()> {
        self.inner.dispatcher.set_logger_checked(logger)
    }

    /// Stop sending command logs
    pub fn clear_logger(&self) {
        self.inner.dispatcher.set_logger(None);
    }

    // =====================================================================
    // Resets
    // =====================================================================

    /// Clear touched and error state and restore the baseline
    pub fn reset_state(&self) {
        self.restore_baseline();
        self.publish_values_and_cleared_errors();
        self.publish_report();
    }

    /// `reset_state`, plus hidden, disabled and view mode back to their
    /// configured defaults
    pub fn hard_reset_state(&self) {
        self.restore_baseline();
        {
            let mut shadow = self.inner.shadow.borrow_mut();
            for (name, config) in &self.inner.configs {
                shadow.hidden.insert(name.clone(), config.default_hidden);
                shadow.disabled.insert(name.clone(), config.default_disabled);
                shadow
                    .view_modes
                    .insert(name.clone(), config.default_view_mode);
            }
        }
        self.publish_layout(false);
        self.publish_values_and_cleared_errors();
        self.publish_report();
    }

    /// Clear every field's error without touching values or touched state
    pub fn reset_errors(&self) {
        self.inner.shadow.borrow_mut().errors.clear();
        let cleared = ErrorState::cleared();
        for name in self.inner.configs.keys() {
            self.inner.dispatcher.notify_validation(name, &cleared);
        }
        self.publish_report();
    }

    // =====================================================================
    // Report and options
    // =====================================================================

    /// The most recently published report
    pub fn state_report(&self) -> Rc<FormStateReport> {
        Rc::clone(&self.inner.shadow.borrow().report)
    }

    /// Broadcast new options for a field; no state is kept
    pub fn refresh_options(&self, name: &str, options: OptionMap) {
        self.inner
            .dispatcher
            .notify_options(&FieldName::from(name), options);
    }

    /// The channel notifications are published on
    pub fn channel(&self) -> &FormChannel {
        self.inner.dispatcher.channel()
    }

    // =====================================================================
    // Subscriptions
    //
    // Each accessor first calls the handler with the current shadow value,
    // then registers it for future changes.
    // =====================================================================

    pub fn on_value_change(&self, name: &str, handler: impl Fn(&Value) + 'static) -> Unsubscribe {
        let name = FieldName::from(name);
        let current = self
            .inner
            .shadow
            .borrow()
            .values
            .get(&name)
            .cloned()
            .unwrap_or_default();
        handler(&current);
        self.inner.dispatcher.subscribe_value(&name, handler)
    }

    pub fn on_visibility_change(&self, name: &str, handler: impl Fn(bool) + 'static) -> Unsubscribe {
        handler(self.is_hidden(name));
        self.inner
            .dispatcher
            .subscribe_visibility(&FieldName::from(name), handler)
    }

    pub fn on_disabled_change(&self, name: &str, handler: impl Fn(bool) + 'static) -> Unsubscribe {
        handler(self.is_disabled(name));
        self.inner
            .dispatcher
            .subscribe_disabled(&FieldName::from(name), handler)
    }

    pub fn on_view_mode_change(
        &self,
        name: &str,
        handler: impl Fn(ViewMode) + 'static,
    ) -> Unsubscribe {
        handler(self.view_mode(name));
        self.inner
            .dispatcher
            .subscribe_view_mode(&FieldName::from(name), handler)
    }

    pub fn on_validation_change(
        &self,
        name: &str,
        handler: impl Fn(&ErrorState) + 'static,
    ) -> Unsubscribe {
        handler(&self.error_state(name));
        self.inner
            .dispatcher
            .subscribe_validation(&FieldName::from(name), handler)
    }

    /// Options carry no shadow state, so nothing is replayed
    pub fn on_options_refresh(
        &self,
        name: &str,
        handler: impl Fn(&OptionMap) + 'static,
    ) -> Unsubscribe {
        self.inner
            .dispatcher
            .subscribe_options(&FieldName::from(name), handler)
    }

    pub fn on_report_change(
        &self,
        handler: impl Fn(&FormStateReport) + 'static,
    ) -> Unsubscribe {
        let report = self.state_report();
        handler(&report);
        self.inner.dispatcher.subscribe_report(handler)
    }

    // =====================================================================
    // Internals
    // =====================================================================

    fn registered(&self, name: &str, operation: &'static str) -> Option<FieldName> {
        let found = self
            .inner
            .configs
            .get_key_value(name)
            .map(|(key, _)| key.clone());
        if found.is_none() {
            tracing::debug!(field = name, operation, "ignoring unregistered field");
        }
        found
    }

    fn config(&self, name: &FieldName) -> Option<&FieldConfig> {
        self.inner.configs.get(name)
    }

    fn check(&self, name: &FieldName, value: &Value) -> Result<()> {
        match self.config(name) {
            Some(config) => check_kind(name.as_str(), config, value),
            None => Ok(()),
        }
    }

    fn apply_value(&self, name: &FieldName, value: Value, validate: bool) -> Result<()> {
        {
            let mut shadow = self.inner.shadow.borrow_mut();
            shadow.current.insert(name.0.clone(), value.clone());
            shadow.values.insert(name.clone(), value.clone());
            shadow.touched.insert(name.clone(), true);
        }
        self.inner.dispatcher.notify_value(name, &value);

        if !validate {
            return Ok(());
        }
        match self
            .config(name)
            .and_then(|config| config.validation_rules.as_ref())
        {
            Some(rules) => self.validate_input(name.as_str(), &value, rules),
            None => Ok(()),
        }
    }

    fn validate_field(&self, name: &FieldName) -> Result<()> {
        let Some(rules) = self
            .config(name)
            .and_then(|config| config.validation_rules.as_ref())
        else {
            return Ok(());
        };
        let value = self
            .inner
            .shadow
            .borrow()
            .values
            .get(name)
            .cloned()
            .unwrap_or_default();
        self.validate_input(name.as_str(), &value, rules)
    }

    fn validate_where(&self, include: impl Fn(&FieldName) -> bool) -> Result<()> {
        for name in self.inner.configs.keys() {
            if include(name) {
                self.validate_field(name)?;
            }
        }
        self.publish_report();
        Ok(())
    }

    fn set_hidden(&self, name: &str, hidden: bool) {
        let Some(name) = self.registered(name, "set_hidden") else {
            return;
        };
        self.inner
            .shadow
            .borrow_mut()
            .hidden
            .insert(name.clone(), hidden);
        self.inner.dispatcher.notify_visibility(&name, hidden);
    }

    fn set_disabled(&self, name: &str, disabled: bool) {
        let Some(name) = self.registered(name, "set_disabled") else {
            return;
        };
        self.inner
            .shadow
            .borrow_mut()
            .disabled
            .insert(name.clone(), disabled);
        self.inner.dispatcher.notify_disabled(&name, disabled);
    }

    fn restore_baseline(&self) {
        let mut shadow = self.inner.shadow.borrow_mut();
        shadow.errors.clear();
        shadow.touched.clear();
        shadow.current = shadow.baseline.clone();
        for name in self.inner.configs.keys() {
            let value = shadow.current.get(name.as_str()).cloned().unwrap_or_default();
            shadow.values.insert(name.clone(), value);
        }
    }

    /// Publish hidden, disabled and view mode for every field, preceded by
    /// the value when `with_values` is set
    fn publish_layout(&self, with_values: bool) {
        let dispatcher = &self.inner.dispatcher;
        for name in self.inner.configs.keys() {
            let (value, hidden, disabled, mode) = {
                let shadow = self.inner.shadow.borrow();
                (
                    shadow.values.get(name).cloned().unwrap_or_default(),
                    shadow.hidden.get(name).copied().unwrap_or(false),
                    shadow.disabled.get(name).copied().unwrap_or(false),
                    shadow.view_modes.get(name).copied().unwrap_or_default(),
                )
            };
            if with_values {
                dispatcher.notify_value(name, &value);
            }
            dispatcher.notify_visibility(name, hidden);
            dispatcher.notify_disabled(name, disabled);
            dispatcher.notify_view_mode(name, mode);
        }
    }

    fn publish_values_and_cleared_errors(&self) {
        let cleared = ErrorState::cleared();
        for name in self.inner.configs.keys() {
            let value = self.value(name.as_str()).unwrap_or_default();
            self.inner.dispatcher.notify_value(name, &value);
            self.inner.dispatcher.notify_validation(name, &cleared);
        }
    }

    fn publish_report(&self) {
        let report = {
            let mut shadow = self.inner.shadow.borrow_mut();
            let report = Rc::new(build_report(ReportInputs {
                current: &shadow.current,
                baseline: &shadow.baseline,
                configs: &self.inner.configs,
                touched: &shadow.touched,
                errors: &shadow.errors,
            }));
            shadow.report = Rc::clone(&report);
            report
        };
        self.inner.dispatcher.notify_report(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rules, Topic, ValidationOutcome};

    fn not_empty(ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
        if ctx.value.is_empty() {
            Ok(ValidationOutcome::fail(format!("{} is empty", ctx.name)))
        } else {
            Ok(ValidationOutcome::pass())
        }
    }

    fn container() -> StateContainer {
        StateContainer::builder()
            .value("name", "")
            .value("age", 30)
            .field(
                "name",
                FieldConfig::new().with_rules(Rules::string().required("name needed").get()),
            )
            .field(
                "age",
                FieldConfig::new().with_rules(Rules::number().positive("positive").get()),
            )
            .field("notes", FieldConfig::new().hidden().disabled())
            .validator(not_empty)
            .build()
            .unwrap()
    }

    fn counter() -> (Rc<RefCell<usize>>, impl Fn(&FormStateReport) + 'static) {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        (count, move |_: &FormStateReport| *sink.borrow_mut() += 1)
    }

    #[test]
    fn test_record_holds_exactly_configured_fields() {
        let state = StateContainer::builder()
            .value("a", 1)
            .value("stray", 2)
            .field("a", FieldConfig::new())
            .field("b", FieldConfig::new())
            .build()
            .unwrap();

        let data = state.data();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(data.get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_initial_value_kind_is_checked() {
        let result = StateContainer::builder()
            .value("age", "thirty")
            .field("age", FieldConfig::new().with_rules(Rules::number().get()))
            .build();
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_set_value_touches_validates_and_reports() {
        let state = container();
        state.set_value("name", "Ada").unwrap();

        assert!(state.is_touched("name"));
        assert_eq!(state.data().get("name"), Some(&Value::from("Ada")));
        assert_eq!(state.value("name"), Some(Value::from("Ada")));

        state.set_value("name", "").unwrap();
        assert!(!state.is_valid());
        assert_eq!(state.error_state("name"), ErrorState::failed("name is empty"));
        let report = state.state_report();
        assert_eq!(report.errors.get("name").map(String::as_str), Some("name is empty"));
    }

    #[test]
    fn test_set_value_rejects_wrong_kind_without_change() {
        let state = container();
        let result = state.set_value("age", "old");
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));
        assert_eq!(state.data().get("age"), Some(&Value::Int(30)));
        assert!(!state.is_touched("age"));
    }

    #[test]
    fn test_set_value_silent_skips_validation_and_report() {
        let state = container();
        let (reports, handler) = counter();
        let _ = state.on_report_change(handler);
        assert_eq!(*reports.borrow(), 1);

        state.set_value_silent("name", "").unwrap();
        assert!(state.is_touched("name"));
        assert!(state.is_valid());
        assert_eq!(*reports.borrow(), 1);
    }

    #[test]
    fn test_unregistered_field_is_ignored() {
        let state = container();
        state.set_value("ghost", 1).unwrap();
        state.hide("ghost");
        assert!(state.data().get("ghost").is_none());
        assert!(!state.is_hidden("ghost"));
    }

    #[test]
    fn test_visibility_and_disabled_axes_are_independent() {
        let state = container();
        assert!(state.is_hidden("notes"));
        assert!(state.is_disabled("notes"));

        state.show("notes");
        assert!(!state.is_hidden("notes"));
        assert!(state.is_disabled("notes"));

        state.hide_many(["name", "age"]);
        assert!(state.is_hidden("name") && state.is_hidden("age"));
        state.show_many(vec!["name".to_string()]);
        assert!(!state.is_hidden("name"));
    }

    #[test]
    fn test_layout_changes_do_not_republish_report() {
        let state = container();
        let (reports, handler) = counter();
        let _ = state.on_report_change(handler);

        state.hide("name");
        state.disable("age");
        state.set_view_mode("age", ViewMode::View);
        assert_eq!(*reports.borrow(), 1);
    }

    #[test]
    fn test_invalid_view_mode_name_is_ignored() {
        let state = container();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        let _ = state.on_view_mode_change("age", move |m| sink.borrow_mut().push(m));

        state.set_view_mode_named("age", "readonly");
        assert_eq!(state.view_mode("age"), ViewMode::Edit);
        assert_eq!(*hits.borrow(), vec![ViewMode::Edit]);

        state.set_view_mode_named("age", "view");
        assert_eq!(*hits.borrow(), vec![ViewMode::Edit, ViewMode::View]);
    }

    #[test]
    fn test_form_view_mode_broadcasts() {
        let state = container();
        state.set_form_view_mode(ViewMode::View);
        for name in ["name", "age", "notes"] {
            assert_eq!(state.view_mode(name), ViewMode::View);
        }
    }

    #[test]
    fn test_validate_all_publishes_report() {
        let state = container();
        let (reports, handler) = counter();
        let _ = state.on_report_change(handler);

        state.validate_all().unwrap();
        assert_eq!(*reports.borrow(), 2);
        assert_eq!(state.error_state("name"), ErrorState::failed("name is empty"));
        assert!(!state.is_valid());
    }

    #[test]
    fn test_validate_only_and_skip() {
        let state = container();
        let (reports, handler) = counter();
        let _ = state.on_report_change(handler);

        state.validate_skip(["name"]).unwrap();
        assert!(state.is_valid());
        assert_eq!(*reports.borrow(), 2);

        state.validate_only(["name", "age"]).unwrap();
        assert!(!state.is_valid());
        assert_eq!(state.state_report().errors.len(), 1);
        assert_eq!(*reports.borrow(), 3);
    }

    #[test]
    fn test_reset_errors_keeps_values() {
        let state = container();
        state.set_value("name", "").unwrap();
        assert!(!state.is_valid());

        state.reset_errors();
        assert!(state.is_valid());
        assert!(state.is_touched("name"));
        assert!(state.state_report().errors.is_empty());
    }

    #[test]
    fn test_set_baseline_changes_diff_only() {
        let state = container();
        let (reports, handler) = counter();
        let _ = state.on_report_change(handler);

        let mut baseline = state.data();
        baseline.insert("age".into(), Value::Int(40));
        state.set_baseline(baseline);

        assert_eq!(*reports.borrow(), 1);
        assert_eq!(state.data().get("age"), Some(&Value::Int(30)));

        state.set_value("name", "Ada").unwrap();
        let report = state.state_report();
        assert!(report.has_changed);
        assert_eq!(report.changes.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_validator_error_propagates() {
        fn explode(ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
            Err(Error::validator(ctx.name.as_str(), "boom"))
        }

        let state = container();
        state.set_validator(explode);
        let err = state.set_value("name", "x").unwrap_err();
        assert_eq!(err, Error::validator("name", "boom"));
    }

    #[test]
    fn test_refresh_options_broadcasts_without_replay() {
        let state = container();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = state.on_options_refresh("age", move |opts| sink.borrow_mut().push(opts.clone()));
        assert!(seen.borrow().is_empty());

        let mut options = OptionMap::new();
        options.insert("18".into(), "Adult".into());
        state.refresh_options("age", options.clone());
        assert_eq!(*seen.borrow(), vec![options]);
    }

    #[test]
    fn test_reentrant_subscriber() {
        let state = container();
        let mirror = state.clone();
        let _ = state.on_value_change("name", move |value| {
            if value.as_str() == Some("copy") {
                mirror.set_value("age", 99).unwrap();
            }
        });

        state.set_value("name", "copy").unwrap();
        assert_eq!(state.data().get("age"), Some(&Value::Int(99)));
        assert_eq!(state.state_report().state.get("age"), Some(&Value::Int(99)));
    }

    #[test]
    fn test_shared_channel_sees_construction_events() {
        let channel = FormChannel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = channel.listen(Topic::FormState, move |_| sink.borrow_mut().push(()));

        let _state = StateContainer::builder()
            .field("a", FieldConfig::new())
            .channel(channel.clone())
            .build()
            .unwrap();
        assert_eq!(seen.borrow().len(), 1);
    }
}
