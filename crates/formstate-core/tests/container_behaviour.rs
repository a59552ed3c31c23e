//! End-to-end behaviour of the state container through its public API.
//!
//! Each test builds a small form, drives it the way a presentation layer
//! would, and observes it only through subscriptions and getters.

use formstate_core::{
    changes, CommandLog, Error, ErrorState, FieldConfig, FormStateReport, Record, Result, Rules,
    StateContainer, ValidationContext, ValidationOutcome, Value, ViewMode,
};
use std::cell::RefCell;
use std::rc::Rc;

// helpers

fn reject_blank(ctx: &ValidationContext<'_>) -> Result<ValidationOutcome> {
    if ctx.value.is_empty() {
        Ok(ValidationOutcome::fail(format!("{} must not be blank", ctx.name)))
    } else {
        Ok(ValidationOutcome::pass())
    }
}

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn three_field_form() -> StateContainer {
    StateContainer::builder()
        .record(record(&[("a", 1.into()), ("b", 2.into()), ("c", "x".into())]))
        .field("a", FieldConfig::new())
        .field("b", FieldConfig::new())
        .field("c", FieldConfig::new().hidden())
        .validator(reject_blank)
        .build()
        .unwrap()
}

fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(&T) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |item: &T| sink.borrow_mut().push(item.clone()))
}

// subscriptions replay the current shadow value

#[test]
fn test_every_axis_replays_once_on_subscribe() {
    let form = three_field_form();
    form.disable("b");
    form.set_view_mode("a", ViewMode::View);

    let (values, on_value) = recorder::<Value>();
    let _v = form.on_value_change("a", on_value);
    assert_eq!(*values.borrow(), vec![Value::Int(1)]);

    let hidden = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&hidden);
    let _h = form.on_visibility_change("c", move |h| sink.borrow_mut().push(h));
    assert_eq!(*hidden.borrow(), vec![true]);

    let disabled = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&disabled);
    let _d = form.on_disabled_change("b", move |d| sink.borrow_mut().push(d));
    assert_eq!(*disabled.borrow(), vec![true]);

    let modes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&modes);
    let _m = form.on_view_mode_change("a", move |m| sink.borrow_mut().push(m));
    assert_eq!(*modes.borrow(), vec![ViewMode::View]);

    let (errors, on_error) = recorder::<ErrorState>();
    let _e = form.on_validation_change("a", on_error);
    assert_eq!(*errors.borrow(), vec![ErrorState::cleared()]);

    let (reports, on_report) = recorder::<FormStateReport>();
    let _r = form.on_report_change(on_report);
    assert_eq!(reports.borrow().len(), 1);
}

#[test]
fn test_replay_then_live_updates() {
    let form = three_field_form();
    let (values, on_value) = recorder::<Value>();
    let _sub = form.on_value_change("b", on_value);

    form.set_value("b", 5).unwrap();
    assert_eq!(*values.borrow(), vec![Value::Int(2), Value::Int(5)]);
}

// report semantics

#[test]
fn test_untouched_required_field_blocks_validity() {
    let form = StateContainer::builder()
        .value("email", "a@b.co")
        .field(
            "email",
            FieldConfig::new().with_rules(Rules::string().required("Email needed").get()),
        )
        .build()
        .unwrap();

    let report = form.state_report();
    assert!(!report.is_valid);
    assert!(report.errors.is_empty());
    assert!(report.debug.contains("email"));

    form.set_value("email", "a@b.co").unwrap();
    assert!(form.state_report().is_valid);
}

#[test]
fn test_passing_validation_removes_error_entry() {
    let form = three_field_form();
    let rules = Rules::mixed().get();

    form.validate_input("c", &Value::from(""), &rules).unwrap();
    assert!(!form.is_valid());

    form.validate_input("c", &Value::from("ok"), &rules).unwrap();
    assert!(form.is_valid());
    assert_eq!(form.error_state("c"), ErrorState::cleared());
}

#[test]
fn test_diff_against_baseline() {
    let baseline = record(&[("a", 1.into()), ("b", 2.into())]);
    let current = record(&[("a", 1.into()), ("b", 3.into())]);
    assert_eq!(changes(&baseline, &current), record(&[("b", 3.into())]));

    let form = three_field_form();
    form.set_value("b", 3).unwrap();
    let report = form.state_report();
    assert!(report.has_changed);
    assert_eq!(report.changes, record(&[("b", 3.into())]));

    form.set_value("b", 2).unwrap();
    let report = form.state_report();
    assert!(!report.has_changed);
    assert!(report.changes.is_empty());
}

#[test]
fn test_nan_value_is_not_a_change() {
    let form = StateContainer::builder()
        .value("ratio", f64::NAN)
        .field("ratio", FieldConfig::new())
        .build()
        .unwrap();
    assert!(!form.state_report().has_changed);

    form.set_value("ratio", 0.5).unwrap();
    assert!(form.state_report().has_changed);

    form.set_value("ratio", f64::NAN).unwrap();
    let report = form.state_report();
    assert!(!report.has_changed);
    assert!(report.changes.is_empty());

    form.set_value("ratio", 0.5).unwrap();
    form.reset_state();
    assert!(!form.state_report().has_changed);
}

// resets

#[test]
fn test_reset_restores_baseline_and_untouches() {
    let form = three_field_form();
    form.set_value("a", 99).unwrap();
    assert!(form.state_report().touched_fields.contains_key("a"));

    form.reset_state();
    assert_eq!(form.data().get("a"), Some(&Value::Int(1)));
    assert!(!form.is_touched("a"));
    assert!(!form.state_report().touched_fields.contains_key("a"));
}

#[test]
fn test_reset_keeps_layout() {
    let form = three_field_form();
    form.show("c");
    form.reset_state();
    assert!(!form.is_hidden("c"));
}

#[test]
fn test_hard_reset_restores_configured_defaults() {
    let form = three_field_form();
    let hidden = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&hidden);
    let _sub = form.on_visibility_change("c", move |h| sink.borrow_mut().push(h));

    form.show("c");
    form.set_view_mode("a", ViewMode::View);
    form.hard_reset_state();

    assert!(form.is_hidden("c"));
    assert_eq!(form.view_mode("a"), ViewMode::Edit);
    assert_eq!(*hidden.borrow(), vec![true, false, true]);
}

#[test]
fn test_reset_publishes_cleared_errors() {
    let form = three_field_form();
    form.validate_input("c", &Value::from(""), &Rules::string().get())
        .unwrap();

    let (errors, on_error) = recorder::<ErrorState>();
    let _sub = form.on_validation_change("c", on_error);
    form.reset_state();

    assert_eq!(
        *errors.borrow(),
        vec![ErrorState::failed("c must not be blank"), ErrorState::cleared()]
    );
    assert!(form.is_valid());
}

// unsubscribe

#[test]
fn test_unsubscribe_twice_leaves_other_handlers() {
    let form = three_field_form();
    let (first, on_first) = recorder::<Value>();
    let (second, on_second) = recorder::<Value>();

    let sub = form.on_value_change("a", on_first);
    let _keep = form.on_value_change("a", on_second);

    sub.unsubscribe();
    sub.unsubscribe();

    form.set_value("a", 7).unwrap();
    assert_eq!(*first.borrow(), vec![Value::Int(1)]);
    assert_eq!(*second.borrow(), vec![Value::Int(1), Value::Int(7)]);
}

// bulk operations

#[test]
fn test_set_record_publishes_one_report() {
    let form = three_field_form();
    let (reports, on_report) = recorder::<FormStateReport>();
    let _sub = form.on_report_change(on_report);

    form.set_record(record(&[("a", 10.into()), ("b", 20.into()), ("c", "y".into())]))
        .unwrap();

    let reports = reports.borrow();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].changes.len(), 3);
    assert_eq!(reports[1].touched_fields.len(), 3);
}

#[test]
fn test_set_record_fills_missing_fields_with_null() {
    let form = three_field_form();
    form.set_record(record(&[("a", 5.into())])).unwrap();

    let data = form.data();
    assert_eq!(data.get("a"), Some(&Value::Int(5)));
    assert_eq!(data.get("b"), Some(&Value::Null));
    assert_eq!(data.get("c"), Some(&Value::Null));
}

#[test]
fn test_report_follows_field_events() {
    let form = three_field_form();
    let order = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&order);
    let _v = form.on_value_change("a", move |_| sink.borrow_mut().push("value"));
    let sink = Rc::clone(&order);
    let _r = form.on_report_change(move |_| sink.borrow_mut().push("report"));
    order.borrow_mut().clear();

    form.set_value("a", 2).unwrap();
    assert_eq!(*order.borrow(), vec!["value", "report"]);
}

/// Subscribe to every field's value plus the report, recording labels in
/// arrival order. The subscription replays are discarded.
fn event_order(form: &StateContainer) -> Rc<RefCell<Vec<String>>> {
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["a", "b", "c"] {
        let sink = Rc::clone(&order);
        let _ = form.on_value_change(name, move |_| sink.borrow_mut().push(name.to_string()));
    }
    let sink = Rc::clone(&order);
    let _ = form.on_visibility_change("c", move |_| sink.borrow_mut().push("c:hidden".to_string()));
    let sink = Rc::clone(&order);
    let _ = form.on_report_change(move |_| sink.borrow_mut().push("report".to_string()));
    order.borrow_mut().clear();
    order
}

#[test]
fn test_set_record_reports_once_after_every_value() {
    let form = three_field_form();
    let order = event_order(&form);

    form.set_record(record(&[("a", 10.into()), ("b", 20.into()), ("c", "y".into())]))
        .unwrap();
    assert_eq!(*order.borrow(), vec!["a", "b", "c", "report"]);
}

#[test]
fn test_reset_state_reports_once_after_every_value() {
    let form = three_field_form();
    form.set_value("b", 5).unwrap();
    let order = event_order(&form);

    form.reset_state();
    assert_eq!(*order.borrow(), vec!["a", "b", "c", "report"]);
}

#[test]
fn test_hard_reset_reports_once_after_layout_and_values() {
    let form = three_field_form();
    form.show("c");
    let order = event_order(&form);

    form.hard_reset_state();
    assert_eq!(*order.borrow(), vec!["c:hidden", "a", "b", "c", "report"]);
}

#[test]
fn test_each_validation_pass_reports_once() {
    let form = StateContainer::builder()
        .value("a", "")
        .value("b", "")
        .field("a", FieldConfig::new().with_rules(Rules::string().get()))
        .field("b", FieldConfig::new().with_rules(Rules::string().get()))
        .validator(reject_blank)
        .build()
        .unwrap();
    let (reports, on_report) = recorder::<FormStateReport>();
    let _sub = form.on_report_change(on_report);
    reports.borrow_mut().clear();

    form.validate_only(["a", "b"]).unwrap();
    assert_eq!(reports.borrow().len(), 1);
    assert_eq!(reports.borrow()[0].errors.len(), 2);

    form.validate_skip(["a"]).unwrap();
    assert_eq!(reports.borrow().len(), 2);

    form.validate_all().unwrap();
    assert_eq!(reports.borrow().len(), 3);
}

// logging hook

#[test]
fn test_logger_sees_construction_and_mutations() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let form = StateContainer::builder()
        .value("a", 1)
        .field("a", FieldConfig::new())
        .logger(move |entry: &CommandLog| sink.borrow_mut().push(entry.event.clone()))
        .build()
        .unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            "a:INPUT_VALUE_CHANGED",
            "a:INPUT_HIDDEN_CHANGED",
            "a:INPUT_DISABLED_CHANGED",
            "a:INPUT_VIEW_MODE_CHANGED",
            "FORM_STATE_CHANGED",
        ]
    );

    events.borrow_mut().clear();
    form.clear_logger();
    form.hide("a");
    assert!(events.borrow().is_empty());
}

#[test]
fn test_empty_logger_is_rejected_and_previous_kept() {
    let events = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&events);
    let form = StateContainer::builder()
        .value("a", 1)
        .field("a", FieldConfig::new())
        .build()
        .unwrap();
    form.set_logger(Some(Rc::new(move |_: &CommandLog| *sink.borrow_mut() += 1)))
        .unwrap();

    let result = form.set_logger(None);
    assert!(matches!(result, Err(Error::InvalidHandlerType(_))));

    form.hide("a");
    assert_eq!(*events.borrow(), 1);
}
