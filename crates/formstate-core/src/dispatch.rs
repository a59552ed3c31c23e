//! Change dispatcher: the fixed topic vocabulary over a notification channel
//!
//! Every notification is preceded by a [`CommandLog`] sent to the injected
//! [`Logger`], when one is configured.

use crate::{
    Axis, Error, ErrorState, FieldName, FormStateReport, NotificationChannel, Result, Topic,
    Unsubscribe, Value, ViewMode,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Options payload broadcast by `refresh_options`
pub type OptionMap = IndexMap<String, String>;

/// Data carried by a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Value(Value),
    Hidden(bool),
    Disabled(bool),
    ViewMode(ViewMode),
    Validation(ErrorState),
    Options(OptionMap),
    Report(Rc<FormStateReport>),
}

/// The channel type the dispatcher publishes on
pub type FormChannel = NotificationChannel<Topic, Payload>;

/// Kind of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    Command,
}

/// Entry handed to the logger before each dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandLog {
    /// Legacy event name, see [`Topic`]'s `Display`
    pub event: String,
    pub topic: Topic,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub payload: Payload,
    pub time: DateTime<Utc>,
}

/// Side-channel logging hook
pub type Logger = Rc<dyn Fn(&CommandLog)>;

/// Publishes field and form changes on a [`FormChannel`]
pub struct ChangeDispatcher {
    channel: FormChannel,
    logger: RefCell<Option<Logger>>,
}

impl fmt::Debug for ChangeDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeDispatcher")
            .field("channel", &self.channel)
            .field("has_logger", &self.has_logger())
            .finish()
    }
}

impl ChangeDispatcher {
    pub fn new(channel: FormChannel, logger: Option<Logger>) -> Self {
        Self {
            channel,
            logger: RefCell::new(logger),
        }
    }

    /// The underlying channel
    pub fn channel(&self) -> &FormChannel {
        &self.channel
    }

    /// Replace the logger; `None` silences logging
    pub fn set_logger(&self, logger: Option<Logger>) {
        *self.logger.borrow_mut() = logger;
    }

    /// Register a logger, rejecting an empty slot
    ///
    /// On rejection a warning is traced and the previous logger stays active.
    pub fn set_logger_checked(&self, logger: Option<Logger>) -> Result<()> {
        match logger {
            Some(logger) => {
                self.set_logger(Some(logger));
                Ok(())
            }
            None => {
                tracing::warn!(
                    kept_previous = self.has_logger(),
                    "rejected logger registration without a callable"
                );
                Err(Error::InvalidHandlerType(
                    "logger registration requires a callable".to_string(),
                ))
            }
        }
    }

    pub fn has_logger(&self) -> bool {
        self.logger.borrow().is_some()
    }

    /// Log, then deliver `payload` on `topic`
    pub fn notify(&self, topic: Topic, payload: Payload) {
        let logger = self.logger.borrow().clone();
        if let Some(logger) = logger {
            logger(&CommandLog {
                event: topic.to_string(),
                topic: topic.clone(),
                kind: LogKind::Command,
                payload: payload.clone(),
                time: Utc::now(),
            });
        }
        let delivered = self.channel.dispatch(&topic, &payload);
        tracing::trace!(event = %topic, delivered, "dispatched");
    }

    pub fn notify_value(&self, field: &FieldName, value: &Value) {
        self.notify(Topic::field(field, Axis::Value), Payload::Value(value.clone()));
    }

    pub fn notify_visibility(&self, field: &FieldName, hidden: bool) {
        self.notify(Topic::field(field, Axis::Visibility), Payload::Hidden(hidden));
    }

    pub fn notify_disabled(&self, field: &FieldName, disabled: bool) {
        self.notify(Topic::field(field, Axis::Disabled), Payload::Disabled(disabled));
    }

    pub fn notify_view_mode(&self, field: &FieldName, mode: ViewMode) {
        self.notify(Topic::field(field, Axis::ViewMode), Payload::ViewMode(mode));
    }

    pub fn notify_validation(&self, field: &FieldName, state: &ErrorState) {
        self.notify(
            Topic::field(field, Axis::Validation),
            Payload::Validation(state.clone()),
        );
    }

    pub fn notify_options(&self, field: &FieldName, options: OptionMap) {
        self.notify(
            Topic::field(field, Axis::OptionsRefresh),
            Payload::Options(options),
        );
    }

    pub fn notify_report(&self, report: Rc<FormStateReport>) {
        self.notify(Topic::FormState, Payload::Report(report));
    }

    pub fn subscribe_value(
        &self,
        field: &FieldName,
        handler: impl Fn(&Value) + 'static,
    ) -> Unsubscribe {
        self.channel
            .listen(Topic::field(field, Axis::Value), move |payload| {
                if let Payload::Value(value) = payload {
                    handler(value);
                }
            })
    }

    pub fn subscribe_visibility(
        &self,
        field: &FieldName,
        handler: impl Fn(bool) + 'static,
    ) -> Unsubscribe {
        self.channel
            .listen(Topic::field(field, Axis::Visibility), move |payload| {
                if let Payload::Hidden(hidden) = payload {
                    handler(*hidden);
                }
            })
    }

    pub fn subscribe_disabled(
        &self,
        field: &FieldName,
        handler: impl Fn(bool) + 'static,
    ) -> Unsubscribe {
        self.channel
            .listen(Topic::field(field, Axis::Disabled), move |payload| {
                if let Payload::Disabled(disabled) = payload {
                    handler(*disabled);
                }
            })
    }

    pub fn subscribe_view_mode(
        &self,
        field: &FieldName,
        handler: impl Fn(ViewMode) + 'static,
    ) -> Unsubscribe {
        self.channel
            .listen(Topic::field(field, Axis::ViewMode), move |payload| {
                if let Payload::ViewMode(mode) = payload {
                    handler(*mode);
                }
            })
    }

    pub fn subscribe_validation(
        &self,
        field: &FieldName,
        handler: impl Fn(&ErrorState) + 'static,
    ) -> Unsubscribe {
        self.channel
            .listen(Topic::field(field, Axis::Validation), move |payload| {
                if let Payload::Validation(state) = payload {
                    handler(state);
                }
            })
    }

    pub fn subscribe_options(
        &self,
        field: &FieldName,
        handler: impl Fn(&OptionMap) + 'static,
    ) -> Unsubscribe {
        self.channel
            .listen(Topic::field(field, Axis::OptionsRefresh), move |payload| {
                if let Payload::Options(options) = payload {
                    handler(options);
                }
            })
    }

    pub fn subscribe_report(
        &self,
        handler: impl Fn(&FormStateReport) + 'static,
    ) -> Unsubscribe {
        self.channel.listen(Topic::FormState, move |payload| {
            if let Payload::Report(report) = payload {
                handler(report);
            }
        })
    }
}
