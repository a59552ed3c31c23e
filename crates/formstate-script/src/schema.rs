//! Field definition schema

use formstate_core::{FieldConfig, FieldName, Value};
use serde::{Deserialize, Serialize};

/// Definition of one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique within a form
    pub name: FieldName,
    /// Initial value; also the initial baseline
    #[serde(default)]
    pub initial: Value,
    #[serde(default)]
    pub config: FieldConfig,
}

impl FieldDef {
    /// Create a field with a null initial value and default configuration
    pub fn new(name: impl Into<FieldName>) -> Self {
        Self {
            name: name.into(),
            initial: Value::Null,
            config: FieldConfig::default(),
        }
    }

    pub fn with_initial(mut self, initial: impl Into<Value>) -> Self {
        self.initial = initial.into();
        self
    }

    pub fn with_config(mut self, config: FieldConfig) -> Self {
        self.config = config;
        self
    }
}

/// On-disk shape of a form definition file
#[derive(Debug, Deserialize)]
pub(crate) struct FormFile {
    pub fields: Vec<FieldDef>,
}
