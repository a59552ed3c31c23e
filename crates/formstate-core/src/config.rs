//! Per-field configuration
//!
//! A [`FieldConfig`] is declared once per field when the container is built
//! and never changes afterwards. It supplies the defaults that
//! [`StateContainer::hard_reset_state`](crate::StateContainer::hard_reset_state)
//! restores and the rule set the validator is called with.

use crate::{Error, FieldName, RuleSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a field is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Read-only presentation
    View,
    /// Editable input
    #[default]
    Edit,
}

impl ViewMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::View => "view",
            ViewMode::Edit => "edit",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(ViewMode::View),
            "edit" => Ok(ViewMode::Edit),
            other => Err(Error::UnknownViewMode(other.to_string())),
        }
    }
}

/// Declared defaults and rules for one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Hidden until shown
    #[serde(default)]
    pub default_hidden: bool,
    /// Disabled until enabled
    #[serde(default)]
    pub default_disabled: bool,
    /// Initial presentation mode
    #[serde(default)]
    pub default_view_mode: ViewMode,
    /// Rules forwarded to the validator; `None` means never validated
    #[serde(default)]
    pub validation_rules: Option<RuleSet>,
}

impl FieldConfig {
    /// Configuration with every default off and no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Start hidden
    pub fn hidden(mut self) -> Self {
        self.default_hidden = true;
        self
    }

    /// Start disabled
    pub fn disabled(mut self) -> Self {
        self.default_disabled = true;
        self
    }

    /// Start in the given view mode
    pub fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.default_view_mode = mode;
        self
    }

    /// Attach a rule set
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.validation_rules = Some(rules);
        self
    }

    /// Whether the rule set marks this field required
    pub fn is_required(&self) -> bool {
        self.validation_rules
            .as_ref()
            .is_some_and(RuleSet::is_required)
    }
}

/// Field configurations in declaration order
pub type FieldConfigs = IndexMap<FieldName, FieldConfig>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rules;

    #[test]
    fn test_view_mode_parse() {
        assert_eq!("view".parse::<ViewMode>(), Ok(ViewMode::View));
        assert_eq!("edit".parse::<ViewMode>(), Ok(ViewMode::Edit));
        assert_eq!(
            "readonly".parse::<ViewMode>(),
            Err(Error::UnknownViewMode("readonly".into()))
        );
        assert_eq!(ViewMode::default(), ViewMode::Edit);
    }

    #[test]
    fn test_field_config_builders() {
        let config = FieldConfig::new()
            .hidden()
            .disabled()
            .with_view_mode(ViewMode::View)
            .with_rules(Rules::string().required("needed").get());

        assert!(config.default_hidden);
        assert!(config.default_disabled);
        assert_eq!(config.default_view_mode, ViewMode::View);
        assert!(config.is_required());
        assert!(!FieldConfig::new().is_required());
    }

    #[test]
    fn test_field_config_ron_defaults() {
        let config: FieldConfig = ron::from_str("(default_hidden: true)").unwrap();
        assert!(config.default_hidden);
        assert!(!config.default_disabled);
        assert_eq!(config.default_view_mode, ViewMode::Edit);
        assert!(config.validation_rules.is_none());
    }
}
