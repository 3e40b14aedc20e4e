//! Grouping configuration.
//!
//! [`GroupingConfig`] selects whether the grouped view is allowed, the sort
//! order, the initial collapse state and the date label patterns. It can be
//! read from TOML or JSON; missing fields take their defaults.
//!
//! ```toml
//! enabled = true
//! sort_order = "subject_desc"
//! expanded_by_default = false
//! date_format = "%Y-%m-%d"
//! ```

use std::path::Path;

use horizon_msglist_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::model::SortOrder;
use crate::model::delegate::{DEFAULT_DATE_FORMAT, DEFAULT_WEEKDAY_FORMAT, DateLabelFormat};

/// Settings for a grouped message list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Whether the grouped view is allowed. When `false` the cursor passes
    /// positions straight through to the store.
    pub enabled: bool,
    /// Sort order the list is loaded with; also picks the grouping criterion.
    pub sort_order: SortOrder,
    /// Whether groups start expanded after a load.
    pub expanded_by_default: bool,
    /// `strftime` pattern for plain dates in header labels.
    pub date_format: String,
    /// `strftime` pattern for dates with weekday in header labels.
    pub weekday_format: String,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sort_order: SortOrder::default(),
            expanded_by_default: true,
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
            weekday_format: DEFAULT_WEEKDAY_FORMAT.to_owned(),
        }
    }
}

impl GroupingConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::config(format!("TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::config(format!("JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::config_io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::config_io(path, e))?;
        Self::from_json_str(&text)
    }

    /// Serializes to a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(format!("TOML: {e}")))
    }

    /// Checks the date patterns.
    pub fn validate(&self) -> Result<()> {
        self.label_format().map(|_| ())
    }

    /// The date label patterns as a validated [`DateLabelFormat`].
    pub fn label_format(&self) -> Result<DateLabelFormat> {
        DateLabelFormat::new(&self.date_format, &self.weekday_format)
    }
}
