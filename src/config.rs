//! JSON declarations of option tables.
//!
//! A declared table gets handlers that coerce each value to its declared type and
//! record it into a shared [`Collector`], keyed by option name.

use crate::option::{for_type, heading, text, Handler, Opt, Table, ValuePolicy, Visibility};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during config parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("invalid short option '{0}': must be a single printable character other than '-' or '='")]
    InvalidShortOption(char),

    #[error("option #{0} has no name, long or short key")]
    NoKeySpecified(usize),

    #[error("{0} entry #{1} has no help text")]
    MissingDescription(&'static str, usize),

    #[error("'type' on option '{0}' requires 'value' to be optional or required")]
    TypeWithoutValue(String),
}

/// What a declared entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A matchable option
    #[default]
    Normal,
    /// A line of help text
    Text,
    /// A help section heading
    Heading,
}

/// Whether a declared option takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueSetting {
    #[default]
    Absent,
    Optional,
    Required,
}

impl From<ValueSetting> for ValuePolicy {
    fn from(setting: ValueSetting) -> Self {
        match setting {
            ValueSetting::Absent => ValuePolicy::Absent,
            ValueSetting::Optional => ValuePolicy::Optional,
            ValueSetting::Required => ValuePolicy::Required,
        }
    }
}

/// Type values are coerced to before they are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Any string value (default, no validation)
    #[default]
    String,
    /// Signed 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// Strict "true" or "false"
    Bool,
}

/// Configuration for a single table entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionConfig {
    /// Key the collected values are stored under (defaults to the long, then short key)
    pub name: Option<String>,
    /// Long key (e.g. "verbose" for --verbose); an empty string catches positional arguments
    pub long: Option<String>,
    /// Short key (e.g. 'v' for -v)
    pub short: Option<char>,
    /// Description, or the text of a text/heading entry
    pub help: Option<String>,
    #[serde(default)]
    pub kind: Kind,
    /// Keep the option out of the help table
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub value: ValueSetting,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
}

impl OptionConfig {
    /// The long key the option is matched on: `long`, else `name` when there is no short key.
    pub fn effective_long(&self) -> Option<&str> {
        if self.long.is_some() {
            return self.long.as_deref();
        }
        if self.short.is_none() {
            return self.name.as_deref();
        }
        None
    }

    /// Key used in the [`Collector`].
    pub fn collector_key(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.long.clone())
            .or_else(|| self.short.map(String::from))
            .unwrap_or_default()
    }

    fn build(&self, collector: &Collector) -> Opt {
        let help = self.help.clone().unwrap_or_default();
        let opt = match self.kind {
            Kind::Text => text(help),
            Kind::Heading => heading(help),
            Kind::Normal => {
                let opt = match (self.effective_long(), self.short) {
                    (Some(long), Some(short)) => Opt::new(long, short, help),
                    (Some(long), None) => Opt::long(long, help),
                    (None, Some(short)) => Opt::short(short, help),
                    (None, None) => Opt::long("", help),
                };
                let key = self.collector_key();
                let policy = self.value.into();
                match self.value_type {
                    ValueType::String => opt.with_handler(collector.handler::<String>(key, policy)),
                    ValueType::Int => opt.with_handler(collector.handler::<i64>(key, policy)),
                    ValueType::Float => opt.with_handler(collector.handler::<f64>(key, policy)),
                    ValueType::Bool => opt.with_handler(collector.handler::<bool>(key, policy)),
                }
            }
        };

        let visibility = if self.hidden {
            Visibility::Hidden
        } else {
            Visibility::Listed
        };
        opt.with_visibility(visibility)
    }
}

/// Top-level configuration for a table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Program name, used in place of argv[0]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionConfig>,
}

impl TableConfig {
    /// Parse a JSON string into a TableConfig.
    pub fn from_json(json: &str) -> Result<TableConfig, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Duplicate long keys are allowed (the first one wins when matching) but logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut longs = HashSet::new();

        for (index, opt) in self.options.iter().enumerate() {
            match opt.kind {
                Kind::Text | Kind::Heading => {
                    if opt.help.is_none() {
                        let kind = if opt.kind == Kind::Text { "text" } else { "heading" };
                        return Err(ConfigError::MissingDescription(kind, index));
                    }
                }
                Kind::Normal => {
                    Self::validate_option(opt, index)?;
                    if let Some(long) = opt.effective_long() {
                        if !longs.insert(long) {
                            tracing::warn!(long, "duplicate long key; only the first declaration is matched");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_option(opt: &OptionConfig, index: usize) -> Result<(), ConfigError> {
        if let Some(short) = opt.short {
            if short == '-' || short == '=' || short.is_whitespace() || short.is_control() {
                return Err(ConfigError::InvalidShortOption(short));
            }
        }

        if opt.name.is_none() && opt.long.is_none() && opt.short.is_none() {
            return Err(ConfigError::NoKeySpecified(index));
        }

        if opt.value == ValueSetting::Absent && opt.value_type != ValueType::String {
            return Err(ConfigError::TypeWithoutValue(opt.collector_key()));
        }

        Ok(())
    }

    /// Build the option table, recording coerced values into `collector`.
    pub fn build(&self, collector: &Collector) -> Table {
        self.options.iter().map(|opt| opt.build(collector)).collect()
    }

    /// Program name, defaulting to the crate name.
    pub fn program_name(&self) -> &str {
        self.name.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }
}

/// Shared store of values collected by handlers built from a [`TableConfig`].
///
/// Every occurrence is kept in order; an occurrence without a value is recorded as `null`.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    values: Rc<RefCell<BTreeMap<String, Vec<Value>>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that coerces to `T` and records under `key`.
    pub fn handler<T>(&self, key: String, policy: ValuePolicy) -> impl Handler
    where
        T: FromStr + Into<Value> + 'static,
    {
        let values = Rc::clone(&self.values);
        for_type(policy, move |v: Option<T>| {
            values
                .borrow_mut()
                .entry(key.clone())
                .or_default()
                .push(v.map_or(Value::Null, Into::into));
        })
    }

    pub fn get(&self, key: &str) -> Option<Vec<Value>> {
        self.values.borrow().get(key).cloned()
    }

    pub fn values(&self) -> BTreeMap<String, Vec<Value>> {
        self.values.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// All collected values as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), Value::Array(v.clone())))
                .collect(),
        )
    }
}
