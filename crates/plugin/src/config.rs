//! Configuration resolution
//!
//! User options come in one of three shapes and are resolved once, at plugin
//! construction, into an immutable [`Configuration`]:
//!
//! - a plain field list ([`PluginOptions::Fields`])
//! - a typed options object ([`ModifiedAtOptions`]), which may carry custom
//!   predicates
//! - loosely typed JSON ([`Resolver::resolve_value`]) or a TOML file
//!   ([`ModifiedAtConfig`])
//!
//! Defaults (suffix and selectability) are passed to the [`Resolver`]
//! explicitly; there is no process-wide setting.
//!
//! # Example
//!
//! ```toml
//! # Appended to each tracked field name (default: "_modifiedAt")
//! suffix = "_updatedAt"
//! # Include derived fields in default projections (default: true)
//! select = false
//! fields = ["name", "age"]
//! ```

use crate::error::ConfigurationError;
use crate::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Suffix appended to tracked field names unless configured otherwise
pub const DEFAULT_SUFFIX: &str = "_modifiedAt";

// ============================================================================
// Defaults
// ============================================================================

/// Values used when options leave `suffix` or `select` unset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// Derived-name suffix for tracked fields
    pub suffix: String,
    /// Whether derived fields are selected by default
    pub select: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            select: true,
        }
    }
}

impl Defaults {
    /// Defaults with a different suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

// ============================================================================
// User-facing options
// ============================================================================

/// Typed options object
#[derive(Clone, Default)]
pub struct ModifiedAtOptions {
    suffix: Option<String>,
    select: Option<bool>,
    fields: Vec<String>,
    predicates: Vec<(String, Arc<dyn Predicate>)>,
}

impl fmt::Debug for ModifiedAtOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifiedAtOptions")
            .field("suffix", &self.suffix)
            .field("select", &self.select)
            .field("fields", &self.fields)
            .field(
                "predicates",
                &self.predicates.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ModifiedAtOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the derived-name suffix
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Whether derived fields are selected by default
    pub fn select(mut self, select: bool) -> Self {
        self.select = Some(select);
        self
    }

    /// Add tracked fields
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Stamp `field` whenever `predicate` matches the candidate document
    ///
    /// `field` is used verbatim as the derived field name.
    pub fn predicate(mut self, field: impl Into<String>, predicate: Arc<dyn Predicate>) -> Self {
        self.predicates.push((field.into(), predicate));
        self
    }
}

/// Accepted option shapes
#[derive(Debug, Clone)]
pub enum PluginOptions {
    /// Tracked field names; suffix and select come from the defaults
    Fields(Vec<String>),
    /// Full options object
    Options(ModifiedAtOptions),
}

impl From<Vec<String>> for PluginOptions {
    fn from(fields: Vec<String>) -> Self {
        PluginOptions::Fields(fields)
    }
}

impl From<Vec<&str>> for PluginOptions {
    fn from(fields: Vec<&str>) -> Self {
        PluginOptions::Fields(fields.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PluginOptions {
    fn from(fields: [&str; N]) -> Self {
        PluginOptions::Fields(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl From<ModifiedAtOptions> for PluginOptions {
    fn from(options: ModifiedAtOptions) -> Self {
        PluginOptions::Options(options)
    }
}

impl From<ModifiedAtConfig> for PluginOptions {
    fn from(config: ModifiedAtConfig) -> Self {
        PluginOptions::Options(config.into_options())
    }
}

// ============================================================================
// File configuration
// ============================================================================

/// Serializable subset of the options (everything but predicates)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedAtConfig {
    /// Derived-name suffix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Whether derived fields are selected by default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<bool>,
    /// Tracked fields
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ModifiedAtConfig {
    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Toml`] on malformed input or unknown
    /// value types.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Io`] if the file cannot be read, or
    /// [`ConfigurationError::Toml`] if it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Convert into options, to which predicates can then be attached
    pub fn into_options(self) -> ModifiedAtOptions {
        let mut options = ModifiedAtOptions::new().fields(self.fields);
        options.suffix = self.suffix;
        options.select = self.select;
        options
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Immutable, validated plugin configuration
#[derive(Clone)]
pub struct Configuration {
    suffix: String,
    tracked_fields: Vec<String>,
    select: bool,
    predicates: Vec<(String, Arc<dyn Predicate>)>,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("suffix", &self.suffix)
            .field("tracked_fields", &self.tracked_fields)
            .field("select", &self.select)
            .field(
                "predicates",
                &self.predicates.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Configuration {
    /// Derived-name suffix
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Tracked fields, in first-declared order without duplicates
    pub fn tracked_fields(&self) -> &[String] {
        &self.tracked_fields
    }

    /// Whether derived fields are selected by default
    pub fn select(&self) -> bool {
        self.select
    }

    /// Custom predicates, in declaration order
    pub fn predicates(&self) -> &[(String, Arc<dyn Predicate>)] {
        &self.predicates
    }

    /// Whether `path` is a tracked field
    pub fn is_tracked(&self, path: &str) -> bool {
        self.tracked_fields.iter().any(|f| f == path)
    }

    /// Derived field name for a tracked field
    pub fn derived_name(&self, field: &str) -> String {
        format!("{}{}", field, self.suffix)
    }

    /// Every derived field: tracked fields (suffixed) then predicate names
    pub fn derived_fields(&self) -> Vec<String> {
        self.tracked_fields
            .iter()
            .map(|f| self.derived_name(f))
            .chain(self.predicates.iter().map(|(name, _)| name.clone()))
            .collect()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Turns user options into a [`Configuration`]
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    defaults: Defaults,
}

impl Resolver {
    /// Resolver with the standard defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with explicit defaults
    pub fn with_defaults(defaults: Defaults) -> Self {
        Self { defaults }
    }

    /// Defaults in effect
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Resolve typed options
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::InvalidFieldName`] for an empty field name
    /// - [`ConfigurationError::DuplicateDerivedField`] when two entries
    ///   resolve to the same derived field
    pub fn resolve(&self, options: impl Into<PluginOptions>) -> Result<Configuration, ConfigurationError> {
        let (suffix, select, fields, predicates) = match options.into() {
            PluginOptions::Fields(fields) => (None, None, fields, Vec::new()),
            PluginOptions::Options(o) => (o.suffix, o.select, o.fields, o.predicates),
        };

        let mut tracked_fields: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if field.is_empty() {
                return Err(ConfigurationError::InvalidFieldName(field));
            }
            if !tracked_fields.contains(&field) {
                tracked_fields.push(field);
            }
        }
        for (name, _) in &predicates {
            if name.is_empty() {
                return Err(ConfigurationError::InvalidFieldName(name.clone()));
            }
        }

        let config = Configuration {
            suffix: suffix.unwrap_or_else(|| self.defaults.suffix.clone()),
            tracked_fields,
            select: select.unwrap_or(self.defaults.select),
            predicates,
        };

        let mut seen = BTreeSet::new();
        for derived in config.derived_fields() {
            if !seen.insert(derived.clone()) {
                return Err(ConfigurationError::DuplicateDerivedField(derived));
            }
        }
        Ok(config)
    }

    /// Resolve loosely typed options
    ///
    /// Accepts an array of field names, or an object with optional
    /// `suffix` (string), `select` (bool) and `fields` (array of strings).
    /// Other object keys cannot hold predicates in JSON and are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingOrInvalidOptions`] for any other
    /// shape, or when a known key has the wrong type.
    pub fn resolve_value(&self, value: &serde_json::Value) -> Result<Configuration, ConfigurationError> {
        match value {
            serde_json::Value::Array(items) => self.resolve(PluginOptions::Fields(string_list(items)?)),
            serde_json::Value::Object(map) => {
                let mut options = ModifiedAtOptions::new();
                for (key, v) in map {
                    match key.as_str() {
                        "suffix" => {
                            let suffix = v.as_str().ok_or_else(|| invalid("'suffix' must be a string"))?;
                            options = options.suffix(suffix);
                        }
                        "select" => {
                            let select = v.as_bool().ok_or_else(|| invalid("'select' must be a boolean"))?;
                            options = options.select(select);
                        }
                        "fields" => {
                            let items = v.as_array().ok_or_else(|| invalid("'fields' must be an array"))?;
                            options = options.fields(string_list(items)?);
                        }
                        other => {
                            warn!(key = %other, "Ignoring non-callable modified-at option");
                        }
                    }
                }
                self.resolve(options)
            }
            other => Err(invalid(&format!(
                "expected a field list or an options object, got {}",
                json_kind(other)
            ))),
        }
    }
}

fn invalid(reason: &str) -> ConfigurationError {
    ConfigurationError::MissingOrInvalidOptions(reason.to_string())
}

fn string_list(items: &[serde_json::Value]) -> Result<Vec<String>, ConfigurationError> {
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid("field names must be strings"))
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
