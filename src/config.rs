//! Write-once configuration properties shared by the console's components.
//!
//! A [`ConfigStore`] is constructed explicitly and handed (usually as
//! `Arc<ConfigStore>`) to whoever needs it. It accepts exactly one
//! [`ConfigurationProperties`] table for its lifetime; reads never lock.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Errors surfaced by [`ConfigStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `initialize` was called on a store that already holds properties.
    #[error("configuration properties already set")]
    AlreadyInitialized,
    /// An existence check ran before any properties were set.
    #[error("configuration properties not initialized")]
    NotInitialized,
}

/// Property name to arbitrary value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationProperties(Map<String, Value>);

impl ConfigurationProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a flat (or nested) TOML document into properties.
    pub fn from_toml_str(data: &str) -> Result<Self> {
        toml::from_str(data).context("invalid TOML configuration properties")
    }

    /// Parse a JSON object into properties.
    pub fn from_json_str(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("invalid JSON configuration properties")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ConfigurationProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Holder for the one [`ConfigurationProperties`] table of a console session.
#[derive(Debug, Default)]
pub struct ConfigStore {
    properties: OnceLock<ConfigurationProperties>,
}

impl ConfigStore {
    /// Empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that is already initialized with `props`.
    pub fn with_properties(props: ConfigurationProperties) -> Self {
        Self {
            properties: OnceLock::from(props),
        }
    }

    /// Set the properties. Every call after the first fails with
    /// [`ConfigError::AlreadyInitialized`] and leaves the stored table untouched.
    pub fn initialize(&self, props: ConfigurationProperties) -> Result<(), ConfigError> {
        let count = props.len();
        self.properties.set(props).map_err(|_| {
            tracing::warn!("rejected second initialization of configuration properties");
            ConfigError::AlreadyInitialized
        })?;
        tracing::info!(count, "configuration properties initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.properties.get().is_some()
    }

    /// Value for `key`; `None` when unset or when the store is not initialized yet.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get()?.get(key)
    }

    /// String value for `key`, if it is set and is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// True only when the stored value is the string `"true"`. A JSON boolean
    /// `true` reads as false.
    pub fn get_boolean(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::String(s)) if s == "true")
    }

    /// Whether `key` is present. Unlike [`ConfigStore::get`], this fails before
    /// the store has been initialized.
    pub fn has(&self, key: &str) -> Result<bool, ConfigError> {
        self.properties
            .get()
            .map(|props| props.contains_key(key))
            .ok_or(ConfigError::NotInitialized)
    }
}

/// Default location of the properties file: `~/.config/consolekit/properties.toml`.
pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("consolekit")?;
    Ok(xdg_dirs.place_config_file("properties.toml")?)
}

/// Read properties from a `.toml` or `.json` file.
pub fn load_from_path(path: &Path) -> Result<ConfigurationProperties> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    let props = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => ConfigurationProperties::from_toml_str(&data)?,
        Some("json") => ConfigurationProperties::from_json_str(&data)?,
        _ => anyhow::bail!(
            "unsupported configuration file format: {} (expected .toml or .json)",
            path.display()
        ),
    };
    tracing::info!(count = props.len(), "loaded configuration properties from {}", path.display());
    Ok(props)
}

/// Load the default properties file into a fresh store, creating an empty file
/// if none exists.
pub fn load_or_init() -> Result<ConfigStore> {
    let path = config_path()?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "")?;
        tracing::info!("created empty properties file at {}", path.display());
        return Ok(ConfigStore::with_properties(ConfigurationProperties::new()));
    }

    Ok(ConfigStore::with_properties(load_from_path(&path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> ConfigurationProperties {
        [
            ("embedded", json!("true")),
            ("allow.browser.login", json!(true)),
            ("docs.url", json!("https://docs.example.com")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn second_initialize_fails_and_keeps_first_table() {
        let store = ConfigStore::new();
        store.initialize(sample()).unwrap();

        let mut other = ConfigurationProperties::new();
        other.insert("embedded", "false");
        assert_eq!(store.initialize(other), Err(ConfigError::AlreadyInitialized));
        assert!(store.get_boolean("embedded"));
    }

    #[test]
    fn with_properties_counts_as_initialized() {
        let store = ConfigStore::with_properties(sample());
        assert!(store.is_initialized());
        assert_eq!(
            store.initialize(ConfigurationProperties::new()),
            Err(ConfigError::AlreadyInitialized)
        );
    }

    #[test]
    fn get_before_initialize_is_none() {
        let store = ConfigStore::new();
        assert!(store.get("embedded").is_none());
        assert!(!store.get_boolean("embedded"));
        assert!(!store.is_initialized());
    }

    #[test]
    fn has_before_initialize_fails() {
        let store = ConfigStore::new();
        assert_eq!(store.has("embedded"), Err(ConfigError::NotInitialized));
    }

    #[test]
    fn has_after_initialize() {
        let store = ConfigStore::with_properties(sample());
        assert_eq!(store.has("embedded"), Ok(true));
        assert_eq!(store.has("missing"), Ok(false));
    }

    #[test]
    fn get_boolean_only_accepts_string_true() {
        let store = ConfigStore::with_properties(sample());
        assert!(store.get_boolean("embedded"));
        assert!(!store.get_boolean("allow.browser.login"));
        assert!(!store.get_boolean("docs.url"));
        assert!(!store.get_boolean("missing"));
    }

    #[test]
    fn get_returns_stored_values() {
        let store = ConfigStore::with_properties(sample());
        assert_eq!(store.get("allow.browser.login"), Some(&json!(true)));
        assert_eq!(store.get_str("docs.url"), Some("https://docs.example.com"));
        assert_eq!(store.get_str("allow.browser.login"), None);
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn properties_from_toml() {
        let toml = r#"
            embedded = "true"
            "docs.url" = "https://docs.example.com"
            max_items = 20
        "#;
        let props = ConfigurationProperties::from_toml_str(toml).unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props.get("max_items"), Some(&json!(20)));
        let store = ConfigStore::with_properties(props);
        assert!(store.get_boolean("embedded"));
    }

    #[test]
    fn properties_from_json() {
        let props =
            ConfigurationProperties::from_json_str(r#"{"embedded": "false", "n": 1}"#).unwrap();
        assert_eq!(props.get("embedded"), Some(&json!("false")));
        assert!(ConfigurationProperties::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn load_from_toml_and_json_files() {
        let mut toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(toml_file, "embedded = \"true\"").unwrap();
        let props = load_from_path(toml_file.path()).unwrap();
        assert_eq!(props.get("embedded"), Some(&json!("true")));

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json_file, "{{\"embedded\": \"true\"}}").unwrap();
        let props = load_from_path(json_file.path()).unwrap();
        assert!(props.contains_key("embedded"));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported configuration file format"));
    }
}
