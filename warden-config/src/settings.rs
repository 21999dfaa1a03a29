// Typed settings for the validator and the message/i18n stores

use crate::{ConfigError, ConfigLoader, EnvLoader, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment prefix for [`Settings::merge_env`].
pub const ENV_PREFIX: &str = "WARDEN";

/// Top-level settings file layout.
///
/// ```toml
/// [validation]
/// helper_class = "Valid"
/// error_file = "forms/login"
///
/// [i18n]
/// message_paths = ["resources/messages"]
/// i18n_paths = ["resources/i18n"]
/// lang = "zh-cn"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub validation: ValidationSettings,
    pub i18n: I18nSettings,
}

/// Validator defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Class whose methods resolve bare rule names
    pub helper_class: String,
    /// Message file used by `errors()` when none is passed
    pub error_file: Option<String>,
    /// Rules that still run when the field value is empty
    pub empty_rules: Vec<String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            helper_class: "Valid".to_string(),
            error_file: None,
            empty_rules: vec!["notEmpty".to_string(), "matches".to_string()],
        }
    }
}

/// Message and translation file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nSettings {
    pub message_paths: Vec<String>,
    pub i18n_paths: Vec<String>,
    /// Target language
    pub lang: String,
    /// Language the source strings are written in
    pub source: String,
    /// File extension for message and language files
    pub extension: String,
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            message_paths: Vec::new(),
            i18n_paths: Vec::new(),
            lang: "en-us".to_string(),
            source: "en-us".to_string(),
            extension: "json".to_string(),
        }
    }
}

impl Settings {
    /// Load from a JSON or TOML file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;

        serde_json::from_value(value).map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// Defaults overridden by `WARDEN_*` variables (a `.env` file is read first).
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Override fields from `WARDEN_*` variables.
    pub fn merge_env(mut self) -> Result<Self> {
        EnvLoader::dotenv(None)?;
        let vars = EnvLoader::new(Some(ENV_PREFIX.to_string())).load();
        self.apply_vars(&vars);
        Ok(self)
    }

    /// Apply already-collected variables, keyed without the prefix.
    ///
    /// Path and rule lists are comma separated.
    pub fn apply_vars(&mut self, vars: &HashMap<String, String>) {
        if let Some(v) = vars.get("helper_class") {
            self.validation.helper_class = v.clone();
        }
        if let Some(v) = vars.get("error_file") {
            self.validation.error_file = Some(v.clone()).filter(|s| !s.is_empty());
        }
        if let Some(v) = vars.get("empty_rules") {
            self.validation.empty_rules = split_list(v);
        }
        if let Some(v) = vars.get("message_paths") {
            self.i18n.message_paths = split_list(v);
        }
        if let Some(v) = vars.get("i18n_paths") {
            self.i18n.i18n_paths = split_list(v);
        }
        if let Some(v) = vars.get("lang") {
            self.i18n.lang = v.clone();
        }
        if let Some(v) = vars.get("source_lang") {
            self.i18n.source = v.clone();
        }
        if let Some(v) = vars.get("message_ext") {
            self.i18n.extension = v.trim_start_matches('.').to_string();
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
