// Warden - rule-based validation of associative data
//
// This library checks mappings of field names to values against per-field
// rules and formats failures from message files, optionally translated.

// Re-export validation functionality
pub use warden_validation::*;

// Re-export supporting crates
pub use warden_config;
pub use warden_i18n;
pub use warden_log;

pub use warden_config::{ConfigError, Settings};
pub use warden_i18n::{I18n, I18nError, MessageResolver, Messages, Translator};

/// Build a validator for `data` with message and translation stores taken
/// from `settings`.
pub fn validator(data: serde_json::Map<String, serde_json::Value>, settings: &Settings) -> Validation {
    Validation::factory(data).with_settings(settings)
}

/// Load settings from a file and apply `WARDEN_*` environment overrides.
pub fn load_settings(path: impl AsRef<std::path::Path>) -> warden_config::Result<Settings> {
    Settings::from_file(path)?.merge_env()
}

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Arg, ErrorReport, Field, I18n, MessageResolver, Messages, Param, RuleRegistry, RuleSpec, RuleTarget,
        Settings, Translate, Translator, Valid, Validation, ValidationError, params,
    };
}
