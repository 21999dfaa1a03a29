// Error reports

use crate::{FieldError, render_value};
use indexmap::IndexMap;
use serde_json::{Value, json};
use std::fmt;

/// Whether and how `errors()` translates labels and messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Translate {
    /// Substitute placeholders only
    No,
    /// Translate into the translator's current language
    #[default]
    Default,
    /// Translate into the given language
    Lang(String),
}

impl Translate {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Translate::No)
    }

    /// Explicit target language, if any.
    pub fn lang(&self) -> Option<&str> {
        match self {
            Translate::Lang(lang) => Some(lang),
            _ => None,
        }
    }
}

impl From<bool> for Translate {
    fn from(translate: bool) -> Self {
        if translate {
            Translate::Default
        } else {
            Translate::No
        }
    }
}

impl From<&str> for Translate {
    fn from(lang: &str) -> Self {
        Translate::Lang(lang.to_string())
    }
}

impl From<String> for Translate {
    fn from(lang: String) -> Self {
        Translate::Lang(lang)
    }
}

/// Result of [`Validation::errors`](crate::Validation::errors).
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorReport {
    /// Error records, when there is no message file to format them with
    Raw(IndexMap<String, FieldError>),
    /// Formatted message per field
    Messages(IndexMap<String, String>),
}

impl ErrorReport {
    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of fields in error
    pub fn len(&self) -> usize {
        match self {
            ErrorReport::Raw(errors) => errors.len(),
            ErrorReport::Messages(messages) => messages.len(),
        }
    }

    /// Fields in error, in the order their errors were recorded.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ErrorReport::Raw(errors) => errors.keys().map(String::as_str).collect(),
            ErrorReport::Messages(messages) => messages.keys().map(String::as_str).collect(),
        }
    }

    /// Formatted message of `field`.
    pub fn message(&self, field: &str) -> Option<&str> {
        match self {
            ErrorReport::Messages(messages) => messages.get(field).map(String::as_str),
            ErrorReport::Raw(_) => None,
        }
    }

    /// Error record of `field`.
    pub fn raw(&self, field: &str) -> Option<&FieldError> {
        match self {
            ErrorReport::Raw(errors) => errors.get(field),
            ErrorReport::Messages(_) => None,
        }
    }

    pub fn into_messages(self) -> Option<IndexMap<String, String>> {
        match self {
            ErrorReport::Messages(messages) => Some(messages),
            ErrorReport::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<IndexMap<String, FieldError>> {
        match self {
            ErrorReport::Raw(errors) => Some(errors),
            ErrorReport::Messages(_) => None,
        }
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> Value {
        match self {
            ErrorReport::Messages(messages) => json!({
                "errors": messages.iter().map(|(field, message)| {
                    json!({
                        "field": field,
                        "message": message,
                    })
                }).collect::<Vec<_>>()
            }),
            ErrorReport::Raw(errors) => json!({
                "errors": errors.iter().map(|(field, error)| {
                    json!({
                        "field": field,
                        "constraint": error.kind,
                        "params": error
                            .params
                            .iter()
                            .filter_map(|p| p.as_value().cloned())
                            .collect::<Vec<_>>(),
                    })
                }).collect::<Vec<_>>()
            }),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReport::Messages(messages) => {
                for (field, message) in messages {
                    writeln!(f, "{}: {}", field, message)?;
                }
            }
            ErrorReport::Raw(errors) => {
                for (field, error) in errors {
                    let params: Vec<String> = error
                        .params
                        .iter()
                        .filter_map(|p| p.as_value().map(render_value))
                        .collect();
                    writeln!(f, "{}: {}({})", field, error.kind, params.join(", "))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arg;

    #[test]
    fn test_translate_conversions() {
        assert_eq!(Translate::from(true), Translate::Default);
        assert_eq!(Translate::from(false), Translate::No);
        assert_eq!(Translate::from("zh-cn").lang(), Some("zh-cn"));
        assert!(!Translate::No.is_enabled());
    }

    #[test]
    fn test_messages_report() {
        let mut messages = IndexMap::new();
        messages.insert("email".to_string(), "Email is invalid".to_string());
        let report = ErrorReport::Messages(messages);

        assert_eq!(report.len(), 1);
        assert_eq!(report.message("email"), Some("Email is invalid"));
        assert_eq!(report.raw("email"), None);
        assert_eq!(report.to_string(), "email: Email is invalid\n");
        assert_eq!(report.to_json()["errors"][0]["field"], "email");
    }

    #[test]
    fn test_raw_report_json_drops_opaque_params() {
        let mut errors = IndexMap::new();
        errors.insert(
            "password".to_string(),
            FieldError::new("minLength", vec![Arg::from("abc"), Arg::from(6)]),
        );
        let report = ErrorReport::Raw(errors);

        let json = report.to_json();
        assert_eq!(json["errors"][0]["constraint"], "minLength");
        assert_eq!(json["errors"][0]["params"], json!(["abc", 6]));
        assert_eq!(report.fields(), vec!["password"]);
        assert_eq!(report.to_string(), "password: minLength(abc, 6)\n");
    }
}
