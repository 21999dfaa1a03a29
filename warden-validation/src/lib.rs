//! Rule-based validation for Warden
//!
//! Validates mappings of field names to values (form input, decoded JSON)
//! against per-field rules, and formats failures with message files and
//! translations from `warden-i18n`.
//!
//! # Examples
//!
//! ## Checking data
//!
//! ```
//! use serde_json::json;
//! use warden_validation::{Field, Validation, params};
//!
//! let mut validation = Validation::from_json(json!({
//!     "email": "john@example.com",
//!     "age": "17",
//! }))
//! .unwrap()
//! .rule(Field::Global, "notEmpty")
//! .rule("email", "email")
//! .rule_with("age", "range", params![":value", 18, 130]);
//!
//! assert!(!validation.check().unwrap());
//! assert_eq!(validation.field_error("age").unwrap().kind, "range");
//! ```
//!
//! ## Formatting errors
//!
//! ```
//! use serde_json::json;
//! use std::sync::Arc;
//! use warden_i18n::Messages;
//! use warden_validation::{Validation, params};
//!
//! let messages = Messages::new();
//! messages.insert("validation", json!({"minLength": ":field must be at least :param2 characters"}));
//!
//! let mut validation = Validation::from_json(json!({"user_name": "ab"}))
//!     .unwrap()
//!     .with_messages(Arc::new(messages))
//!     .rule_with("user_name", "minLength", params![":value", 4]);
//!
//! validation.check().unwrap();
//!
//! let report = validation.errors(Some("forms/signup"), false);
//! assert_eq!(report.message("user_name"), Some("user name must be at least 4 characters"));
//! ```
//!
//! ## Custom rules
//!
//! ```
//! use serde_json::json;
//! use std::sync::Arc;
//! use warden_validation::{Arg, RuleRegistry, RuleSpec, Validation};
//!
//! let registry = RuleRegistry::default()
//!     .function("even", |args: &[Arg]| args[0].as_f64().is_some_and(|n| n % 2.0 == 0.0));
//!
//! let mut validation = Validation::from_json(json!({"count": 3, "index": 8}))
//!     .unwrap()
//!     .with_registry(Arc::new(registry))
//!     .rule("count", "even")
//!     .rule("index", RuleSpec::inline(|ctx, _args| {
//!         if ctx.value().as_i64().is_some_and(|n| n > 6) {
//!             let field = ctx.field().to_string();
//!             ctx.error(&field, "tooLarge", vec![]);
//!         }
//!         true
//!     }));
//!
//! assert!(!validation.check().unwrap());
//! assert_eq!(validation.field_error("count").unwrap().kind, "even");
//! assert_eq!(validation.field_error("index").unwrap().kind, "tooLarge");
//! ```

mod arg;
mod error;
mod registry;
mod report;
mod rule;
mod valid;
mod validation;

pub use arg::{Arg, RuleTarget, render_value};
pub use error::{Result, ValidationError};
pub use registry::{RuleFn, RuleRegistry};
pub use report::{ErrorReport, Translate};
pub use rule::{Field, FieldError, InlineFn, Param, Rule, RuleContext, RuleSpec, Slot};
pub use valid::{PHONE_LENGTHS, Valid};
pub use validation::{DataView, FALLBACK_MESSAGE_FILE, Validation, auto_label};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Arg, ErrorReport, Field, Param, RuleRegistry, RuleSpec, RuleTarget, Translate, Valid, Validation,
        ValidationError, params,
    };
}
