//! Message and Translation Lookup for Warden
//!
//! - **Messages**: nested message files looked up by `file` + dotted key path
//! - **Translation**: per-language string tables with `xx-yy` → `xx` fallback
//! - **Substitution**: `:placeholder` replacement via [`strtr`]
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use warden_i18n::{I18n, MessageResolver, Messages, Translator};
//!
//! let messages = Messages::new();
//! messages.insert("validation", json!({"notEmpty": ":field must not be empty"}));
//!
//! let template = messages.message("validation", "notEmpty").unwrap();
//!
//! let i18n = I18n::new();
//! i18n.insert_table("zh-cn", [(":field must not be empty", ":field不能为空")]);
//!
//! let params = vec![(":field".to_string(), "username".to_string())];
//! assert_eq!(i18n.translate(&template, &params, None), "username must not be empty");
//! assert_eq!(i18n.translate(&template, &params, Some("zh-cn")), "username不能为空");
//! ```

mod error;
mod messages;
mod strtr;
mod translator;
mod tree;

pub use error::I18nError;
pub use messages::{MessageResolver, Messages};
pub use strtr::strtr;
pub use translator::{I18n, Translator, normalize_lang};
pub use tree::{lookup_path, merge_into};

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{I18n, I18nError, MessageResolver, Messages, Result, Translator, strtr};
}
