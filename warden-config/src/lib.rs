// Configuration management for Warden

pub mod env;
pub mod error;
pub mod loader;
pub mod settings;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::{I18nSettings, Settings, ValidationSettings};
