// Environment-driven logging configuration

use crate::{Format, Level};
use std::env;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether debug mode is enabled
    pub debug: bool,
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include timestamps
    pub timestamps: bool,
    /// Whether to include the target (module path)
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Read the `WARDEN_*` variables.
    ///
    /// - `WARDEN_DEBUG=1` - enable debug logging
    /// - `WARDEN_LOG_LEVEL=trace|debug|info|warn|error|off`
    /// - `WARDEN_LOG_FORMAT=pretty|compact|json`
    /// - `WARDEN_LOG_COLOR=1|0`
    /// - `WARDEN_LOG_TIMESTAMPS=1|0`
    /// - `WARDEN_LOG_MODULE=1|0`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        let debug = flag("WARDEN_DEBUG").unwrap_or(false);

        let level = lookup("WARDEN_LOG_LEVEL")
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = lookup("WARDEN_LOG_FORMAT")
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = flag("WARDEN_LOG_COLOR")
            .unwrap_or_else(|| lookup("NO_COLOR").is_none() && lookup("TERM").is_some());

        Self {
            debug,
            level,
            format,
            color,
            timestamps: flag("WARDEN_LOG_TIMESTAMPS").unwrap_or(true),
            module_path: flag("WARDEN_LOG_MODULE").unwrap_or(true),
        }
    }
}
