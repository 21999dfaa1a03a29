// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Environment variable loader
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Read a `.env` file into the process environment before loading.
    ///
    /// A missing default `.env` is not an error; a missing explicit path is.
    pub fn dotenv(path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Ok(())
    }

    /// All variables under the prefix, keyed by the lower-cased remainder
    pub fn load(&self) -> HashMap<String, String> {
        env::vars()
            .filter_map(|(key, value)| match self.prefix {
                Some(ref prefix) => key
                    .strip_prefix(prefix.as_str())
                    .map(|rest| (rest.trim_start_matches('_').to_lowercase(), value)),
                None => Some((key.to_lowercase(), value)),
            })
            .collect()
    }
}
