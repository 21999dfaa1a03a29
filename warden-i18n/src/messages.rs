//! Message file lookup
//!
//! Message files are nested mappings stored under one or more search paths,
//! e.g. `messages/forms/login.json`:
//!
//! ```json
//! { "username": { "notEmpty": ":field is required" } }
//! ```
//!
//! Every search path holding the file contributes; later paths override
//! earlier ones key by key.

use crate::tree::{lookup_path, merge_into};
use crate::{I18nError, Result};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use warden_config::{ConfigLoader, FileFormat, I18nSettings};

/// Resolves message templates by file name and dotted key path.
pub trait MessageResolver: Send + Sync {
    /// Whole mapping of `file` when `path` is `None`, else the value at `path`.
    fn load(&self, file: &str, path: Option<&str>) -> Option<Value>;

    /// Value at `path` when it is a non-empty string.
    fn message(&self, file: &str, path: &str) -> Option<String> {
        match self.load(file, Some(path)) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// File-backed message store with a per-file cache.
#[derive(Debug)]
pub struct Messages {
    paths: RwLock<Vec<PathBuf>>,
    loader: ConfigLoader,
    memory: RwLock<HashMap<String, Value>>,
    cache: RwLock<HashMap<String, Value>>,
}

impl Messages {
    /// Create a store with no search paths, reading JSON files.
    pub fn new() -> Self {
        Self {
            paths: RwLock::new(Vec::new()),
            loader: ConfigLoader::new(FileFormat::Json),
            memory: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store from the `[i18n]` settings section.
    pub fn from_settings(settings: &I18nSettings) -> Self {
        let mut messages = Self::new();
        match FileFormat::from_extension(&settings.extension) {
            Some(format) => messages.loader = ConfigLoader::new(format),
            None => warden_log::warn!(
                target: "warden::messages",
                "unknown message file extension {:?}, reading json",
                settings.extension
            ),
        }
        for path in &settings.message_paths {
            messages.add_path(path);
        }
        messages
    }

    /// Set the file format (and therefore the extension) of message files.
    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.loader = ConfigLoader::new(format);
        self
    }

    /// Add a search path.
    pub fn with_path(self, path: impl AsRef<Path>) -> Self {
        self.add_path(path);
        self
    }

    /// Add a search path unless already present. Clears the cache.
    pub fn add_path(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut paths = self.paths.write();
        if !paths.contains(&path) {
            paths.push(path);
            self.cache.write().clear();
        }
    }

    /// Search paths in lookup order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.read().clone()
    }

    /// Register an in-memory message mapping for `file`.
    ///
    /// Merged over whatever the search paths provide.
    pub fn insert(&self, file: impl Into<String>, messages: Value) {
        let file = file.into();
        {
            let mut memory = self.memory.write();
            let entry = memory
                .entry(file.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            merge_into(entry, messages);
        }
        self.cache.write().remove(&file);
    }

    /// Drop every cached file.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Value at `path`, or `default` when missing.
    pub fn load_with_default(&self, file: &str, path: &str, default: Value) -> Value {
        self.load(file, Some(path)).unwrap_or(default)
    }

    /// Read and merge `file` from every search path, propagating failures.
    pub fn try_load_file(&self, file: &str) -> Result<Value> {
        let mut merged = Value::Object(Map::new());
        for candidate in self.candidates(file) {
            merge_into(&mut merged, self.read_mapping(&candidate)?);
        }
        Ok(self.with_memory(file, merged))
    }

    fn candidates(&self, file: &str) -> Vec<PathBuf> {
        let name = format!("{}.{}", file, self.loader.format().extension());
        self.paths
            .read()
            .iter()
            .map(|dir| dir.join(&name))
            .filter(|candidate| candidate.is_file())
            .collect()
    }

    fn read_mapping(&self, candidate: &Path) -> Result<Value> {
        let value = self
            .loader
            .load_file(candidate)
            .map_err(|source| I18nError::Load {
                path: candidate.display().to_string(),
                source,
            })?;

        if value.is_object() {
            Ok(value)
        } else {
            Err(I18nError::NotAMapping(candidate.display().to_string()))
        }
    }

    fn with_memory(&self, file: &str, mut merged: Value) -> Value {
        if let Some(extra) = self.memory.read().get(file) {
            merge_into(&mut merged, extra.clone());
        }
        merged
    }

    fn file(&self, file: &str) -> Value {
        if let Some(cached) = self.cache.read().get(file) {
            return cached.clone();
        }

        warden_log::debug!(target: "warden::messages", "loading message file {}", file);

        // A broken candidate counts as empty; the other paths still contribute.
        let mut merged = Value::Object(Map::new());
        for candidate in self.candidates(file) {
            match self.read_mapping(&candidate) {
                Ok(value) => merge_into(&mut merged, value),
                Err(e) => warden_log::warn!(target: "warden::messages", "skipping {}", e),
            }
        }
        let value = self.with_memory(file, merged);

        self.cache.write().insert(file.to_string(), value.clone());
        value
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageResolver for Messages {
    fn load(&self, file: &str, path: Option<&str>) -> Option<Value> {
        let messages = self.file(file);
        match path {
            None => Some(messages),
            Some(path) => lookup_path(&messages, path).cloned(),
        }
    }
}
