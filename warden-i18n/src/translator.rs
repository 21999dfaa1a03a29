//! Translation tables
//!
//! Language files map source strings to translated strings and live under
//! `{path}/{language}/{region}.{ext}` and `{path}/{language}.{ext}`:
//!
//! ```text
//! i18n/zh.json      {"Username": "用户名"}
//! i18n/zh/cn.json   {":field must not be empty": ":field不能为空"}
//! ```
//!
//! The table for `zh-cn` holds both files, the more specific one winning.

use crate::{I18nError, Result, strtr};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use warden_config::{ConfigLoader, FileFormat, I18nSettings};

type Table = HashMap<String, String>;

/// Translates message templates and substitutes their placeholders.
pub trait Translator: Send + Sync {
    /// Translate `template` into `lang` (or the default target language),
    /// then replace each `(placeholder, value)` pair.
    fn translate(&self, template: &str, params: &[(String, String)], lang: Option<&str>) -> String;
}

/// Normalize a language tag: lowercase, spaces and underscores become `-`.
///
/// ```
/// assert_eq!(warden_i18n::normalize_lang("en_US"), "en-us");
/// assert_eq!(warden_i18n::normalize_lang("zh CN"), "zh-cn");
/// ```
pub fn normalize_lang(lang: &str) -> String {
    lang.trim().replace([' ', '_'], "-").to_lowercase()
}

/// File-backed translator with per-language cached tables.
#[derive(Debug)]
pub struct I18n {
    paths: RwLock<Vec<PathBuf>>,
    lang: RwLock<String>,
    source: String,
    loader: ConfigLoader,
    memory: RwLock<HashMap<String, Table>>,
    cache: RwLock<HashMap<String, Arc<Table>>>,
}

impl I18n {
    /// Create a translator targeting `en-us` from `en-us` sources.
    pub fn new() -> Self {
        Self {
            paths: RwLock::new(Vec::new()),
            lang: RwLock::new("en-us".to_string()),
            source: "en-us".to_string(),
            loader: ConfigLoader::new(FileFormat::Json),
            memory: RwLock::new(HashMap::new()),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create a translator from the `[i18n]` settings section.
    pub fn from_settings(settings: &I18nSettings) -> Self {
        let mut i18n = Self::new().with_source(&settings.source);
        match FileFormat::from_extension(&settings.extension) {
            Some(format) => i18n.loader = ConfigLoader::new(format),
            None => warden_log::warn!(
                target: "warden::i18n",
                "unknown language file extension {:?}, reading json",
                settings.extension
            ),
        }
        for path in &settings.i18n_paths {
            i18n.add_path(path);
        }
        i18n.set_lang(&settings.lang);
        i18n
    }

    /// Set the source language of untranslated strings.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = normalize_lang(source);
        self
    }

    /// Set the target language.
    pub fn with_lang(self, lang: &str) -> Self {
        self.set_lang(lang);
        self
    }

    /// Set the file format (and therefore the extension) of language files.
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

    /// Current target language.
    pub fn lang(&self) -> String {
        self.lang.read().clone()
    }

    /// Change the target language.
    pub fn set_lang(&self, lang: &str) {
        *self.lang.write() = normalize_lang(lang);
    }

    /// Source language.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Register in-memory translations for exactly `lang`.
    pub fn insert_table<I, K, V>(&self, lang: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let lang = normalize_lang(lang);
        self.memory
            .write()
            .entry(lang)
            .or_default()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self.cache.write().clear();
    }

    /// Translation of `string`, or `string` itself when there is none.
    pub fn get(&self, string: &str, lang: Option<&str>) -> String {
        let lang = lang.map(normalize_lang).unwrap_or_else(|| self.lang());
        self.load(&lang)
            .get(string)
            .cloned()
            .unwrap_or_else(|| string.to_string())
    }

    /// Table for `lang`, built from the most to the least specific level.
    pub fn load(&self, lang: &str) -> Arc<Table> {
        let lang = normalize_lang(lang);
        if let Some(table) = self.cache.read().get(&lang) {
            return Arc::clone(table);
        }

        // A broken file counts as empty; other paths and levels still contribute.
        let built = self.build(&lang, |file| {
            Ok(self.read_table(file).unwrap_or_else(|e| {
                warden_log::warn!(target: "warden::i18n", "skipping {}", e);
                Table::new()
            }))
        });
        let table = Arc::new(built.unwrap_or_default());

        warden_log::debug!(
            target: "warden::i18n",
            "loaded {} translations for {}",
            table.len(),
            lang
        );

        self.cache.write().insert(lang, Arc::clone(&table));
        table
    }

    /// Build the table for `lang`, propagating file errors.
    pub fn try_build(&self, lang: &str) -> Result<Table> {
        self.build(&normalize_lang(lang), |file| self.read_table(file))
    }

    fn build<F>(&self, lang: &str, mut read: F) -> Result<Table>
    where
        F: FnMut(&Path) -> Result<Table>,
    {
        let mut table = Table::new();
        let mut parts: Vec<&str> = lang.split('-').filter(|p| !p.is_empty()).collect();

        while !parts.is_empty() {
            let mut level = Table::new();

            for file in self.candidates(&parts) {
                level.extend(read(&file)?);
            }
            if let Some(extra) = self.memory.read().get(&parts.join("-")) {
                level.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            for (key, value) in level {
                table.entry(key).or_insert(value);
            }
            parts.pop();
        }

        Ok(table)
    }

    fn candidates(&self, parts: &[&str]) -> Vec<PathBuf> {
        let mut relative = PathBuf::new();
        for part in parts {
            relative.push(part);
        }
        relative.set_extension(self.loader.format().extension());

        self.paths
            .read()
            .iter()
            .map(|dir| dir.join(&relative))
            .filter(|candidate| candidate.is_file())
            .collect()
    }

    fn read_table(&self, file: &Path) -> Result<Table> {
        let value = self
            .loader
            .load_file(file)
            .map_err(|source| I18nError::Load {
                path: file.display().to_string(),
                source,
            })?;

        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect()),
            _ => Err(I18nError::NotAMapping(file.display().to_string())),
        }
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for I18n {
    fn translate(&self, template: &str, params: &[(String, String)], lang: Option<&str>) -> String {
        let target = lang.map(normalize_lang).unwrap_or_else(|| self.lang());
        let message = if target == self.source {
            template.to_string()
        } else {
            self.get(template, Some(&target))
        };

        strtr(&message, params)
    }
}
