//! Rule-based validation of field mappings
//!
//! A [`Validation`] wraps a mapping of field names to values together with
//! the rules each field must pass. [`Validation::check`] runs the rules and
//! records at most one error per field; [`Validation::errors`] turns those
//! records into messages looked up in message files.
//!
//! ```
//! use serde_json::json;
//! use warden_validation::{Validation, params};
//!
//! let mut validation = Validation::from_json(json!({
//!     "username": "",
//!     "password": "secret",
//!     "password_repeat": "secreT",
//! }))
//! .unwrap()
//! .rule("username", "notEmpty")
//! .rule_with("password", "minLength", params![":value", 4])
//! .rule_with("password", "matches", params![":data", ":field", "password_repeat"]);
//!
//! assert!(!validation.check().unwrap());
//! assert_eq!(validation.field_error("username").unwrap().kind, "notEmpty");
//! assert_eq!(validation.field_error("password").unwrap().kind, "matches");
//! ```
//!
//! # Rules
//!
//! Rules are [`RuleSpec`]s with a parameter list. Parameters naming a
//! placeholder are replaced when the rule runs:
//!
//! - `:value` and `:field`: the field being checked
//! - `:data`: every field, as a mapping value
//! - `:validation`: every field, as an opaque argument
//! - any key given to [`Validation::bind`]
//!
//! A rule whose field is empty (`null`, `false`, `""`, `[]`, `{}`) is run
//! but its outcome is ignored, unless the rule is one of the empty rules
//! (`notEmpty` and `matches` by default).

use crate::rule::{Field, FieldError, Param, Rule, RuleContext, RuleSpec, Slot};
use crate::{Arg, ErrorReport, Result, RuleRegistry, Translate, Valid, ValidationError, render_value};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use warden_config::{Settings, ValidationSettings};
use warden_i18n::{I18n, MessageResolver, Messages, Translator, strtr};

static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}]+").unwrap());

static NULL: Value = Value::Null;

/// Message file consulted when the error file has no entry for a rule.
pub const FALLBACK_MESSAGE_FILE: &str = "validation";

/// Display name derived from a field name: `password_repeat` → `password repeat`.
pub fn auto_label(field: &str) -> String {
    NON_LETTERS.replace_all(field, " ").into_owned()
}

/// Validator over a mapping of field names to values.
#[derive(Clone)]
pub struct Validation {
    data: Map<String, Value>,
    labels: IndexMap<String, String>,
    rules: IndexMap<Field, Vec<Rule>>,
    bound: IndexMap<String, Arg>,
    errors: IndexMap<String, FieldError>,
    error_file: Option<String>,
    helper_class: String,
    empty_rules: Vec<String>,
    registry: Arc<RuleRegistry>,
    messages: Arc<dyn MessageResolver>,
    translator: Arc<dyn Translator>,
}

/// Placeholder values of the field being checked.
struct Scope<'a> {
    field: &'a str,
    value: &'a Value,
    validation: &'a Arc<Map<String, Value>>,
    data: &'a Value,
}

impl Scope<'_> {
    fn slot(&self, slot: Slot) -> Arg {
        match slot {
            Slot::Value => Arg::Value(self.value.clone()),
            Slot::Field => Arg::from(self.field),
            Slot::Validation => Arg::Validation(Arc::clone(self.validation)),
            Slot::Data => Arg::Value(self.data.clone()),
        }
    }
}

impl Validation {
    /// Create a validator for `data`.
    pub fn factory(data: Map<String, Value>) -> Self {
        let defaults = ValidationSettings::default();
        Self {
            data,
            labels: IndexMap::new(),
            rules: IndexMap::new(),
            bound: IndexMap::new(),
            errors: IndexMap::new(),
            error_file: defaults.error_file,
            helper_class: defaults.helper_class,
            empty_rules: defaults.empty_rules,
            registry: RuleRegistry::shared(),
            messages: Arc::new(Messages::new()),
            translator: Arc::new(I18n::new()),
        }
    }

    /// Create a validator for a JSON object; `None` for any other value.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::factory(map)),
            _ => None,
        }
    }

    /// Same rules, labels, bindings and resolvers over new data.
    ///
    /// The copy starts without errors.
    pub fn copy(&self, data: Map<String, Value>) -> Self {
        let mut copy = self.clone();
        copy.data = data;
        copy.errors.clear();
        copy
    }

    // ========================================================================
    // Builder
    // ========================================================================

    /// Set the display name of a field.
    pub fn label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Set several display names.
    pub fn labels<I, K, V>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, label) in labels {
            self.labels.insert(field.into(), label.into());
        }
        self
    }

    /// Add a rule called with the field's value.
    pub fn rule(self, field: impl Into<Field>, spec: impl Into<RuleSpec>) -> Self {
        self.rule_with(field, spec, Rule::default_params())
    }

    /// Add a rule with explicit parameters.
    ///
    /// The first rule of a field without a label gives it one.
    pub fn rule_with(mut self, field: impl Into<Field>, spec: impl Into<RuleSpec>, params: Vec<Param>) -> Self {
        let field = field.into();
        if let Field::Name(name) = &field {
            if !self.labels.contains_key(name) {
                self.labels.insert(name.clone(), auto_label(name));
            }
        }
        self.rules.entry(field).or_default().push(Rule::new(spec, params));
        self
    }

    /// Add several rules; `None` parameters mean `[":value"]`.
    pub fn rules<I, S>(mut self, field: impl Into<Field>, rules: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Vec<Param>>)>,
        S: Into<RuleSpec>,
    {
        let field = field.into();
        for (spec, params) in rules {
            self = self.rule_with(field.clone(), spec, params.unwrap_or_else(Rule::default_params));
        }
        self
    }

    /// Bind a value to a placeholder key such as `:model`.
    pub fn bind(mut self, key: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.bound.insert(key.into(), value.into());
        self
    }

    /// Bind several values.
    pub fn bind_all<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Arg>,
    {
        for (key, value) in values {
            self.bound.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_messages(mut self, messages: Arc<dyn MessageResolver>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_error_file(mut self, file: impl Into<String>) -> Self {
        self.error_file = Some(file.into());
        self
    }

    /// Apply the `[validation]` settings section.
    pub fn configure(mut self, settings: &ValidationSettings) -> Self {
        self.helper_class = settings.helper_class.clone();
        self.error_file = settings.error_file.clone();
        self.empty_rules = settings.empty_rules.clone();
        self
    }

    /// Apply all settings, building message and translation stores from the
    /// `[i18n]` section.
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.configure(&settings.validation)
            .with_messages(Arc::new(Messages::from_settings(&settings.i18n)))
            .with_translator(Arc::new(I18n::from_settings(&settings.i18n)))
    }

    // ========================================================================
    // Checking
    // ========================================================================

    /// Run every rule and record the first failure of each field.
    ///
    /// Returns `Ok(true)` when no field has an error. Rules that cannot be
    /// resolved abort the pass with [`ValidationError::RuleResolution`],
    /// leaving no errors recorded. The data itself is never modified.
    pub fn check(&mut self) -> Result<bool> {
        self.errors.clear();

        let mut fields: Vec<&str> = self.data.keys().map(String::as_str).collect();
        fields.extend(
            self.labels
                .keys()
                .map(String::as_str)
                .filter(|field| !self.data.contains_key(*field)),
        );

        let mut table: IndexMap<&str, Vec<&Rule>> = self
            .rules
            .iter()
            .filter_map(|(field, rules)| match field {
                Field::Name(name) => Some((name.as_str(), rules.iter().collect())),
                Field::Global => None,
            })
            .collect();

        let global = self.rules.get(&Field::Global);
        let mut working = Map::new();
        for &field in &fields {
            working.insert(field.to_string(), self.data.get(field).cloned().unwrap_or(Value::Null));
            if let Some(global) = global {
                table.entry(field).or_default().extend(global.iter());
            }
        }

        warden_log::debug!(
            target: "warden::validation",
            "checking {} fields against {} rule sets",
            working.len(),
            table.len()
        );

        let validation = Arc::new(working);
        let data = Value::Object((*validation).clone());
        let mut errors = IndexMap::new();

        for (&field, rules) in &table {
            let value = validation.get(field).unwrap_or(&NULL);
            let scope = Scope {
                field,
                value,
                validation: &validation,
                data: &data,
            };
            let empty = !Valid::not_empty(value);

            for rule in rules {
                let args = self.resolve_params(&rule.params, &scope);
                let passed = self.invoke(&rule.spec, &args, &scope, &mut errors)?;

                warden_log::trace!(target: "warden::validation", "{} {} -> {}", field, rule.spec, passed);

                if empty && !self.is_empty_rule(&rule.spec) {
                    continue;
                }

                if !passed {
                    if let Some(kind) = rule.spec.error_name() {
                        warden_log::debug!(target: "warden::validation", "field {} failed {}", field, kind);
                        errors.insert(field.to_string(), FieldError::new(kind, args));
                        break;
                    }
                }

                if errors.contains_key(field) {
                    break;
                }
            }
        }

        self.errors = errors;
        Ok(self.errors.is_empty())
    }

    /// Record an error for `field`, replacing any earlier one.
    pub fn error(&mut self, field: impl Into<String>, kind: impl Into<String>, params: Option<Vec<Arg>>) -> &mut Self {
        self.errors
            .insert(field.into(), FieldError::new(kind, params.unwrap_or_default()));
        self
    }

    fn is_empty_rule(&self, spec: &RuleSpec) -> bool {
        spec.identifier()
            .is_some_and(|id| self.empty_rules.iter().any(|rule| rule == id))
    }

    /// Value of a placeholder key; per-field slots shadow bindings.
    fn lookup(&self, key: &str, scope: &Scope<'_>) -> Option<Arg> {
        match Slot::parse(key) {
            Some(slot) => Some(scope.slot(slot)),
            None => self.bound.get(key).cloned(),
        }
    }

    fn resolve_params(&self, params: &[Param], scope: &Scope<'_>) -> Vec<Arg> {
        params
            .iter()
            .map(|param| match param {
                Param::Slot(slot) => scope.slot(*slot),
                Param::Literal(Value::String(key)) => self
                    .lookup(key, scope)
                    .unwrap_or_else(|| Arg::from(key.as_str())),
                Param::Literal(value) => Arg::Value(value.clone()),
            })
            .collect()
    }

    fn invoke(
        &self,
        spec: &RuleSpec,
        args: &[Arg],
        scope: &Scope<'_>,
        errors: &mut IndexMap<String, FieldError>,
    ) -> Result<bool> {
        match spec {
            RuleSpec::Named(id) => {
                if let Some(rule) = self.registry.get_method(&self.helper_class, id) {
                    return Ok(rule(args));
                }
                match id.split_once("::") {
                    None => self.call_function(id, args),
                    Some((class, method)) => self.call_method(spec, class, method, args),
                }
            }
            RuleSpec::Function(id) => self.call_function(id, args),
            RuleSpec::Method(target, method) => match self.lookup(target, scope) {
                Some(Arg::Object(object)) => object.call(method, args).ok_or_else(|| {
                    resolution_failed(spec, format!("bound object `{}` has no method `{}`", target, method))
                }),
                Some(Arg::Value(Value::String(class))) => self.call_method(spec, &class, method, args),
                Some(_) => Err(resolution_failed(spec, format!("`{}` is bound to something not callable", target))),
                None => self.call_method(spec, target, method, args),
            },
            RuleSpec::Inline(rule) => {
                let mut context = RuleContext {
                    field: scope.field,
                    value: scope.value,
                    data: scope.validation,
                    errors,
                };
                Ok(rule(&mut context, args))
            }
        }
    }

    fn call_function(&self, name: &str, args: &[Arg]) -> Result<bool> {
        match self.registry.get_function(name) {
            Some(rule) => Ok(rule(args)),
            None => Err(resolution_failed(
                &RuleSpec::function(name),
                format!("no `{}` helper method and no such function", name),
            )),
        }
    }

    fn call_method(&self, spec: &RuleSpec, class: &str, method: &str, args: &[Arg]) -> Result<bool> {
        match self.registry.get_method(class, method) {
            Some(rule) => Ok(rule(args)),
            None if self.registry.has_class(class) => {
                Err(resolution_failed(spec, format!("class `{}` has no method `{}`", class, method)))
            }
            None => Err(resolution_failed(spec, format!("unknown class `{}`", class))),
        }
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Errors of the last check.
    ///
    /// Without a message file (`file` or the configured error file) the raw
    /// records are returned. Otherwise each field gets a message from the
    /// first non-empty string of:
    ///
    /// 1. `{file}` at `{field}.{kind}`
    /// 2. `{file}` at `{field}.default`
    /// 3. `{file}` at `{kind}`
    /// 4. `validation` at `{kind}`
    ///
    /// falling back to the text `{file}.{field}.{kind}`. Messages may use
    /// `:field`, `:value` and `:param1`, `:param2`... for the rule's
    /// parameters.
    pub fn errors(&self, file: Option<&str>, translate: impl Into<Translate>) -> ErrorReport {
        let Some(file) = file.map(str::to_string).or_else(|| self.error_file.clone()) else {
            return ErrorReport::Raw(self.errors.clone());
        };
        let translate = translate.into();

        let messages: IndexMap<String, String> = self
            .errors
            .iter()
            .map(|(field, error)| (field.clone(), self.format_error(&file, field, error, &translate)))
            .collect();

        ErrorReport::Messages(messages)
    }

    fn format_error(&self, file: &str, field: &str, error: &FieldError, translate: &Translate) -> String {
        let label = self.labels.get(field).map(String::as_str).unwrap_or(field);

        let mut values = vec![
            (":field".to_string(), self.translate_text(label, translate)),
            (":value".to_string(), render_value(self.data.get(field).unwrap_or(&NULL))),
        ];

        for (i, param) in error.params.iter().enumerate() {
            let Arg::Value(value) = param else {
                continue;
            };
            let mut text = render_value(value);
            if let Some(label) = self.labels.get(&text) {
                text = self.translate_text(label, translate);
            }
            values.push((format!(":param{}", i + 1), text));
        }

        let template = self.template(file, field, &error.kind);

        if translate.is_enabled() {
            self.translator.translate(&template, &values, translate.lang())
        } else {
            strtr(&template, &values)
        }
    }

    fn template(&self, file: &str, field: &str, kind: &str) -> String {
        self.messages
            .message(file, &format!("{}.{}", field, kind))
            .or_else(|| self.messages.message(file, &format!("{}.default", field)))
            .or_else(|| self.messages.message(file, kind))
            .or_else(|| self.messages.message(FALLBACK_MESSAGE_FILE, kind))
            .unwrap_or_else(|| format!("{}.{}.{}", file, field, kind))
    }

    fn translate_text(&self, text: &str, translate: &Translate) -> String {
        if translate.is_enabled() {
            self.translator.translate(text, &[], translate.lang())
        } else {
            text.to_string()
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn set_data(&mut self, data: Map<String, Value>) {
        self.data = data;
    }

    pub fn error_file(&self) -> Option<&str> {
        self.error_file.as_deref()
    }

    pub fn set_error_file(&mut self, file: Option<String>) {
        self.error_file = file;
    }

    pub fn helper_class(&self) -> &str {
        &self.helper_class
    }

    pub fn set_helper_class(&mut self, class: impl Into<String>) {
        self.helper_class = class.into();
    }

    pub fn empty_rules(&self) -> &[String] {
        &self.empty_rules
    }

    pub fn set_empty_rules<I, S>(&mut self, rules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.empty_rules = rules.into_iter().map(Into::into).collect();
    }

    pub fn labels_map(&self) -> &IndexMap<String, String> {
        &self.labels
    }

    pub fn field_error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn error_entries(&self) -> &IndexMap<String, FieldError> {
        &self.errors
    }

    /// Value of `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// True when `field` is present and not `null`.
    pub fn exists(&self, field: &str) -> bool {
        self.data.get(field).is_some_and(|value| !value.is_null())
    }

    /// Read-only view of the data.
    pub fn view(&self) -> DataView<'_> {
        DataView { data: &self.data }
    }
}

fn resolution_failed(spec: &RuleSpec, reason: String) -> ValidationError {
    warden_log::warn!(target: "warden::validation", "cannot resolve rule {}: {}", spec, reason);
    ValidationError::unresolved(spec.to_string(), reason)
}

impl Default for Validation {
    fn default() -> Self {
        Self::factory(Map::new())
    }
}

impl Index<&str> for Validation {
    type Output = Value;

    /// Missing fields read as `null`.
    fn index(&self, field: &str) -> &Value {
        self.data.get(field).unwrap_or(&NULL)
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("data", &self.data)
            .field("labels", &self.labels)
            .field("rules", &self.rules)
            .field("bound", &self.bound)
            .field("errors", &self.errors)
            .field("error_file", &self.error_file)
            .field("helper_class", &self.helper_class)
            .field("empty_rules", &self.empty_rules)
            .finish_non_exhaustive()
    }
}

/// Borrowed, read-only access to validated data.
#[derive(Debug, Clone, Copy)]
pub struct DataView<'a> {
    data: &'a Map<String, Value>,
}

impl<'a> DataView<'a> {
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.data.get(field)
    }

    /// True when `field` is present and not `null`.
    pub fn exists(&self, field: &str) -> bool {
        self.get(field).is_some_and(|value| !value.is_null())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Index<&str> for DataView<'_> {
    type Output = Value;

    fn index(&self, field: &str) -> &Value {
        self.data.get(field).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde_json::json;

    fn validation(data: Value) -> Validation {
        Validation::from_json(data).unwrap()
    }

    #[test]
    fn test_auto_label() {
        assert_eq!(auto_label("password_repeat"), "password repeat");
        assert_eq!(auto_label("user__name2x"), "user name x");
        assert_eq!(auto_label("名字"), "名字");
    }

    #[test]
    fn test_rule_adds_label_once() {
        let v = validation(json!({}))
            .label("email", "E-mail")
            .rule("email", "email")
            .rule("first_name", "notEmpty")
            .rule(Field::Global, "notEmpty");

        assert_eq!(v.labels_map().get("email").map(String::as_str), Some("E-mail"));
        assert_eq!(v.labels_map().get("first_name").map(String::as_str), Some("first name"));
        assert_eq!(v.labels_map().len(), 2);
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Validation::from_json(json!([1, 2])).is_none());
        assert!(Validation::from_json(json!("x")).is_none());
    }

    #[test]
    fn test_slots_shadow_bindings() {
        let mut v = validation(json!({"name": "abc"}))
            .bind(":value", "bound")
            .rule_with(
                "name",
                RuleSpec::inline(|ctx, args| {
                    if args[0].as_str() != Some("abc") {
                        ctx.error("name", "shadowed", vec![]);
                    }
                    true
                }),
                params![":value"],
            );

        assert!(v.check().unwrap());
    }

    #[test]
    fn test_bound_literal_params_are_replaced() {
        let mut v = validation(json!({"code": "abcd"}))
            .bind(":len", 4)
            .rule_with("code", "exactLength", params![":value", ":len"]);

        assert!(v.check().unwrap());
    }

    #[test]
    fn test_index_and_view() {
        let v = validation(json!({"a": 1, "b": null}));

        assert_eq!(v["a"], json!(1));
        assert_eq!(v["missing"], Value::Null);
        assert!(v.exists("a"));
        assert!(!v.exists("b"));
        assert!(!v.exists("missing"));

        let view = v.view();
        assert_eq!(view.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(view["a"], json!(1));
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_manual_error() {
        let mut v = validation(json!({}));
        v.error("token", "expired", None);

        let error = v.field_error("token").unwrap();
        assert_eq!(error.kind, "expired");
        assert!(error.params.is_empty());
    }

    #[test]
    fn test_configure_applies_settings() {
        let settings = ValidationSettings {
            helper_class: "Rules".to_string(),
            error_file: Some("forms/signup".to_string()),
            empty_rules: vec!["notEmpty".to_string()],
        };
        let v = Validation::default().configure(&settings);

        assert_eq!(v.helper_class(), "Rules");
        assert_eq!(v.error_file(), Some("forms/signup"));
        assert_eq!(v.empty_rules(), ["notEmpty".to_string()]);
    }
}
