// Rule model: specs, parameters and the inline rule context

use crate::Arg;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Placeholders filled in by the validator for each rule call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `:value` - the current field's value
    Value,
    /// `:field` - the current field's name
    Field,
    /// `:validation` - the data under validation, as an opaque argument
    Validation,
    /// `:data` - the data under validation, as a mapping value
    Data,
}

impl Slot {
    pub fn key(&self) -> &'static str {
        match self {
            Slot::Value => ":value",
            Slot::Field => ":field",
            Slot::Validation => ":validation",
            Slot::Data => ":data",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key {
            ":value" => Some(Slot::Value),
            ":field" => Some(Slot::Field),
            ":validation" => Some(Slot::Validation),
            ":data" => Some(Slot::Data),
            _ => None,
        }
    }
}

/// A rule parameter as registered.
///
/// Literal strings naming a bound key (e.g. `":model"`) are replaced by the
/// bound value when the rule runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Slot(Slot),
    Literal(Value),
}

impl From<Slot> for Param {
    fn from(slot: Slot) -> Self {
        Param::Slot(slot)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Slot::parse(s)
            .map(Param::Slot)
            .unwrap_or_else(|| Param::Literal(Value::String(s.to_string())))
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::from(s.as_str())
    }
}

impl From<Value> for Param {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Param::from(s),
            other => Param::Literal(other),
        }
    }
}

macro_rules! literal_param {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(value: $t) -> Self {
                    Param::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_param!(bool, i32, i64, u32, u64, usize, f64);

/// Build a parameter list from mixed literals and placeholders.
///
/// ```
/// use warden_validation::{Param, Slot, params};
///
/// let p = params![":value", 4];
/// assert_eq!(p[0], Param::Slot(Slot::Value));
/// ```
#[macro_export]
macro_rules! params {
    ($($param:expr),* $(,)?) => {
        vec![$($crate::Param::from($param)),*]
    };
}

/// Signature of inline rules.
pub type InlineFn = dyn Fn(&mut RuleContext<'_>, &[Arg]) -> bool + Send + Sync;

/// How a rule is resolved to something callable.
#[derive(Clone)]
pub enum RuleSpec {
    /// A rule identifier: a helper method, else a free function, else a
    /// `Class::method` reference
    Named(String),
    /// `(target, method)`: the target is a bound key or a class name
    Method(String, String),
    /// A free function, skipping the helper lookup
    Function(String),
    /// A closure; it records errors itself through [`RuleContext::error`]
    Inline(Arc<InlineFn>),
}

impl RuleSpec {
    pub fn named(name: impl Into<String>) -> Self {
        RuleSpec::Named(name.into())
    }

    pub fn method(target: impl Into<String>, method: impl Into<String>) -> Self {
        RuleSpec::Method(target.into(), method.into())
    }

    pub fn function(name: impl Into<String>) -> Self {
        RuleSpec::Function(name.into())
    }

    pub fn inline<F>(f: F) -> Self
    where
        F: Fn(&mut RuleContext<'_>, &[Arg]) -> bool + Send + Sync + 'static,
    {
        RuleSpec::Inline(Arc::new(f))
    }

    /// Error kind recorded when the rule fails; `None` for inline rules.
    pub fn error_name(&self) -> Option<&str> {
        match self {
            RuleSpec::Named(name) | RuleSpec::Function(name) => Some(name),
            RuleSpec::Method(_, method) => Some(method),
            RuleSpec::Inline(_) => None,
        }
    }

    /// String identifier, for rules registered by name.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            RuleSpec::Named(name) | RuleSpec::Function(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSpec::Named(name) | RuleSpec::Function(name) => f.write_str(name),
            RuleSpec::Method(target, method) => write!(f, "{}->{}", target, method),
            RuleSpec::Inline(_) => f.write_str("{closure}"),
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(name: &str) -> Self {
        RuleSpec::Named(name.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(name: String) -> Self {
        RuleSpec::Named(name)
    }
}

impl From<(&str, &str)> for RuleSpec {
    fn from((target, method): (&str, &str)) -> Self {
        RuleSpec::method(target, method)
    }
}

/// A rule attached to a field.
#[derive(Debug, Clone)]
pub struct Rule {
    pub spec: RuleSpec,
    pub params: Vec<Param>,
}

impl Rule {
    pub fn new(spec: impl Into<RuleSpec>, params: Vec<Param>) -> Self {
        Self {
            spec: spec.into(),
            params,
        }
    }

    /// `[":value"]`
    pub fn default_params() -> Vec<Param> {
        vec![Param::Slot(Slot::Value)]
    }
}

/// Field key for rule registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    /// Rules applied to every field in the data or labels
    Global,
    Name(String),
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::Name(name.to_string())
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::Name(name)
    }
}

impl From<bool> for Field {
    /// `true` selects the global rule set.
    fn from(global: bool) -> Self {
        if global {
            Field::Global
        } else {
            Field::Name("0".to_string())
        }
    }
}

/// The recorded failure of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// Rule name, method name, or a kind set by hand
    pub kind: String,
    /// Arguments the failing rule was called with
    pub params: Vec<Arg>,
}

impl FieldError {
    pub fn new(kind: impl Into<String>, params: Vec<Arg>) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }
}

/// What an inline rule sees while it runs.
pub struct RuleContext<'a> {
    pub(crate) field: &'a str,
    pub(crate) value: &'a Value,
    pub(crate) data: &'a Map<String, Value>,
    pub(crate) errors: &'a mut IndexMap<String, FieldError>,
}

impl RuleContext<'_> {
    /// Field being checked.
    pub fn field(&self) -> &str {
        self.field
    }

    /// Its value.
    pub fn value(&self) -> &Value {
        self.value
    }

    /// Another field's value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Every field under validation.
    pub fn data(&self) -> &Map<String, Value> {
        self.data
    }

    /// Record an error for `field`, replacing any earlier one.
    ///
    /// Recording one for the current field stops its remaining rules.
    pub fn error(&mut self, field: &str, kind: &str, params: Vec<Arg>) {
        self.errors
            .insert(field.to_string(), FieldError::new(kind, params));
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }
}
