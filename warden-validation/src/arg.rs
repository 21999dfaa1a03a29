// Resolved rule arguments and bound values

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// An object that rules can be dispatched to by method name.
///
/// Bind one with [`Validation::bind`](crate::Validation::bind) and reference
/// it from a [`RuleSpec::Method`](crate::RuleSpec::Method) rule:
///
/// ```
/// use serde_json::json;
/// use warden_validation::{Arg, RuleTarget, Validation};
///
/// struct Statuses;
///
/// impl RuleTarget for Statuses {
///     fn call(&self, method: &str, args: &[Arg]) -> Option<bool> {
///         match method {
///             "known" => Some(matches!(args[0].as_str(), Some("draft" | "published"))),
///             _ => None,
///         }
///     }
/// }
///
/// let mut validation = Validation::from_json(json!({"status": "archived"}))
///     .unwrap()
///     .bind(":model", Arg::object(Statuses))
///     .rule("status", (":model", "known"));
///
/// assert!(!validation.check().unwrap());
/// ```
pub trait RuleTarget: Send + Sync {
    /// Run `method`; `None` when the target has no such method.
    fn call(&self, method: &str, args: &[Arg]) -> Option<bool>;
}

/// A rule argument after placeholder substitution, or a bound value.
#[derive(Clone)]
pub enum Arg {
    /// Plain data
    Value(Value),
    /// The data under validation (`:validation`)
    Validation(Arc<Map<String, Value>>),
    /// A bound object rules can call into
    Object(Arc<dyn RuleTarget>),
}

impl Arg {
    /// Wrap a rule target.
    pub fn object<T: RuleTarget + 'static>(target: T) -> Self {
        Arg::Object(Arc::new(target))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Field map of `:validation`, or of a `:data`-style object value.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Arg::Validation(data) => Some(data),
            Arg::Value(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Numeric view, accepting numeric strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self.as_value()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Non-negative integer view, accepting numeric strings.
    pub fn as_usize(&self) -> Option<usize> {
        match self.as_value()? {
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    /// True for values that cannot appear in a message.
    pub fn is_opaque(&self) -> bool {
        !matches!(self, Arg::Value(_))
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => write!(f, "{}", value),
            Arg::Validation(data) => write!(f, "Validation({} fields)", data.len()),
            Arg::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Value(a), Arg::Value(b)) => a == b,
            (Arg::Validation(a), Arg::Validation(b)) => a == b,
            (Arg::Object(a), Arg::Object(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Value(Value::String(value))
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Value(Value::Bool(value))
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Value(Value::from(value))
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Value(Value::from(value))
    }
}

impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        Arg::Value(Value::from(value))
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Value(Value::from(value))
    }
}

/// Text of a value as it appears in a message.
///
/// Lists and mappings are flattened to their leaves and joined with `", "`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => {
            let mut leaves = Vec::new();
            flatten(value, &mut leaves);
            leaves.join(", ")
        }
        scalar => render_scalar(scalar),
    }
}

fn flatten(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| flatten(v, out)),
        Value::Object(map) => map.values().for_each(|v| flatten(v, out)),
        scalar => out.push(render_scalar(scalar)),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => render_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Never;

    impl RuleTarget for Never {
        fn call(&self, _method: &str, _args: &[Arg]) -> Option<bool> {
            Some(false)
        }
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(render_value(&json!("abc")), "abc");
        assert_eq!(render_value(&json!(4)), "4");
        assert_eq!(render_value(&json!(true)), "1");
        assert_eq!(render_value(&json!(false)), "");
        assert_eq!(render_value(&json!(null)), "");
    }

    #[test]
    fn test_render_flattens_nested() {
        assert_eq!(render_value(&json!(["a", ["b", 3]])), "a, b, 3");
        assert_eq!(render_value(&json!({"x": "a", "y": {"z": "b"}})), "a, b");
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Arg::from("12").as_usize(), Some(12));
        assert_eq!(Arg::from(3.5).as_f64(), Some(3.5));
        assert_eq!(Arg::from(-1).as_usize(), None);
        assert_eq!(Arg::object(Never).as_f64(), None);
    }

    #[test]
    fn test_opaque_args() {
        let data = Arc::new(Map::new());
        assert!(Arg::Validation(data).is_opaque());
        assert!(Arg::object(Never).is_opaque());
        assert!(!Arg::from("x").is_opaque());
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a = Arg::object(Never);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Arg::object(Never));
    }
}
