// Built-in rule predicates

use crate::{Arg, RuleRegistry};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::net::IpAddr;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").unwrap());

static COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^#?[0-9a-f]{3}(?:[0-9a-f]{3})?$").unwrap());

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Largest distance from a whole number of steps still counted as on the grid.
const STEP_TOLERANCE: f64 = 1e-9;

/// Default phone number lengths, in digits.
pub const PHONE_LENGTHS: [usize; 3] = [7, 10, 11];

/// The default helper class of rule predicates.
///
/// Each predicate is registered under `Valid` with a camelCase name, so
/// `rule("email", "email")` and `rule("email", ("Valid", "email"))` are the
/// same rule.
pub struct Valid;

impl Valid {
    /// Class name the predicates are registered under.
    pub const CLASS: &'static str = "Valid";

    /// `null`, `false`, `""`, `[]` and `{}` are empty. `0` and `"0"` are not.
    pub fn not_empty(value: &Value) -> bool {
        match value {
            Value::Null | Value::Bool(false) => false,
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Match against a regular expression. Invalid patterns never match.
    pub fn regex(value: &str, pattern: &str) -> bool {
        match Regex::new(pattern) {
            Ok(re) => re.is_match(value),
            Err(e) => {
                warden_log::warn!(target: "warden::valid", "invalid rule pattern {}: {}", pattern, e);
                false
            }
        }
    }

    /// At least `length` characters.
    pub fn min_length(value: &str, length: usize) -> bool {
        value.chars().count() >= length
    }

    /// At most `length` characters.
    pub fn max_length(value: &str, length: usize) -> bool {
        value.chars().count() <= length
    }

    /// Exactly one of `lengths` characters.
    pub fn exact_length(value: &str, lengths: &[usize]) -> bool {
        lengths.contains(&value.chars().count())
    }

    /// Strict equality, type included.
    pub fn equals(value: &Value, required: &Value) -> bool {
        value == required
    }

    pub fn email(value: &str) -> bool {
        EMAIL_REGEX.is_match(value)
    }

    pub fn url(value: &str) -> bool {
        URL_REGEX.is_match(value)
    }

    /// IPv4 or IPv6 address, optionally refusing private and reserved ranges.
    pub fn ip(value: &str, allow_private: bool) -> bool {
        let Ok(addr) = value.parse::<IpAddr>() else {
            return false;
        };

        if allow_private {
            return true;
        }

        match addr {
            IpAddr::V4(v4) => {
                !(v4.is_private()
                    || v4.is_loopback()
                    || v4.is_link_local()
                    || v4.is_unspecified()
                    || v4.is_broadcast()
                    || v4.is_documentation())
            }
            IpAddr::V6(v6) => {
                !(v6.is_loopback()
                    || v6.is_unspecified()
                    || v6.is_unique_local()
                    || v6.is_unicast_link_local())
            }
        }
    }

    /// Phone number whose digit count is one of `lengths`.
    ///
    /// Everything but digits is ignored, so `(555) 123-4567` has 10 digits.
    pub fn phone(value: &str, lengths: &[usize]) -> bool {
        let digits = value.chars().filter(char::is_ascii_digit).count();
        lengths.contains(&digits)
    }

    /// Date or date-time in a common format.
    pub fn date(value: &str) -> bool {
        let value = value.trim();
        DateTime::parse_from_rfc3339(value).is_ok()
            || DateTime::parse_from_rfc2822(value).is_ok()
            || DATETIME_FORMATS
                .iter()
                .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
            || DATE_FORMATS
                .iter()
                .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
    }

    /// Letters only; ASCII unless `utf8`.
    pub fn alpha(value: &str, utf8: bool) -> bool {
        !value.is_empty()
            && value.chars().all(|c| {
                if utf8 {
                    c.is_alphabetic()
                } else {
                    c.is_ascii_alphabetic()
                }
            })
    }

    /// Letters and digits only; ASCII unless `utf8`.
    pub fn alpha_numeric(value: &str, utf8: bool) -> bool {
        !value.is_empty()
            && value.chars().all(|c| {
                if utf8 {
                    c.is_alphanumeric()
                } else {
                    c.is_ascii_alphanumeric()
                }
            })
    }

    /// Letters, digits, dashes and underscores; ASCII unless `utf8`.
    pub fn alpha_dash(value: &str, utf8: bool) -> bool {
        !value.is_empty()
            && value.chars().all(|c| {
                c == '-'
                    || c == '_'
                    || if utf8 {
                        c.is_alphanumeric()
                    } else {
                        c.is_ascii_alphanumeric()
                    }
            })
    }

    /// Digits only, no sign or decimal point.
    pub fn digit(value: &str, utf8: bool) -> bool {
        !value.is_empty()
            && value.chars().all(|c| {
                if utf8 {
                    c.is_numeric()
                } else {
                    c.is_ascii_digit()
                }
            })
    }

    /// Optionally negative decimal number.
    pub fn numeric(value: &str) -> bool {
        NUMERIC_REGEX.is_match(value)
    }

    /// `min <= number <= max`, on a `step` grid starting at `min` if given.
    pub fn range(number: f64, min: f64, max: f64, step: Option<f64>) -> bool {
        if number < min || number > max {
            return false;
        }
        match step {
            Some(step) if step > 0.0 => {
                let steps = (number - min) / step;
                (steps - steps.round()).abs() < STEP_TOLERANCE
            }
            _ => true,
        }
    }

    /// Decimal with exactly `places` fraction digits and, if given, exactly
    /// `digits` integer digits.
    pub fn decimal(value: &str, places: usize, digits: Option<usize>) -> bool {
        let integer = match digits {
            Some(n) => format!("{{{}}}", n),
            None => "+".to_string(),
        };
        let pattern = format!(r"^[+-]?[0-9]{}\.[0-9]{{{}}}$", integer, places);
        Self::regex(value, &pattern)
    }

    /// Hex color, `#` optional: `#fff`, `a0b1c2`.
    pub fn color(value: &str) -> bool {
        COLOR_REGEX.is_match(value)
    }

    /// 13 to 19 digits (spaces and dashes ignored) passing the Luhn check.
    pub fn credit_card(value: &str) -> bool {
        let number: String = value.chars().filter(|c| *c != ' ' && *c != '-').collect();
        (13..=19).contains(&number.len()) && Self::luhn(&number)
    }

    /// Luhn (mod 10) checksum.
    pub fn luhn(value: &str) -> bool {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        let sum: u32 = value
            .chars()
            .rev()
            .filter_map(|c| c.to_digit(10))
            .enumerate()
            .map(|(i, d)| {
                if i % 2 == 1 {
                    let doubled = d * 2;
                    if doubled > 9 { doubled - 9 } else { doubled }
                } else {
                    d
                }
            })
            .sum();

        sum % 10 == 0
    }

    /// `data[field] == data[other]`, missing fields reading as `null`.
    pub fn matches(data: &Map<String, Value>, field: &str, other: &str) -> bool {
        data.get(field).unwrap_or(&Value::Null) == data.get(other).unwrap_or(&Value::Null)
    }

    /// Register every predicate under [`Valid::CLASS`].
    ///
    /// Missing or mistyped arguments make a predicate fail.
    pub fn register(registry: &mut RuleRegistry) {
        let class = Self::CLASS;

        registry.register_method(class, "notEmpty", |args: &[Arg]| match args.first() {
            Some(Arg::Value(value)) => Self::not_empty(value),
            Some(_) => true,
            None => false,
        });
        registry.register_method(class, "regex", |args: &[Arg]| {
            matches!((text(args, 0), args.get(1).and_then(Arg::as_str)), (Some(v), Some(p)) if Self::regex(&v, p))
        });
        registry.register_method(class, "minLength", |args: &[Arg]| {
            matches!((text(args, 0), usize_at(args, 1)), (Some(v), Some(n)) if Self::min_length(&v, n))
        });
        registry.register_method(class, "maxLength", |args: &[Arg]| {
            matches!((text(args, 0), usize_at(args, 1)), (Some(v), Some(n)) if Self::max_length(&v, n))
        });
        registry.register_method(class, "exactLength", |args: &[Arg]| {
            let lengths = lengths_at(args, 1);
            matches!(text(args, 0), Some(v) if !lengths.is_empty() && Self::exact_length(&v, &lengths))
        });
        registry.register_method(class, "equals", |args: &[Arg]| {
            matches!((args.first().and_then(Arg::as_value), args.get(1).and_then(Arg::as_value)), (Some(v), Some(r)) if Self::equals(v, r))
        });
        registry.register_method(class, "email", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::email(&v))
        });
        registry.register_method(class, "url", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::url(&v))
        });
        registry.register_method(class, "ip", |args: &[Arg]| {
            let allow_private = args.get(1).and_then(Arg::as_bool).unwrap_or(true);
            text(args, 0).is_some_and(|v| Self::ip(&v, allow_private))
        });
        registry.register_method(class, "phone", |args: &[Arg]| {
            let mut lengths = lengths_at(args, 1);
            if lengths.is_empty() {
                lengths = PHONE_LENGTHS.to_vec();
            }
            text(args, 0).is_some_and(|v| Self::phone(&v, &lengths))
        });
        registry.register_method(class, "date", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::date(&v))
        });
        registry.register_method(class, "alpha", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::alpha(&v, flag_at(args, 1)))
        });
        registry.register_method(class, "alphaNumeric", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::alpha_numeric(&v, flag_at(args, 1)))
        });
        registry.register_method(class, "alphaDash", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::alpha_dash(&v, flag_at(args, 1)))
        });
        registry.register_method(class, "digit", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::digit(&v, flag_at(args, 1)))
        });
        registry.register_method(class, "numeric", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::numeric(&v))
        });
        registry.register_method(class, "range", |args: &[Arg]| {
            let step = args.get(3).and_then(Arg::as_f64);
            match (f64_at(args, 0), f64_at(args, 1), f64_at(args, 2)) {
                (Some(n), Some(min), Some(max)) => Self::range(n, min, max, step),
                _ => false,
            }
        });
        registry.register_method(class, "decimal", |args: &[Arg]| {
            let places = usize_at(args, 1).unwrap_or(2);
            let digits = usize_at(args, 2);
            text(args, 0).is_some_and(|v| Self::decimal(&v, places, digits))
        });
        registry.register_method(class, "color", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::color(&v))
        });
        registry.register_method(class, "creditCard", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::credit_card(&v))
        });
        registry.register_method(class, "luhn", |args: &[Arg]| {
            text(args, 0).is_some_and(|v| Self::luhn(&v))
        });
        registry.register_method(class, "matches", |args: &[Arg]| {
            match (
                args.first().and_then(Arg::as_map),
                args.get(1).and_then(Arg::as_str),
                args.get(2).and_then(Arg::as_str),
            ) {
                (Some(data), Some(field), Some(other)) => Self::matches(data, field, other),
                _ => false,
            }
        });
    }
}

/// String form of a scalar argument; numbers count as their decimal text.
fn text(args: &[Arg], index: usize) -> Option<String> {
    match args.get(index)?.as_value()? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn usize_at(args: &[Arg], index: usize) -> Option<usize> {
    args.get(index).and_then(Arg::as_usize)
}

fn f64_at(args: &[Arg], index: usize) -> Option<f64> {
    args.get(index).and_then(Arg::as_f64)
}

fn flag_at(args: &[Arg], index: usize) -> bool {
    args.get(index).and_then(Arg::as_bool).unwrap_or(false)
}

/// A single length or a list of lengths.
fn lengths_at(args: &[Arg], index: usize) -> Vec<usize> {
    match args.get(index) {
        Some(Arg::Value(Value::Array(items))) => items
            .iter()
            .filter_map(|item| Arg::Value(item.clone()).as_usize())
            .collect(),
        Some(arg) => arg.as_usize().into_iter().collect(),
        None => Vec::new(),
    }
}
