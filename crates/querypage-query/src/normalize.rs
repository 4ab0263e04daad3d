//! Value normalization applied before values are bound.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Largest float that still converts to `i64` without loss of range.
const MAX_INTEGRAL_FLOAT: f64 = 9_223_372_036_854_775_807.0;

/// Convert integral, non-negative floats to integers, recursing into arrays.
///
/// JSON decoders hand back `18.0` for a client that sent `18.0`; binding
/// that as a float against an integer column fails on strict dialects.
pub fn coerce_integral(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(coerce_integral).collect()),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < MAX_INTEGRAL_FLOAT => {
                Value::from(f as i64)
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

/// Render a decoded value as pattern text.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Escape the escape character itself and `%` so client text matches literally.
pub fn escape_like(text: &str, escape: Option<char>) -> String {
    let Some(esc) = escape else {
        return text.to_string();
    };
    let mut out = String::with_capacity(text.len() + 4);
    for ch in text.chars() {
        if ch == esc || ch == '%' {
            out.push(esc);
        }
        out.push(ch);
    }
    out
}

/// Fold every whitespace run into a `%` wildcard.
///
/// `"john doe"` then matches `"John the Doe"`: all words, in order, with
/// anything between them.
pub fn fold_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, "%").into_owned()
}

/// Where wildcards are added around a pattern value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wildcards {
    /// `%value%`
    Both,
    /// `value%`
    Trailing,
    /// `%value`
    Leading,
    /// `value`
    None,
}

impl Wildcards {
    /// Wrap `text` with the wildcards of this mode.
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Both => format!("%{text}%"),
            Self::Trailing => format!("{text}%"),
            Self::Leading => format!("%{text}"),
            Self::None => text.to_string(),
        }
    }
}

/// Substitute `value` into a printf-style `%s` template.
pub fn apply_template(template: &str, value: &str) -> String {
    template.replacen("%s", value, 1)
}
