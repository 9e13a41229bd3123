//! Single-condition filters: parsing `field <op> value` expressions and
//! evaluating them against flattened records.
//!
//! Values compare numerically when both sides read as finite numbers and as
//! strings otherwise, so `"10" > "9"` holds while `"b" > "a"` is lexicographic.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::types::Record;

/// Comparison operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Operators in the order they are tried at each position: two-character
/// operators first so `<=` is never read as `<`.
const OPERATORS: [(&str, Operator); 6] = [
    ("<=", Operator::Le),
    (">=", Operator::Ge),
    ("!=", Operator::Ne),
    ("=", Operator::Eq),
    ("<", Operator::Lt),
    (">", Operator::Gt),
];

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    /// Whether `ordering` (left compared to right) satisfies this operator.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field <op> value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Parse an expression such as `"age >= 18"`.
    ///
    /// The expression is scanned left to right and split at the first
    /// operator found, trying longer operators first at each position.
    /// Returns `None` when no operator is present or the field is empty.
    pub fn parse(expr: &str) -> Option<Self> {
        for (pos, _) in expr.char_indices() {
            let rest = &expr[pos..];
            let Some((symbol, operator)) = OPERATORS.iter().find(|(s, _)| rest.starts_with(s))
            else {
                continue;
            };
            let field = expr[..pos].trim();
            if field.is_empty() {
                return None;
            }
            let value = expr[pos + symbol.len()..].trim();
            return Some(Self::new(field, *operator, value));
        }
        None
    }

    /// Evaluate against a record. A record without the field never matches.
    pub fn matches(&self, record: &Record) -> bool {
        match record.get(&self.field) {
            Some(value) => self.operator.accepts(compare_values(value, &self.value)),
            None => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.field,
            self.operator,
            scalar_text(&self.value)
        )
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Compare two scalar values.
///
/// Numeric when both sides are numbers or numeric strings, otherwise a
/// lexicographic comparison of their text forms.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => scalar_text(left).cmp(&scalar_text(right)),
    }
}

/// Total order used for sorting.
///
/// Numeric values order before text and compare by value among themselves;
/// text compares lexicographically. Two numeric values order exactly as
/// [`compare_values`] would order them.
pub fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => scalar_text(left).cmp(&scalar_text(right)),
    }
}

/// Numeric reading of a scalar, if it has one.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Text form of a scalar as used for string comparison and display.
pub fn scalar_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}
