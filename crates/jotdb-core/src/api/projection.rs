//! Projections: return only selected fields from records.
//!
//! Projection runs on flattened records, after filtering. Each record keeps
//! its natural field order regardless of the order the names were requested in.

use crate::catalog::parse_field_list;
use crate::types::Record;

/// Which fields a select returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Fields(Vec<String>),
}

impl Projection {
    /// Build a projection from field names. An empty list or the single
    /// name `"*"` means every field.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        match names.as_slice() {
            [] => Projection::All,
            [only] if only.trim() == "*" => Projection::All,
            _ => Projection::Fields(names),
        }
    }

    /// Parse the comma-separated form, e.g. `"house, words"` or `"*"`.
    pub fn parse(text: &str) -> Self {
        Self::fields(parse_field_list(text))
    }

    /// Apply to one record.
    pub fn apply(&self, record: Record) -> Record {
        match self {
            Projection::All => record,
            Projection::Fields(names) => record
                .into_iter()
                .filter(|(key, _)| names.iter().any(|n| n == key))
                .collect(),
        }
    }
}

impl From<&str> for Projection {
    fn from(text: &str) -> Self {
        Projection::parse(text)
    }
}

impl From<Vec<String>> for Projection {
    fn from(names: Vec<String>) -> Self {
        Projection::fields(names)
    }
}

impl From<&[&str]> for Projection {
    fn from(names: &[&str]) -> Self {
        Projection::fields(names.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_all_returns_full_record() {
        let r = record(json!({"id": 1, "house": "Stark"}));
        assert_eq!(Projection::All.apply(r.clone()), r);
        assert_eq!(Projection::parse("*"), Projection::All);
        assert_eq!(
            Projection::parse("*, house"),
            Projection::Fields(vec!["*".to_string(), "house".to_string()])
        );
        assert_eq!(Projection::parse(""), Projection::All);
    }

    #[test]
    fn test_single_field() {
        let r = record(json!({"id": 1, "house": "Stark", "words": "Winter Is Coming"}));
        let projected = Projection::from("house").apply(r);
        assert_eq!(Value::Object(projected), json!({"house": "Stark"}));
    }

    #[test]
    fn test_keeps_natural_order() {
        let r = record(json!({"id": 1, "house": "Stark", "words": "Winter Is Coming"}));
        let projected = Projection::parse("words, id").apply(r);
        let keys: Vec<&String> = projected.keys().collect();
        assert_eq!(keys, vec!["id", "words"]);
    }

    #[test]
    fn test_missing_field_silently_omitted() {
        let r = record(json!({"id": 1}));
        let projected = Projection::fields(["ghost"]).apply(r);
        assert!(projected.is_empty());
    }
}
