//! Table schema management: the ordered field list, the primary-key column,
//! and the row-alignment rules that keep positional rows consistent.

pub mod ops;

/// Split a comma-separated field list (`"house, words"`) into trimmed,
/// non-empty names.
pub fn parse_field_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Anything accepted as a list of field names.
pub trait IntoFieldList {
    fn into_field_list(self) -> Vec<String>;
}

impl IntoFieldList for &str {
    fn into_field_list(self) -> Vec<String> {
        parse_field_list(self)
    }
}

impl IntoFieldList for String {
    fn into_field_list(self) -> Vec<String> {
        parse_field_list(&self)
    }
}

impl IntoFieldList for Vec<String> {
    fn into_field_list(self) -> Vec<String> {
        self
    }
}

impl IntoFieldList for &[&str] {
    fn into_field_list(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoFieldList for [&str; N] {
    fn into_field_list(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}
