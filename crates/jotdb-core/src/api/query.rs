//! The select pipeline: flatten → filter → project → order → limit.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Error, QueryError};
use crate::types::{Document, Record};

use super::builders::Query;
use super::filter::sort_order;

/// Sort direction of one order key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// `desc` in any case is descending; every other word is ascending.
    pub fn parse(word: &str) -> Self {
        if word.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}

/// One entry of an order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub direction: Direction,
}

impl OrderKey {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, Direction::Desc)
    }

    /// Parse `"house asc, words desc"`. A missing direction means ascending.
    pub fn parse_list(text: &str) -> Vec<Self> {
        text.split(',')
            .filter_map(|item| {
                let mut words = item.split_whitespace();
                let field = words.next()?;
                let direction = words.next().map(Direction::parse).unwrap_or_default();
                Some(Self::new(field, direction))
            })
            .collect()
    }
}

/// Row window applied after ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LimitSpec {
    pub count: Option<usize>,
    pub offset: Option<usize>,
    pub reverse: bool,
}

impl LimitSpec {
    pub fn new(count: Option<usize>, offset: Option<usize>, reverse: bool) -> Self {
        Self {
            count,
            offset,
            reverse,
        }
    }
}

/// Run a select over a loaded document.
///
/// The returned records are fresh copies and never alias the document.
pub fn execute_select(doc: &Document, query: &Query) -> Result<Vec<Record>, Error> {
    let mut records = doc.records();

    if let Some(predicate) = query.predicate() {
        records.retain(|record| predicate.matches(record));
        debug!(table = %doc.name, %predicate, matched = records.len(), "applied filter");
    }

    let projection = query.projection();
    let mut records: Vec<Record> = records
        .into_iter()
        .map(|record| projection.apply(record))
        .collect();

    sort_records(&mut records, query.order())?;
    Ok(apply_limit(records, query.limit_spec()))
}

/// Stable multi-key sort.
///
/// Fails with `FieldsNotFound` when an order field appears in none of the
/// records. Records lacking a key order before records that have it, and
/// numeric values order before text.
pub fn sort_records(records: &mut [Record], order: &[OrderKey]) -> Result<(), Error> {
    if order.is_empty() || records.is_empty() {
        return Ok(());
    }

    let mut missing: Vec<String> = Vec::new();
    for key in order {
        let present = records.iter().any(|r| r.contains_key(&key.field));
        if !present && !missing.contains(&key.field) {
            missing.push(key.field.clone());
        }
    }
    if !missing.is_empty() {
        return Err(QueryError::FieldsNotFound(missing).into());
    }

    records.sort_by(|a, b| {
        for key in order {
            let ordering = match (a.get(&key.field), b.get(&key.field)) {
                (Some(x), Some(y)) => sort_order(x, y),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            let ordering = match key.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

/// Reverse first when requested, then take `[offset, offset + count)`.
/// Without a count the (possibly reversed) sequence is returned whole.
pub fn apply_limit(mut records: Vec<Record>, limit: LimitSpec) -> Vec<Record> {
    if limit.reverse {
        records.reverse();
    }
    let Some(count) = limit.count else {
        return records;
    };
    let offset = limit.offset.unwrap_or(0);
    records.into_iter().skip(offset).take(count).collect()
}
