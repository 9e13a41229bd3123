use serde_json::Value;
use tracing::debug;

use super::filter::{Operator, Predicate};
use super::projection::Projection;
use super::query::{LimitSpec, OrderKey};

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Configuration of a select: filter, projection, order, and limit.
///
/// A `Query` is a plain value. Terminal operations borrow it and never
/// change it, so nothing set for one call leaks into the next.
///
/// ```
/// use jotdb_core::api::{OrderKey, Query};
///
/// let query = Query::new()
///     .filter("age >= 18")
///     .project("name, age")
///     .order_by(OrderKey::desc("age"))
///     .limit(10);
/// assert!(query.predicate().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    predicate: Option<Predicate>,
    projection: Projection,
    order: Vec<OrderKey>,
    limit: LimitSpec,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by a `field <op> value` expression, replacing any earlier one.
    ///
    /// An expression that does not parse leaves the query unfiltered.
    pub fn filter(mut self, expr: &str) -> Self {
        self.predicate = Predicate::parse(expr);
        if self.predicate.is_none() {
            debug!(expr, "condition did not parse, selecting without a filter");
        }
        self
    }

    /// Filter by an already-built predicate, replacing any earlier one.
    pub fn predicate_is(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Shorthand for `filter("<field> = <value>")` with a typed value.
    pub fn field_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.predicate_is(Predicate::new(field, Operator::Eq, value))
    }

    /// Restrict the returned fields.
    pub fn project(mut self, projection: impl Into<Projection>) -> Self {
        self.projection = projection.into();
        self
    }

    /// Append an order key. Earlier keys take priority.
    pub fn order_by(mut self, key: OrderKey) -> Self {
        self.order.push(key);
        self
    }

    /// Append order keys from the text form `"house asc, words desc"`.
    pub fn order_by_text(mut self, text: &str) -> Self {
        self.order.extend(OrderKey::parse_list(text));
        self
    }

    /// Return at most `count` rows.
    pub fn limit(mut self, count: usize) -> Self {
        self.limit.count = Some(count);
        self
    }

    /// Skip `offset` rows before counting. Only applies together with a limit.
    pub fn offset(mut self, offset: usize) -> Self {
        self.limit.offset = Some(offset);
        self
    }

    /// Reverse the ordered rows before the limit window is taken.
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.limit.reverse = reverse;
        self
    }

    /// Replace all limit settings at once.
    pub fn limit_spec_is(mut self, limit: LimitSpec) -> Self {
        self.limit = limit;
        self
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn order(&self) -> &[OrderKey] {
        &self.order
    }

    pub fn limit_spec(&self) -> LimitSpec {
        self.limit
    }
}
