use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators supported by record filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Case-insensitive substring match on string fields.
    Contains,
}

/// A single where-clause entry matched against a record's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn ne(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    /// Evaluate this filter against one record's fields. A missing field
    /// fails every comparison except `Ne`.
    pub fn matches(&self, fields: &Value) -> bool {
        let actual = fields.get(&self.field);
        match self.op {
            FilterOp::Eq => actual == Some(&self.value),
            FilterOp::Ne => actual != Some(&self.value),
            FilterOp::Lt => compares(actual, &self.value, |ord| ord == Ordering::Less),
            FilterOp::Lte => compares(actual, &self.value, |ord| ord != Ordering::Greater),
            FilterOp::Gt => compares(actual, &self.value, |ord| ord == Ordering::Greater),
            FilterOp::Gte => compares(actual, &self.value, |ord| ord != Ordering::Less),
            FilterOp::Contains => match (actual.and_then(Value::as_str), self.value.as_str()) {
                (Some(haystack), Some(needle)) => haystack
                    .to_ascii_lowercase()
                    .contains(&needle.to_ascii_lowercase()),
                _ => false,
            },
        }
    }
}

fn compares(actual: Option<&Value>, expected: &Value, accept: fn(Ordering) -> bool) -> bool {
    actual
        .and_then(|value| compare_values(value, expected))
        .is_some_and(accept)
}

/// Order numbers numerically and strings lexicographically; mixed or
/// non-scalar values do not compare.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        _ => None,
    }
}

/// Sort specification for a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Offset/limit paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub offset: usize,
    pub limit: usize,
}

impl Paging {
    pub const fn window(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    pub const fn all() -> Self {
        Self {
            offset: 0,
            limit: usize::MAX,
        }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::all()
    }
}

/// Query parameters shaped by the domain services: projected fields,
/// where-clauses, ordering, and paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub fields: Vec<String>,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub paging: Paging,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|field| field.to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_asc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending: false,
        });
        self
    }

    pub fn order_desc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending: true,
        });
        self
    }

    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.paging = Paging::window(offset, limit);
        self
    }
}
