//! The structured result of parsing a query.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::grammar::{EntityType, Operator};
use crate::value::QueryValue;

/// Global logical combinator applied to the whole filter list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    /// All filters must match.
    #[default]
    And,
    /// Any filter may match.
    Or,
}

impl std::fmt::Display for Logic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Logic::And => write!(f, "AND"),
            Logic::Or => write!(f, "OR"),
        }
    }
}

/// Sort direction for an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending; the default when no direction is written.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Ordering clause of a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort on, as written in the query.
    pub field: String,
    /// Direction; ascending when unspecified.
    #[serde(default)]
    pub direction: SortDirection,
}

/// A single parsed filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Canonical (alias-resolved) field name.
    pub field: String,
    /// Canonical operator.
    pub operator: Operator,
    /// Normalized value.
    pub value: QueryValue,
    /// Operator text exactly as written, before normalization, for
    /// diagnostics.
    pub original_operator: String,
}

/// The structured result of parsing a query string.
///
/// Filters keep their insertion order, which is significant for the single
/// query-global `logic` value. A descriptor is created fresh per parse
/// call and owned exclusively by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Parsed filters, in query order.
    pub filters: Vec<QueryFilter>,
    /// Global combinator for `filters`.
    #[serde(default)]
    pub logic: Logic,
    /// Ordering clause, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    /// Result cap; strictly positive when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Grouping field, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// Entity type the query was parsed against.
    pub entity: EntityType,
}

impl QueryDescriptor {
    /// Creates an empty descriptor for the entity type.
    pub fn new(entity: EntityType) -> Self {
        Self {
            filters: Vec::new(),
            logic: Logic::And,
            order_by: None,
            limit: None,
            group_by: None,
            entity,
        }
    }

    /// Structural sanity check for callers; `parse` does not invoke it.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyFilterSet`] when there are no filters and
    /// [`QueryError::MalformedFilter`] when a filter has an empty field
    /// name.
    pub fn validate(&self) -> QueryResult<()> {
        if self.filters.is_empty() {
            return Err(QueryError::EmptyFilterSet);
        }
        if let Some(index) = self.filters.iter().position(|f| f.field.is_empty()) {
            return Err(QueryError::MalformedFilter { index });
        }
        Ok(())
    }

    /// Deterministic complexity heuristic for reporting: one point per
    /// filter, 0.5 for a limit, 1 for ordering, 2 for grouping, rounded to
    /// one decimal place.
    pub fn complexity(&self) -> f64 {
        let mut score = self.filters.len() as f64;
        if self.limit.is_some() {
            score += 0.5;
        }
        if self.order_by.is_some() {
            score += 1.0;
        }
        if self.group_by.is_some() {
            score += 2.0;
        }
        (score * 10.0).round() / 10.0
    }
}
