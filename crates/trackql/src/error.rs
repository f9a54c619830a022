//! Error types for query parsing and descriptor validation.

use thiserror::Error;

use crate::grammar::{EntityType, ValueKind};

/// A specialized Result type for query parsing operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Formats the unknown-field message, optionally including a suggestion.
fn format_unknown_field(field: &str, entity: EntityType, suggestion: Option<&str>) -> String {
    let base = format!("unknown field '{}' for entity type {}", field, entity);
    match suggestion {
        Some(s) => format!("{}. Did you mean '{}'?", base, s),
        None => base,
    }
}

/// Errors that can occur during query parsing or descriptor validation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    /// The query string is empty or contains only whitespace.
    #[error("query is empty")]
    EmptyQuery,

    /// An alias-resolved field is not declared in the entity type's schema.
    #[error("{}", format_unknown_field(field, *entity, suggestion.as_deref()))]
    UnknownField {
        /// The canonical field name that failed the schema lookup.
        field: String,
        /// The entity type whose schema was consulted.
        entity: EntityType,
        /// Closest declared field name, if one is within edit distance.
        suggestion: Option<String>,
    },

    /// An operator symbol or keyword is not in the canonical operator table.
    #[error("unknown operator '{operator}' on field '{field}'")]
    UnknownOperator {
        /// The operator text exactly as written.
        operator: String,
        /// The field the operator was applied to.
        field: String,
    },

    /// The descriptor has no filters. Raised by structural validation only,
    /// never by `parse` itself.
    #[error("query has no filters")]
    EmptyFilterSet,

    /// A filter is missing its field. Raised by structural validation only.
    #[error("malformed filter at index {index}: missing field")]
    MalformedFilter {
        /// Position of the offending filter in the descriptor.
        index: usize,
    },
}

impl QueryError {
    /// Creates an unknown-field error, looking up the closest declared
    /// field name for a suggestion.
    pub(crate) fn unknown_field(field: impl Into<String>, entity: EntityType) -> Self {
        let field = field.into();
        let suggestion = crate::grammar::find_similar_field(&field, entity);
        QueryError::UnknownField {
            field,
            entity,
            suggestion,
        }
    }

    /// Creates an unknown-operator error.
    pub(crate) fn unknown_operator(operator: impl Into<String>, field: impl Into<String>) -> Self {
        QueryError::UnknownOperator {
            operator: operator.into(),
            field: field.into(),
        }
    }
}

/// Non-fatal diagnostic for a value whose shape does not match the declared
/// kind of its field. Parsing continues; the warning is reported alongside
/// the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueShapeWarning {
    /// Canonical field name the value was supplied for.
    pub field: String,
    /// The kind declared for the field in the entity schema.
    pub expected: ValueKind,
    /// Display rendering of the offending value.
    pub value: String,
}

impl std::fmt::Display for ValueShapeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value '{}' does not match the {} kind of field '{}'",
            self.value, self.expected, self.field
        )
    }
}
