//! Single-pass parser assembling a [`QueryDescriptor`] from tokens.

use crate::descriptor::{Logic, OrderBy, QueryDescriptor, QueryFilter, SortDirection};
use crate::error::{QueryError, QueryResult, ValueShapeWarning};
use crate::grammar::{self, EntityType, Operator, ValueKind};
use crate::lexer::{Lexer, QueryToken};
use crate::value::{Bound, QueryValue};

/// Result of a parse, including soft-validation warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    /// The assembled descriptor.
    pub descriptor: QueryDescriptor,
    /// Value-shape warnings collected along the way; never fatal.
    pub warnings: Vec<ValueShapeWarning>,
}

/// Parser for tracker query strings.
///
/// # Grammar
///
/// ```text
/// query       ::= clause*
/// clause      ::= field-query | logic | order-by | limit | group-by | "(" | ")"
/// field-query ::= ident ":" [op-symbols] [op-keyword] [":"] [value]
/// logic       ::= "AND" | "OR" | "NOT"
/// order-by    ::= "ORDER BY" operand ["ASC" | "DESC"]
/// limit       ::= "LIMIT" operand
/// group-by    ::= "GROUP BY" operand
/// ```
///
/// The walk is strictly left to right with one cursor and no backtracking.
/// Parentheses are recognized but grouping is not evaluated, and `NOT` is
/// recognized but inert: `AND`/`OR` set the single query-global logic
/// value, last occurrence winning.
///
/// Each call builds its own parser over an immutable token list, so
/// concurrent parses cannot interfere with each other.
///
/// # Example
///
/// ```
/// use trackql_rs::{EntityType, Logic, QueryParser};
///
/// let descriptor = QueryParser::parse("type:bug OR type:feature", EntityType::Issue).unwrap();
/// assert_eq!(descriptor.filters.len(), 2);
/// assert_eq!(descriptor.logic, Logic::Or);
/// ```
pub struct QueryParser {
    tokens: Vec<QueryToken>,
    position: usize,
    warnings: Vec<ValueShapeWarning>,
}

impl QueryParser {
    /// Parses a query string against the entity type's field schema.
    ///
    /// Soft value-shape warnings are logged at warn level and discarded;
    /// use [`QueryParser::parse_with_warnings`] to inspect them.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyQuery`] when the trimmed input is empty,
    /// [`QueryError::UnknownField`] when an alias-resolved field is not in
    /// the entity schema, and [`QueryError::UnknownOperator`] for operator
    /// text outside the canonical table. Fatal errors abort the whole
    /// parse; no partial descriptor is returned.
    pub fn parse(input: &str, entity: EntityType) -> QueryResult<QueryDescriptor> {
        let parsed = Self::parse_with_warnings(input, entity)?;
        for warning in &parsed.warnings {
            log::warn!("{}", warning);
        }
        Ok(parsed.descriptor)
    }

    /// Parses a query string, returning the descriptor together with any
    /// soft value-shape warnings.
    ///
    /// # Errors
    ///
    /// Same as [`QueryParser::parse`]; warnings are never errors.
    pub fn parse_with_warnings(input: &str, entity: EntityType) -> QueryResult<ParsedQuery> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let tokens = Lexer::new(trimmed).tokenize();
        let mut parser = Self {
            tokens,
            position: 0,
            warnings: Vec::new(),
        };
        let descriptor = parser.run(entity)?;

        Ok(ParsedQuery {
            descriptor,
            warnings: parser.warnings,
        })
    }

    fn run(&mut self, entity: EntityType) -> QueryResult<QueryDescriptor> {
        let mut descriptor = QueryDescriptor::new(entity);

        while let Some(token) = self.advance() {
            match token {
                QueryToken::FieldQuery {
                    field,
                    operator,
                    value,
                } => {
                    let filter = self.build_filter(field, operator, value, entity)?;
                    descriptor.filters.push(filter);
                }
                QueryToken::And => descriptor.logic = Logic::And,
                QueryToken::Or => descriptor.logic = Logic::Or,
                // NOT is scanned but does not alter the flat descriptor
                QueryToken::Not => {}
                QueryToken::OrderBy => {
                    if let Some(order_by) = self.order_by_clause() {
                        descriptor.order_by = Some(order_by);
                    }
                }
                QueryToken::Limit => {
                    if let Some(limit) = self.limit_clause() {
                        descriptor.limit = Some(limit);
                    }
                }
                QueryToken::GroupBy => {
                    if let Some(group_by) = self.operand() {
                        descriptor.group_by = Some(group_by);
                    }
                }
                // grouping is lexed but not evaluated
                QueryToken::OpenParen | QueryToken::CloseParen => {}
                QueryToken::Bare(_) => {}
            }
        }

        log::debug!(
            "parsed {} filter(s) against {} schema",
            descriptor.filters.len(),
            entity
        );
        Ok(descriptor)
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&QueryToken> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<QueryToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes the next token as a clause operand: a bare token's text or
    /// a field-query token's field name.
    fn operand(&mut self) -> Option<String> {
        match self.advance()? {
            QueryToken::Bare(text) => Some(text),
            QueryToken::FieldQuery { field, .. } => Some(field),
            _ => None,
        }
    }

    fn order_by_clause(&mut self) -> Option<OrderBy> {
        let field = self.operand()?;
        let direction = match self.peek() {
            Some(QueryToken::Bare(text)) if text.eq_ignore_ascii_case("asc") => {
                self.position += 1;
                SortDirection::Asc
            }
            Some(QueryToken::Bare(text)) if text.eq_ignore_ascii_case("desc") => {
                self.position += 1;
                SortDirection::Desc
            }
            _ => SortDirection::Asc,
        };
        Some(OrderBy { field, direction })
    }

    fn limit_clause(&mut self) -> Option<u32> {
        self.operand()?.parse::<u32>().ok().filter(|n| *n > 0)
    }

    fn build_filter(
        &mut self,
        field: String,
        raw_operator: String,
        value: QueryValue,
        entity: EntityType,
    ) -> QueryResult<QueryFilter> {
        let canonical = grammar::resolve_alias(&field).to_string();
        let Some(kind) = grammar::field_kind(entity, &canonical) else {
            return Err(QueryError::unknown_field(canonical, entity));
        };
        let Some(operator) = Operator::resolve(&raw_operator) else {
            return Err(QueryError::unknown_operator(raw_operator, canonical));
        };

        // presence operators ignore the value entirely
        if !matches!(operator, Operator::Empty | Operator::NotEmpty)
            && !value_matches_kind(&value, kind, &canonical)
        {
            self.warnings.push(ValueShapeWarning {
                field: canonical.clone(),
                expected: kind,
                value: value.to_string(),
            });
        }

        Ok(QueryFilter {
            field: canonical,
            operator,
            value,
            original_operator: raw_operator,
        })
    }
}

/// Soft value-shape check. A mismatch produces a warning only; parsing
/// never aborts on a value.
fn value_matches_kind(value: &QueryValue, kind: ValueKind, field: &str) -> bool {
    match kind {
        ValueKind::String => matches!(value, QueryValue::Str(_)),
        ValueKind::Number => match value {
            QueryValue::Number(_) | QueryValue::List(_) => true,
            QueryValue::Range { range } => {
                matches!(range, (Bound::Number(_), Bound::Number(_)))
            }
            _ => false,
        },
        // unparsable dates deliberately degrade to strings, so strings pass
        ValueKind::Date => matches!(
            value,
            QueryValue::Timestamp(_)
                | QueryValue::RelativeTime { .. }
                | QueryValue::Range { .. }
                | QueryValue::Str(_)
                | QueryValue::Number(_)
        ),
        ValueKind::Enum => match (value, grammar::enum_values(field)) {
            (QueryValue::Str(text), Some(allowed)) => allowed.contains(&text.as_str()),
            (QueryValue::List(items), Some(allowed)) => {
                items.iter().all(|item| allowed.contains(&item.as_str()))
            }
            (QueryValue::Str(_) | QueryValue::List(_), None) => true,
            _ => false,
        },
        ValueKind::Array => matches!(value, QueryValue::Str(_) | QueryValue::List(_)),
        ValueKind::Boolean => match value {
            QueryValue::Flag(_) => true,
            QueryValue::Str(text) => text == "true" || text == "false",
            _ => false,
        },
    }
}
