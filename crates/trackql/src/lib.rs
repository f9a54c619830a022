//! Query language for filtering project-tracker entities.
//!
//! This crate parses textual filter queries for issues, user stories, and
//! tasks into a structured [`QueryDescriptor`]. The descriptor only
//! *describes* the query (filters, logic, ordering, limit, grouping) and
//! is not executed here; callers translate it into list-query parameters
//! for their tracker backend.
//!
//! # Supported Syntax
//!
//! ## Field queries
//! - `status:open` - equality (operator omitted)
//! - `ref:>100`, `points:<=8` - comparisons
//! - `subject:~login` - fuzzy match
//! - `tags:in:[frontend,backend]` - membership
//! - `points:between:[3,8]` - range membership
//! - `points:3..8` - numeric range
//! - `milestone:empty` / `milestone:notempty` - presence checks
//! - `sprint:"Sprint 3"` - quoted values; `sprint` is an alias for
//!   `milestone`
//!
//! ## Time values
//! - Keywords: `today`, `yesterday`, `this_week`, `last_week`,
//!   `this_month`, `last_month`, `1d`, `3d`, `7d`, `30d`, `90d`
//! - Relative offsets: `updated:<7d`, `created:>=30d`
//!
//! ## Combinators and clauses
//! - `AND`, `OR` - one logic value for the whole query, last written wins
//! - `NOT` and parentheses are tokenized but grouping is not evaluated
//! - `ORDER BY <field> [ASC|DESC]`, `LIMIT <n>`, `GROUP BY <field>`
//!
//! Unknown fields and operators are rejected; value/kind mismatches only
//! produce warnings, and unrecognized value shapes pass through as plain
//! strings so queries against newly added fields keep parsing.
//!
//! # Example
//!
//! ```
//! use trackql_rs::{EntityType, QueryParser, SortDirection};
//!
//! let descriptor = QueryParser::parse(
//!     "status:open AND priority:high ORDER BY priority DESC LIMIT 10",
//!     EntityType::Issue,
//! )
//! .unwrap();
//!
//! assert_eq!(descriptor.filters.len(), 2);
//! assert_eq!(descriptor.order_by.as_ref().unwrap().direction, SortDirection::Desc);
//! assert_eq!(descriptor.limit, Some(10));
//! ```

pub mod descriptor;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod value;

pub use descriptor::{Logic, OrderBy, QueryDescriptor, QueryFilter, SortDirection};
pub use error::{QueryError, QueryResult, ValueShapeWarning};
pub use grammar::{EntityType, Operator, ValueKind};
pub use parser::{ParsedQuery, QueryParser};
pub use value::{normalize, Bound, QueryValue};
