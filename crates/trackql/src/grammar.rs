//! Static grammar tables: entity field schemas, field aliases, the operator
//! table, enum value sets, and time keywords.
//!
//! Everything here is process-lifetime static data plus small lookup
//! functions; nothing is mutated after load.

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Entity type a query is parsed against. Determines which field schema
/// applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    /// A tracker issue.
    #[default]
    Issue,
    /// A user story.
    UserStory,
    /// A task, usually attached to a user story.
    Task,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Issue => write!(f, "ISSUE"),
            EntityType::UserStory => write!(f, "USER_STORY"),
            EntityType::Task => write!(f, "TASK"),
        }
    }
}

/// The kind of value a schema field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Free-form text.
    String,
    /// Numeric values, including numeric ranges.
    Number,
    /// Timestamps, relative offsets, and date-like text.
    Date,
    /// One of a fixed set of allowed values.
    Enum,
    /// Multi-valued fields such as tags.
    Array,
    /// `true`/`false` flags.
    Boolean,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Enum => "enum",
            ValueKind::Array => "array",
            ValueKind::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// Canonical filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// `=`, equality; the default when no operator is written.
    #[serde(rename = "=")]
    Equal,
    /// `!=`, inequality.
    #[serde(rename = "!=")]
    NotEqual,
    /// `>`, strictly greater.
    #[serde(rename = ">")]
    GreaterThan,
    /// `>=`, greater or equal.
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// `<`, strictly less.
    #[serde(rename = "<")]
    LessThan,
    /// `<=`, less or equal.
    #[serde(rename = "<=")]
    LessOrEqual,
    /// `~`, fuzzy text match.
    #[serde(rename = "~")]
    Fuzzy,
    /// `in`, membership in a list of values.
    #[serde(rename = "in")]
    In,
    /// `between`, inclusion in a two-element range.
    #[serde(rename = "between")]
    Between,
    /// `empty`, matching fields with no value.
    #[serde(rename = "empty")]
    Empty,
    /// `notempty`, matching fields with a value.
    #[serde(rename = "notempty")]
    NotEmpty,
    /// `contains`, substring or element containment.
    #[serde(rename = "contains")]
    Contains,
}

impl Operator {
    /// Resolves raw operator text, as written in the query, to the
    /// canonical operator. An empty string means the operator was omitted
    /// and defaults to equality; keywords match case-insensitively.
    /// Returns `None` for unrecognized text.
    pub fn resolve(raw: &str) -> Option<Operator> {
        match raw.to_ascii_lowercase().as_str() {
            "" | "=" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            ">" => Some(Operator::GreaterThan),
            ">=" => Some(Operator::GreaterOrEqual),
            "<" => Some(Operator::LessThan),
            "<=" => Some(Operator::LessOrEqual),
            "~" => Some(Operator::Fuzzy),
            "in" => Some(Operator::In),
            "between" => Some(Operator::Between),
            "empty" => Some(Operator::Empty),
            "notempty" => Some(Operator::NotEmpty),
            "contains" => Some(Operator::Contains),
            _ => None,
        }
    }

    /// The canonical symbol or keyword for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::Fuzzy => "~",
            Operator::In => "in",
            Operator::Between => "between",
            Operator::Empty => "empty",
            Operator::NotEmpty => "notempty",
            Operator::Contains => "contains",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==================== Field Schemas ====================

const ISSUE_FIELDS: &[(&str, ValueKind)] = &[
    ("ref", ValueKind::Number),
    ("subject", ValueKind::String),
    ("description", ValueKind::String),
    ("status", ValueKind::Enum),
    ("type", ValueKind::Enum),
    ("severity", ValueKind::Enum),
    ("priority", ValueKind::Enum),
    ("assignee", ValueKind::String),
    ("owner", ValueKind::String),
    ("milestone", ValueKind::String),
    ("tags", ValueKind::Array),
    ("watchers", ValueKind::Array),
    ("blocked", ValueKind::Boolean),
    ("closed", ValueKind::Boolean),
    ("attachments", ValueKind::Boolean),
    ("created", ValueKind::Date),
    ("updated", ValueKind::Date),
    ("due_date", ValueKind::Date),
];

const USER_STORY_FIELDS: &[(&str, ValueKind)] = &[
    ("ref", ValueKind::Number),
    ("subject", ValueKind::String),
    ("description", ValueKind::String),
    ("status", ValueKind::Enum),
    ("points", ValueKind::Number),
    ("epic", ValueKind::String),
    ("assignee", ValueKind::String),
    ("owner", ValueKind::String),
    ("milestone", ValueKind::String),
    ("tags", ValueKind::Array),
    ("watchers", ValueKind::Array),
    ("blocked", ValueKind::Boolean),
    ("closed", ValueKind::Boolean),
    ("attachments", ValueKind::Boolean),
    ("created", ValueKind::Date),
    ("updated", ValueKind::Date),
    ("due_date", ValueKind::Date),
];

const TASK_FIELDS: &[(&str, ValueKind)] = &[
    ("ref", ValueKind::Number),
    ("subject", ValueKind::String),
    ("description", ValueKind::String),
    ("status", ValueKind::Enum),
    ("user_story", ValueKind::Number),
    ("assignee", ValueKind::String),
    ("owner", ValueKind::String),
    ("milestone", ValueKind::String),
    ("tags", ValueKind::Array),
    ("watchers", ValueKind::Array),
    ("blocked", ValueKind::Boolean),
    ("closed", ValueKind::Boolean),
    ("attachments", ValueKind::Boolean),
    ("created", ValueKind::Date),
    ("updated", ValueKind::Date),
    ("due_date", ValueKind::Date),
];

/// Returns the field schema for an entity type: each declared field name
/// with its value kind.
pub fn fields(entity: EntityType) -> &'static [(&'static str, ValueKind)] {
    match entity {
        EntityType::Issue => ISSUE_FIELDS,
        EntityType::UserStory => USER_STORY_FIELDS,
        EntityType::Task => TASK_FIELDS,
    }
}

/// Looks up the declared kind of a canonical field name.
pub fn field_kind(entity: EntityType, field: &str) -> Option<ValueKind> {
    fields(entity)
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, kind)| *kind)
}

// ==================== Aliases ====================

/// User-facing field synonyms, resolved once per field-query token before
/// schema lookup.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("sprint", "milestone"),
    ("assigned", "assignee"),
    ("created_by", "owner"),
    ("is_blocked", "blocked"),
    ("is_closed", "closed"),
    ("has_attachments", "attachments"),
];

/// Resolves a field alias to its canonical name; non-alias names pass
/// through unchanged.
pub fn resolve_alias(field: &str) -> &str {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == field)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(field)
}

// ==================== Enum Value Sets ====================

/// Allowed `status` values.
pub const STATUS_VALUES: &[&str] = &[
    "new",
    "open",
    "in_progress",
    "ready_for_test",
    "needs_info",
    "closed",
    "rejected",
    "postponed",
    "archived",
];

/// Allowed `priority` values.
pub const PRIORITY_VALUES: &[&str] = &["low", "normal", "high", "urgent"];

/// Allowed issue `type` values.
pub const TYPE_VALUES: &[&str] = &["bug", "feature", "enhancement", "question"];

/// Allowed issue `severity` values.
pub const SEVERITY_VALUES: &[&str] = &["wishlist", "minor", "normal", "important", "critical"];

/// Returns the allowed value set for an enum field, if it has one.
pub fn enum_values(field: &str) -> Option<&'static [&'static str]> {
    match field {
        "status" => Some(STATUS_VALUES),
        "priority" => Some(PRIORITY_VALUES),
        "type" => Some(TYPE_VALUES),
        "severity" => Some(SEVERITY_VALUES),
        _ => None,
    }
}

// ==================== Time Keywords ====================

/// Value keywords that normalize to absolute timestamps.
pub const TIME_KEYWORDS: &[&str] = &[
    "today",
    "yesterday",
    "this_week",
    "last_week",
    "this_month",
    "last_month",
    "1d",
    "3d",
    "7d",
    "30d",
    "90d",
];

/// Returns true if the text is a recognized time keyword.
pub fn is_time_keyword(text: &str) -> bool {
    TIME_KEYWORDS.contains(&text)
}

// ==================== Suggestions ====================

/// Finds the declared field name closest to `query` for the entity type,
/// within the suggestion threshold. Exact matches are never suggested.
pub fn find_similar_field(query: &str, entity: EntityType) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = fields(entity)
        .iter()
        .map(|(name, _)| (name.to_string(), levenshtein(&query_lower, name)))
        .min_by_key(|(_, d)| *d)?;

    if best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_display() {
        assert_eq!(EntityType::Issue.to_string(), "ISSUE");
        assert_eq!(EntityType::UserStory.to_string(), "USER_STORY");
        assert_eq!(EntityType::Task.to_string(), "TASK");
    }

    #[test]
    fn test_entity_type_default_is_issue() {
        assert_eq!(EntityType::default(), EntityType::Issue);
    }

    #[test]
    fn test_entity_type_serde_tags() {
        assert_eq!(
            serde_json::to_string(&EntityType::UserStory).unwrap(),
            "\"USER_STORY\""
        );
        let entity: EntityType = serde_json::from_str("\"ISSUE\"").unwrap();
        assert_eq!(entity, EntityType::Issue);
    }

    #[test]
    fn test_operator_resolve_symbols() {
        assert_eq!(Operator::resolve(""), Some(Operator::Equal));
        assert_eq!(Operator::resolve("="), Some(Operator::Equal));
        assert_eq!(Operator::resolve("!="), Some(Operator::NotEqual));
        assert_eq!(Operator::resolve(">"), Some(Operator::GreaterThan));
        assert_eq!(Operator::resolve(">="), Some(Operator::GreaterOrEqual));
        assert_eq!(Operator::resolve("<"), Some(Operator::LessThan));
        assert_eq!(Operator::resolve("<="), Some(Operator::LessOrEqual));
        assert_eq!(Operator::resolve("~"), Some(Operator::Fuzzy));
    }

    #[test]
    fn test_operator_resolve_keywords_case_insensitive() {
        assert_eq!(Operator::resolve("in"), Some(Operator::In));
        assert_eq!(Operator::resolve("IN"), Some(Operator::In));
        assert_eq!(Operator::resolve("Between"), Some(Operator::Between));
        assert_eq!(Operator::resolve("empty"), Some(Operator::Empty));
        assert_eq!(Operator::resolve("notempty"), Some(Operator::NotEmpty));
        assert_eq!(Operator::resolve("contains"), Some(Operator::Contains));
    }

    #[test]
    fn test_operator_resolve_unknown() {
        assert_eq!(Operator::resolve("bogusop"), None);
        assert_eq!(Operator::resolve("=="), None);
        assert_eq!(Operator::resolve("!"), None);
    }

    #[test]
    fn test_operator_serde_uses_symbols() {
        assert_eq!(serde_json::to_string(&Operator::Equal).unwrap(), "\"=\"");
        assert_eq!(
            serde_json::to_string(&Operator::GreaterOrEqual).unwrap(),
            "\">=\""
        );
        assert_eq!(serde_json::to_string(&Operator::In).unwrap(), "\"in\"");
        let op: Operator = serde_json::from_str("\"!=\"").unwrap();
        assert_eq!(op, Operator::NotEqual);
    }

    #[test]
    fn test_field_kind_per_entity() {
        assert_eq!(
            field_kind(EntityType::Issue, "severity"),
            Some(ValueKind::Enum)
        );
        assert_eq!(
            field_kind(EntityType::UserStory, "points"),
            Some(ValueKind::Number)
        );
        assert_eq!(
            field_kind(EntityType::Task, "user_story"),
            Some(ValueKind::Number)
        );
        // points is a user-story concept, not an issue field
        assert_eq!(field_kind(EntityType::Issue, "points"), None);
        assert_eq!(field_kind(EntityType::Issue, "bogusfield"), None);
    }

    #[test]
    fn test_alias_resolution() {
        assert_eq!(resolve_alias("sprint"), "milestone");
        assert_eq!(resolve_alias("assigned"), "assignee");
        assert_eq!(resolve_alias("created_by"), "owner");
        assert_eq!(resolve_alias("is_blocked"), "blocked");
        assert_eq!(resolve_alias("is_closed"), "closed");
        assert_eq!(resolve_alias("has_attachments"), "attachments");
        assert_eq!(resolve_alias("status"), "status");
    }

    #[test]
    fn test_aliases_resolve_to_declared_fields() {
        for (alias, canonical) in FIELD_ALIASES {
            assert!(
                field_kind(EntityType::Issue, canonical).is_some(),
                "alias '{}' points at undeclared field '{}'",
                alias,
                canonical
            );
        }
    }

    #[test]
    fn test_enum_values_lookup() {
        assert_eq!(enum_values("status"), Some(STATUS_VALUES));
        assert_eq!(enum_values("priority"), Some(PRIORITY_VALUES));
        assert_eq!(enum_values("type"), Some(TYPE_VALUES));
        assert_eq!(enum_values("severity"), Some(SEVERITY_VALUES));
        assert_eq!(enum_values("subject"), None);
    }

    #[test]
    fn test_is_time_keyword() {
        assert!(is_time_keyword("today"));
        assert!(is_time_keyword("last_month"));
        assert!(is_time_keyword("7d"));
        assert!(!is_time_keyword("2d"));
        assert!(!is_time_keyword("tomorrow"));
    }

    #[test]
    fn test_find_similar_field_within_threshold() {
        assert_eq!(
            find_similar_field("statsu", EntityType::Issue),
            Some("status".to_string())
        );
        assert_eq!(
            find_similar_field("asignee", EntityType::Issue),
            Some("assignee".to_string())
        );
    }

    #[test]
    fn test_find_similar_field_rejects_exact_and_distant() {
        // exact matches are not suggestions
        assert_eq!(find_similar_field("status", EntityType::Issue), None);
        assert_eq!(find_similar_field("bogusfield", EntityType::Issue), None);
    }
}
