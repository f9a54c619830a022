//! Typed filter values and the normalizer that coerces raw value text.
//!
//! Normalization is total: text that matches none of the recognized shapes
//! passes through as the original string instead of failing. That leniency
//! keeps queries against newly added schema fields parseable.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grammar::Operator;

const MS_PER_DAY: i64 = 86_400_000;

/// One end of a range value: numeric where the text parses as a finite
/// number, the original string otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    /// A numeric bound.
    Number(f64),
    /// A non-numeric bound, kept as written.
    Str(String),
}

impl Bound {
    fn parse(text: &str) -> Bound {
        let text = text.trim();
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Bound::Number(n),
            _ => Bound::Str(text.to_string()),
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Number(n) => write!(f, "{}", n),
            Bound::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A normalized filter value.
///
/// The shape is fully determined by which lexical branch matched during
/// normalization, and normalization never fails: unparsable numeric or
/// date text degrades to [`QueryValue::Str`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// Marker value carried by `empty`/`notempty` filters.
    Flag(bool),
    /// A finite numeric value.
    Number(f64),
    /// An inclusive range written `low..high`.
    Range {
        /// Low and high bounds, numeric where parsable.
        range: (Bound, Bound),
    },
    /// A timestamp offset from the parse instant, with the comparison that
    /// was written (`<`, `<=`, `>`, `>=`).
    RelativeTime {
        /// The comparison the offset was written with.
        comparison: Operator,
        /// The instant the offset resolves to.
        date: DateTime<Utc>,
    },
    /// An absolute timestamp computed from a time keyword.
    Timestamp(DateTime<Utc>),
    /// An ordered list of strings, from `[...]` or legacy `(...)` literals.
    List(Vec<String>),
    /// A plain string; also the pass-through for unrecognized shapes.
    Str(String),
}

impl std::fmt::Display for QueryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryValue::Flag(b) => write!(f, "{}", b),
            QueryValue::Number(n) => write!(f, "{}", n),
            QueryValue::Range { range: (low, high) } => write!(f, "{}..{}", low, high),
            QueryValue::RelativeTime { comparison, date } => {
                write!(f, "{}{}", comparison, date.to_rfc3339())
            }
            QueryValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            QueryValue::List(items) => write!(f, "[{}]", items.join(",")),
            QueryValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Normalizes raw value text into a typed [`QueryValue`], evaluating time
/// keywords and relative offsets against the current instant.
pub fn normalize(raw: &str) -> QueryValue {
    normalize_at(raw, Utc::now())
}

/// Normalization core with an explicit evaluation instant.
pub(crate) fn normalize_at(raw: &str, now: DateTime<Utc>) -> QueryValue {
    if let Some(inner) = strip_quotes(raw) {
        return QueryValue::Str(inner.to_string());
    }

    if let Some(inner) = enclosed(raw, '[', ']') {
        let items = inner
            .split(',')
            .map(|item| {
                let item = item.trim();
                strip_quotes(item).unwrap_or(item).to_string()
            })
            .collect();
        return QueryValue::List(items);
    }

    // legacy list form, kept for backward compatibility: no quote stripping
    if let Some(inner) = enclosed(raw, '(', ')') {
        let items = inner.split(',').map(|item| item.trim().to_string()).collect();
        return QueryValue::List(items);
    }

    if let Some((low, high)) = raw.split_once("..") {
        return QueryValue::Range {
            range: (Bound::parse(low), Bound::parse(high)),
        };
    }

    if let Ok(n) = raw.parse::<f64>() {
        if n.is_finite() {
            return QueryValue::Number(n);
        }
    }

    if let Some(ts) = time_keyword_at(raw, now) {
        return QueryValue::Timestamp(ts);
    }

    if let Some((comparison, offset_ms)) = parse_relative(raw) {
        return QueryValue::RelativeTime {
            comparison,
            date: now - Duration::milliseconds(offset_ms),
        };
    }

    QueryValue::Str(raw.to_string())
}

/// Returns true if the text is a comparison-prefixed relative-time
/// shorthand such as `<7d` or `>=30d`.
pub(crate) fn is_relative_shorthand(text: &str) -> bool {
    parse_relative(text).is_some()
}

/// Strips one matching pair of enclosing double or single quotes. Escape
/// sequences are not interpreted.
fn strip_quotes(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first == last && (first == '"' || first == '\'') {
        Some(&text[1..text.len() - 1])
    } else {
        None
    }
}

/// Returns the interior of `text` when it is enclosed by the delimiter pair.
fn enclosed(text: &str, open: char, close: char) -> Option<&str> {
    text.strip_prefix(open)?.strip_suffix(close)
}

/// Monday-aligned start of the week containing `date`; Sunday counts as
/// day 7 of the prior week.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First calendar day of the month containing `date`.
fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Evaluates a time keyword against `now`, or returns `None` when the text
/// is not one.
fn time_keyword_at(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    match raw {
        "today" => Some(day_start(today)),
        "yesterday" => Some(day_start(today - Duration::days(1))),
        "this_week" => Some(day_start(week_start(today))),
        "last_week" => Some(day_start(week_start(today) - Duration::days(7))),
        "this_month" => Some(day_start(month_start(today))),
        "last_month" => Some(day_start(month_start(month_start(today) - Duration::days(1)))),
        "1d" => Some(now - Duration::days(1)),
        "3d" => Some(now - Duration::days(3)),
        "7d" => Some(now - Duration::days(7)),
        "30d" => Some(now - Duration::days(30)),
        "90d" => Some(now - Duration::days(90)),
        _ => None,
    }
}

/// Parses a `<N`, `<=N`, `>N`, `>=N` shorthand followed by a unit letter,
/// returning the comparison and the offset in milliseconds.
fn parse_relative(raw: &str) -> Option<(Operator, i64)> {
    let (comparison, rest) = if let Some(r) = raw.strip_prefix("<=") {
        (Operator::LessOrEqual, r)
    } else if let Some(r) = raw.strip_prefix(">=") {
        (Operator::GreaterOrEqual, r)
    } else if let Some(r) = raw.strip_prefix('<') {
        (Operator::LessThan, r)
    } else if let Some(r) = raw.strip_prefix('>') {
        (Operator::GreaterThan, r)
    } else {
        return None;
    };

    let unit = rest.chars().next_back()?;
    let amount: i64 = rest[..rest.len() - unit.len_utf8()].parse().ok()?;
    // fixed multipliers: months are 30 days, years 365, no calendar math
    let unit_ms = match unit {
        'd' => MS_PER_DAY,
        'w' => 7 * MS_PER_DAY,
        'm' => 30 * MS_PER_DAY,
        'y' => 365 * MS_PER_DAY,
        _ => return None,
    };
    Some((comparison, amount * unit_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// 2026-08-05 is a Wednesday.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 15, 30, 0).unwrap()
    }

    fn utc_midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_double_quotes_stripped() {
        assert_eq!(
            normalize_at("\"Sprint 3\"", fixed_now()),
            QueryValue::Str("Sprint 3".to_string())
        );
    }

    #[test]
    fn test_single_quotes_stripped() {
        assert_eq!(
            normalize_at("'urgent'", fixed_now()),
            QueryValue::Str("urgent".to_string())
        );
    }

    #[test]
    fn test_mismatched_quotes_pass_through() {
        assert_eq!(
            normalize_at("\"open'", fixed_now()),
            QueryValue::Str("\"open'".to_string())
        );
    }

    #[test]
    fn test_quoted_number_stays_a_string() {
        assert_eq!(
            normalize_at("\"42\"", fixed_now()),
            QueryValue::Str("42".to_string())
        );
    }

    #[test]
    fn test_bracket_list_splits_trims_and_strips_quotes() {
        assert_eq!(
            normalize_at("[frontend, \"back end\", 'db']", fixed_now()),
            QueryValue::List(vec![
                "frontend".to_string(),
                "back end".to_string(),
                "db".to_string(),
            ])
        );
    }

    #[test]
    fn test_legacy_paren_list_keeps_quotes() {
        assert_eq!(
            normalize_at("(a, \"b\", c)", fixed_now()),
            QueryValue::List(vec![
                "a".to_string(),
                "\"b\"".to_string(),
                "c".to_string(),
            ])
        );
    }

    #[test]
    fn test_numeric_range() {
        assert_eq!(
            normalize_at("3..8", fixed_now()),
            QueryValue::Range {
                range: (Bound::Number(3.0), Bound::Number(8.0)),
            }
        );
    }

    #[test]
    fn test_mixed_range_keeps_string_bounds() {
        assert_eq!(
            normalize_at("a..5", fixed_now()),
            QueryValue::Range {
                range: (Bound::Str("a".to_string()), Bound::Number(5.0)),
            }
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(normalize_at("42", fixed_now()), QueryValue::Number(42.0));
        assert_eq!(normalize_at("-1.5", fixed_now()), QueryValue::Number(-1.5));
    }

    #[test]
    fn test_non_finite_numbers_pass_through() {
        assert_eq!(
            normalize_at("inf", fixed_now()),
            QueryValue::Str("inf".to_string())
        );
        assert_eq!(
            normalize_at("NaN", fixed_now()),
            QueryValue::Str("NaN".to_string())
        );
    }

    #[test]
    fn test_today_and_yesterday() {
        assert_eq!(
            normalize_at("today", fixed_now()),
            QueryValue::Timestamp(utc_midnight(2026, 8, 5))
        );
        assert_eq!(
            normalize_at("yesterday", fixed_now()),
            QueryValue::Timestamp(utc_midnight(2026, 8, 4))
        );
    }

    #[test]
    fn test_week_keywords_are_monday_aligned() {
        assert_eq!(
            normalize_at("this_week", fixed_now()),
            QueryValue::Timestamp(utc_midnight(2026, 8, 3))
        );
        assert_eq!(
            normalize_at("last_week", fixed_now()),
            QueryValue::Timestamp(utc_midnight(2026, 7, 27))
        );
    }

    #[test]
    fn test_sunday_belongs_to_the_prior_week() {
        // 2026-08-09 is a Sunday; its week still starts Monday 08-03
        let sunday = Utc.with_ymd_and_hms(2026, 8, 9, 10, 0, 0).unwrap();
        assert_eq!(
            normalize_at("this_week", sunday),
            QueryValue::Timestamp(utc_midnight(2026, 8, 3))
        );
    }

    #[test]
    fn test_month_keywords() {
        assert_eq!(
            normalize_at("this_month", fixed_now()),
            QueryValue::Timestamp(utc_midnight(2026, 8, 1))
        );
        assert_eq!(
            normalize_at("last_month", fixed_now()),
            QueryValue::Timestamp(utc_midnight(2026, 7, 1))
        );
    }

    #[test]
    fn test_last_month_across_year_boundary() {
        let january = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            normalize_at("last_month", january),
            QueryValue::Timestamp(utc_midnight(2025, 12, 1))
        );
    }

    #[test]
    fn test_fixed_day_offsets() {
        let now = fixed_now();
        assert_eq!(
            normalize_at("7d", now),
            QueryValue::Timestamp(now - Duration::days(7))
        );
        assert_eq!(
            normalize_at("90d", now),
            QueryValue::Timestamp(now - Duration::days(90))
        );
        // 2d is not in the keyword table
        assert_eq!(normalize_at("2d", now), QueryValue::Str("2d".to_string()));
    }

    #[test]
    fn test_relative_shorthand_days() {
        let now = fixed_now();
        assert_eq!(
            normalize_at("<7d", now),
            QueryValue::RelativeTime {
                comparison: Operator::LessThan,
                date: now - Duration::days(7),
            }
        );
    }

    #[test]
    fn test_relative_shorthand_units_use_fixed_multipliers() {
        let now = fixed_now();
        assert_eq!(
            normalize_at(">=2w", now),
            QueryValue::RelativeTime {
                comparison: Operator::GreaterOrEqual,
                date: now - Duration::days(14),
            }
        );
        assert_eq!(
            normalize_at("<=1m", now),
            QueryValue::RelativeTime {
                comparison: Operator::LessOrEqual,
                date: now - Duration::days(30),
            }
        );
        assert_eq!(
            normalize_at(">1y", now),
            QueryValue::RelativeTime {
                comparison: Operator::GreaterThan,
                date: now - Duration::days(365),
            }
        );
    }

    #[test]
    fn test_relative_shorthand_rejects_unknown_units() {
        assert_eq!(
            normalize_at("<7x", fixed_now()),
            QueryValue::Str("<7x".to_string())
        );
        assert_eq!(
            normalize_at("<d", fixed_now()),
            QueryValue::Str("<d".to_string())
        );
    }

    #[test]
    fn test_is_relative_shorthand() {
        assert!(is_relative_shorthand("<7d"));
        assert!(is_relative_shorthand(">=30d"));
        assert!(!is_relative_shorthand("7d"));
        assert!(!is_relative_shorthand(">high"));
    }

    #[test]
    fn test_every_time_keyword_normalizes_to_a_timestamp() {
        for keyword in crate::grammar::TIME_KEYWORDS {
            assert!(
                matches!(
                    normalize_at(keyword, fixed_now()),
                    QueryValue::Timestamp(_)
                ),
                "keyword '{}' did not normalize to a timestamp",
                keyword
            );
        }
    }

    #[test]
    fn test_unrecognized_shapes_pass_through() {
        assert_eq!(
            normalize_at("in_progress", fixed_now()),
            QueryValue::Str("in_progress".to_string())
        );
        assert_eq!(
            normalize_at("2026-08-05", fixed_now()),
            QueryValue::Str("2026-08-05".to_string())
        );
    }

    #[test]
    fn test_serde_shapes() {
        let range = QueryValue::Range {
            range: (Bound::Number(3.0), Bound::Number(8.0)),
        };
        assert_eq!(
            serde_json::to_string(&range).unwrap(),
            "{\"range\":[3.0,8.0]}"
        );

        let list = QueryValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(serde_json::to_string(&list).unwrap(), "[\"a\",\"b\"]");

        let number = QueryValue::Number(10.0);
        assert_eq!(serde_json::to_string(&number).unwrap(), "10.0");
    }
}
