//! Lexer (tokenizer) for query strings.

use crate::value::{self, normalize, QueryValue};

/// A token in a query string.
///
/// Tokens keep their scan order; the parser walks them once, left to
/// right. Rule priority per position: field-query, then keyword, then
/// parenthesis, then bare run.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryToken {
    /// A `field[:operator[:]]value` clause. `operator` holds the raw text
    /// exactly as written (an empty string when it was omitted), and the
    /// value has already been normalized.
    FieldQuery {
        /// Field name, lowercased at scan time.
        field: String,
        /// Raw operator text as written.
        operator: String,
        /// Normalized value.
        value: QueryValue,
    },
    /// The `AND` keyword.
    And,
    /// The `OR` keyword.
    Or,
    /// The `NOT` keyword.
    Not,
    /// The `ORDER BY` keyword pair.
    OrderBy,
    /// The `LIMIT` keyword.
    Limit,
    /// The `GROUP BY` keyword pair.
    GroupBy,
    /// Opening parenthesis `(`.
    OpenParen,
    /// Closing parenthesis `)`.
    CloseParen,
    /// Any other whitespace-delimited run; clause operands arrive this way.
    Bare(String),
}

/// Lexer for query strings.
///
/// Holds the immutable input and a byte cursor owned by this instance.
/// Create one lexer per tokenize call; instances are not meant to be
/// shared.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consumes characters while `keep` holds, returning the matched slice.
    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek_char().is_some_and(&keep) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    /// Returns the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<QueryToken> {
        self.skip_whitespace();
        let c = self.peek_char()?;

        if c == '(' {
            self.bump();
            return Some(QueryToken::OpenParen);
        }
        if c == ')' {
            self.bump();
            return Some(QueryToken::CloseParen);
        }

        if c.is_alphabetic() || c == '_' {
            let start = self.pos;
            let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
            if self.peek_char() == Some(':') {
                self.bump();
                return Some(self.field_query(word));
            }
            if let Some(token) = self.keyword(word) {
                return Some(token);
            }
            // not a keyword: rescan from the word start as a bare run
            self.pos = start;
        }

        let run = self.take_while(|c| !c.is_whitespace());
        Some(QueryToken::Bare(run.to_string()))
    }

    /// Matches logic and clause keywords as case-insensitive whole words,
    /// including the two-word `ORDER BY` / `GROUP BY` forms with flexible
    /// internal whitespace.
    fn keyword(&mut self, word: &str) -> Option<QueryToken> {
        if word.eq_ignore_ascii_case("and") {
            return Some(QueryToken::And);
        }
        if word.eq_ignore_ascii_case("or") {
            return Some(QueryToken::Or);
        }
        if word.eq_ignore_ascii_case("not") {
            return Some(QueryToken::Not);
        }
        if word.eq_ignore_ascii_case("limit") {
            return Some(QueryToken::Limit);
        }
        if word.eq_ignore_ascii_case("order") && self.take_by() {
            return Some(QueryToken::OrderBy);
        }
        if word.eq_ignore_ascii_case("group") && self.take_by() {
            return Some(QueryToken::GroupBy);
        }
        None
    }

    /// Consumes a following `BY` word, restoring the cursor when absent.
    fn take_by(&mut self) -> bool {
        let saved = self.pos;
        self.skip_whitespace();
        let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
        if word.eq_ignore_ascii_case("by") {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    /// Scans the remainder of a field-query clause; the identifier and its
    /// trailing `:` have already been consumed.
    fn field_query(&mut self, field: &str) -> QueryToken {
        let field = field.to_lowercase();
        let symbols_start = self.pos;
        let symbols = self.take_while(|c| matches!(c, '>' | '<' | '=' | '!' | '~'));
        let letters_start = self.pos;
        let letters = self.take_while(|c| c.is_ascii_alphabetic());

        // explicit `field:op:value` form
        if self.peek_char() == Some(':') {
            self.bump();
            let operator = if letters.is_empty() { symbols } else { letters };
            let raw = self.value_literal();
            let value = if is_presence_keyword(letters) {
                // value text is irrelevant for empty/notempty
                QueryValue::Flag(true)
            } else {
                normalize(raw)
            };
            return QueryToken::FieldQuery {
                field,
                operator: operator.to_string(),
                value,
            };
        }

        // bare `in`/`between` keyword directly followed by a list literal
        if (letters.eq_ignore_ascii_case("in") || letters.eq_ignore_ascii_case("between"))
            && matches!(self.peek_char(), Some('[') | Some('('))
        {
            let raw = self.value_literal();
            return QueryToken::FieldQuery {
                field,
                operator: letters.to_string(),
                value: normalize(raw),
            };
        }

        // bare `empty`/`notempty` standing alone
        if is_presence_keyword(letters) && self.at_value_end() {
            return QueryToken::FieldQuery {
                field,
                operator: letters.to_string(),
                value: QueryValue::Flag(true),
            };
        }

        // otherwise the letters run belongs to the value; the operator is
        // the symbol run, or `=` when none was written
        self.pos = letters_start;
        let raw = self.value_literal();

        // a comparison-prefixed shorthand like `<7d` is a relative-time
        // value, not a comparison on a bare `7d`
        let candidate = &self.input[symbols_start..self.pos];
        if !symbols.is_empty() && value::is_relative_shorthand(candidate) {
            return QueryToken::FieldQuery {
                field,
                operator: String::new(),
                value: normalize(candidate),
            };
        }

        QueryToken::FieldQuery {
            field,
            operator: symbols.to_string(),
            value: normalize(raw),
        }
    }

    fn at_value_end(&self) -> bool {
        match self.peek_char() {
            None => true,
            Some(c) => c.is_whitespace() || matches!(c, '(' | ')' | ':'),
        }
    }

    /// Scans one value literal: a bracketed list, a parenthesized legacy
    /// list, a double-quoted string, or a bare run. Returns the raw text
    /// including its delimiters.
    fn value_literal(&mut self) -> &'a str {
        match self.peek_char() {
            Some('[') => self.delimited(']'),
            Some('(') => self.delimited(')'),
            Some('"') => self.delimited('"'),
            _ => self.take_while(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | ':')),
        }
    }

    /// Consumes from the opening delimiter through `close`, or to end of
    /// input when unterminated.
    fn delimited(&mut self, close: char) -> &'a str {
        let start = self.pos;
        self.bump();
        while let Some(c) = self.bump() {
            if c == close {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    /// Collects all tokens. Empty or whitespace-only input yields an empty
    /// vector; rejecting it is the parser's job.
    pub fn tokenize(mut self) -> Vec<QueryToken> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

fn is_presence_keyword(text: &str) -> bool {
    text.eq_ignore_ascii_case("empty") || text.eq_ignore_ascii_case("notempty")
}
