//! Locates where a row-limit clause goes in a SELECT statement.
//!
//! The engine puts `TOP n START AT m` between `SELECT [DISTINCT]` and the
//! select list. The scanner below finds that position by walking tokens at
//! the head of the statement, so keywords inside string literals, comments
//! or later subqueries are never matched.

/// Where a limit clause can be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Byte offset just after `SELECT` or `SELECT DISTINCT`.
    At(usize),
    /// The statement already carries a `TOP` clause.
    AlreadyLimited,
    /// The statement does not start with a SELECT (e.g. a `WITH` query).
    NoSelect,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            let rest = self.rest();
            if rest.starts_with("--") || rest.starts_with("//") {
                self.pos += rest.find('\n').map_or(rest.len(), |nl| nl + 1);
            } else if rest.starts_with("/*") {
                self.pos += rest[2..].find("*/").map_or(rest.len(), |end| end + 4);
            } else {
                return;
            }
        }
    }

    /// Skip trivia and any opening parentheses wrapping the statement.
    fn skip_leading_parens(&mut self) {
        loop {
            self.skip_trivia();
            if self.rest().starts_with('(') {
                self.pos += 1;
            } else {
                return;
            }
        }
    }

    /// The identifier-like word at the current position, without consuming it.
    fn peek_word(&self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '#' || c == '@'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// Consume the next word when it equals `keyword` (case-insensitive).
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let word = self.peek_word();
        if word.eq_ignore_ascii_case(keyword) {
            self.pos += word.len();
            true
        } else {
            false
        }
    }
}

/// Find the position after the leading `SELECT [DISTINCT]`.
pub fn find_insertion_point(sql: &str) -> InsertionPoint {
    let mut scanner = Scanner::new(sql);
    scanner.skip_leading_parens();

    if !scanner.eat_keyword("SELECT") {
        return InsertionPoint::NoSelect;
    }
    let mut insert_at = scanner.pos;

    scanner.skip_trivia();
    if scanner.eat_keyword("DISTINCT") {
        insert_at = scanner.pos;
        scanner.skip_trivia();
    }

    if scanner.peek_word().eq_ignore_ascii_case("TOP") {
        return InsertionPoint::AlreadyLimited;
    }

    InsertionPoint::At(insert_at)
}

/// Insert `clause` after the leading `SELECT [DISTINCT]`.
///
/// Statements that already have `TOP`, or that do not start with SELECT,
/// are returned unchanged. Keyword case and surrounding text are preserved.
pub fn inject_limit_clause(sql: &str, clause: &str) -> String {
    match find_insertion_point(sql) {
        InsertionPoint::At(pos) if !clause.is_empty() => {
            let mut out = String::with_capacity(sql.len() + clause.len() + 1);
            out.push_str(&sql[..pos]);
            out.push(' ');
            out.push_str(clause);
            out.push_str(&sql[pos..]);
            out
        }
        _ => sql.to_string(),
    }
}
