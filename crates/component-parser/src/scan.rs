//! Depth-aware scanning over raw JavaScript-like text.
//!
//! Right-hand sides, function bodies and template expressions are never
//! parsed into a full AST. These helpers walk them character by character,
//! skipping string literals, template literal text and comments, so callers
//! can find delimiters and `$name` references at the right nesting level.

/// Iterates over the code characters of `text`, skipping strings and comments.
///
/// Quote characters and comment delimiters are not yielded. Inside a
/// template literal only the `${ ... }` parts are yielded, without the
/// `${` and `}` that delimit them.
pub struct CodeScanner<'a> {
    text: &'a str,
    pos: usize,
    brace_depth: u32,
    template_stack: Vec<u32>,
    unterminated: Option<char>,
}

impl<'a> CodeScanner<'a> {
    /// Creates a scanner starting at byte offset `start`.
    pub fn new(text: &'a str, start: usize) -> Self {
        Self {
            text,
            pos: start.min(text.len()),
            brace_depth: 0,
            template_stack: Vec::new(),
            unterminated: None,
        }
    }

    /// Returns the quote character of a literal left open, if any.
    pub fn unterminated(&self) -> Option<char> {
        self.unterminated
    }

    /// Returns the byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips a quoted string body. Stops before a newline, which ends it unterminated.
    fn skip_string(&mut self, quote: char) {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    if self.peek() != Some('\n') {
                        self.bump();
                    }
                }
                '\n' => {
                    self.unterminated = Some(quote);
                    return;
                }
                _ => {
                    self.bump();
                    if c == quote {
                        return;
                    }
                }
            }
        }
        self.unterminated = Some(quote);
    }

    /// Skips template literal text up to the closing backtick or a `${`.
    fn skip_template_text(&mut self) {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '`' => return,
                '$' if self.peek() == Some('{') => {
                    self.bump();
                    self.template_stack.push(self.brace_depth);
                    return;
                }
                _ => {}
            }
        }
        self.unterminated = Some('`');
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                return;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) {
        let mut prev_star = false;
        while let Some(c) = self.bump() {
            if prev_star && c == '/' {
                return;
            }
            prev_star = c == '*';
        }
    }
}

impl Iterator for CodeScanner<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let i = self.pos;
            let c = self.bump()?;
            match c {
                '"' | '\'' => self.skip_string(c),
                '`' => self.skip_template_text(),
                '/' if self.peek() == Some('/') => self.skip_line_comment(),
                '/' if self.peek() == Some('*') => {
                    self.bump();
                    self.skip_block_comment();
                }
                '{' => {
                    self.brace_depth += 1;
                    return Some((i, c));
                }
                '}' if self.template_stack.last() == Some(&self.brace_depth) => {
                    self.template_stack.pop();
                    self.skip_template_text();
                }
                '}' => {
                    self.brace_depth = self.brace_depth.saturating_sub(1);
                    return Some((i, c));
                }
                _ => return Some((i, c)),
            }
        }
    }
}

fn is_open(c: char) -> bool {
    matches!(c, '{' | '(' | '[')
}

fn is_close(c: char) -> bool {
    matches!(c, '}' | ')' | ']')
}

/// Returns true for characters that may continue a JavaScript identifier.
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Returns true if `s` is a plain identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns the name of a text that is exactly one `$identifier` reference.
pub fn dollar_ident(s: &str) -> Option<&str> {
    s.trim().strip_prefix('$').filter(|name| is_identifier(name))
}

/// Finds the matching `close` delimiter for an opener just before `start`.
///
/// Returns `None` if the text ends first or a different closer appears at
/// depth zero.
pub fn find_closing(text: &str, start: usize, close: char) -> Option<usize> {
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(text, start) {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            if depth == 0 {
                return (c == close).then_some(i);
            }
            depth -= 1;
        }
    }
    None
}

/// The extent of one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementEnd {
    /// Byte offset of the terminator (or the text length).
    pub end: usize,
    /// The innermost delimiter left open when the text ran out.
    pub open: Option<char>,
    /// The quote of a string literal left unterminated.
    pub unterminated: Option<char>,
}

/// Finds where the statement starting at `start` ends: a newline or `;` at depth zero.
///
/// When a delimiter is left open the statement is cut at the end of its
/// first line and `open` reports the delimiter, so one bad statement does not
/// swallow the rest of the file.
pub fn statement_end(text: &str, start: usize) -> StatementEnd {
    let mut stack: Vec<char> = Vec::new();
    let mut scanner = CodeScanner::new(text, start);
    let mut end = None;

    while let Some((i, c)) = scanner.next() {
        if is_open(c) {
            stack.push(c);
        } else if is_close(c) {
            stack.pop();
        } else if (c == '\n' || c == ';') && stack.is_empty() {
            end = Some(i);
            break;
        }
    }

    let unterminated = scanner.unterminated();
    match end {
        Some(end) => StatementEnd {
            end,
            open: None,
            unterminated,
        },
        None if !stack.is_empty() => {
            let line_end = text[start.min(text.len())..]
                .find('\n')
                .map(|i| start + i)
                .unwrap_or(text.len());
            StatementEnd {
                end: line_end,
                open: stack.last().copied(),
                unterminated,
            }
        }
        None => StatementEnd {
            end: text.len(),
            open: None,
            unterminated,
        },
    }
}

/// Splits `text` on `sep` at depth zero. Pieces are not trimmed.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0u32;
    let mut last = 0;
    for (i, c) in CodeScanner::new(text, 0) {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        } else if c == sep && depth == 0 {
            pieces.push(&text[last..i]);
            last = i + c.len_utf8();
        }
    }
    pieces.push(&text[last..]);
    pieces
}

/// Finds the first `target` character at depth zero.
pub fn find_top_level_char(text: &str, target: char) -> Option<usize> {
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(text, 0) {
        if depth == 0 && c == target {
            return Some(i);
        }
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        }
    }
    None
}

/// Finds the first depth-zero `=` that is an assignment rather than part of
/// `==`, `=>`, `<=`, `>=` or `!=`.
pub fn find_assignment(text: &str) -> Option<usize> {
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(text, 0) {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        } else if c == '=' && depth == 0 {
            let prev = text[..i].chars().next_back();
            let next = text[i + 1..].chars().next();
            let compound_prev = matches!(prev, Some('=' | '!' | '<' | '>'));
            let compound_next = matches!(next, Some('=' | '>'));
            if !compound_prev && !compound_next {
                return Some(i);
            }
        }
    }
    None
}

/// Finds every depth-zero occurrence of the word `keyword`.
pub fn find_keyword(text: &str, keyword: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(text, 0) {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && text[i..].starts_with(keyword) {
            let before = text[..i].chars().next_back();
            let after = text[i + keyword.len()..].chars().next();
            if !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char) {
                found.push(i);
            }
        }
    }
    found
}

/// A `$name` reference found in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// The name without the sigil.
    pub name: &'a str,
    /// Byte offset of the `$`.
    pub start: usize,
    /// Byte offset just past the name.
    pub end: usize,
}

/// Returns every `$identifier` reference outside strings and comments.
///
/// Member accesses such as `obj.$x` and identifiers containing `$` are not
/// references.
pub fn dollar_references(text: &str) -> Vec<Reference<'_>> {
    let mut refs = Vec::new();
    let mut skip_until = 0;
    for (i, c) in CodeScanner::new(text, 0) {
        if i < skip_until || c != '$' {
            continue;
        }
        let before = text[..i].chars().next_back();
        if before.is_some_and(|b| is_ident_char(b) || b == '.') {
            continue;
        }
        let name_len = text[i + 1..]
            .char_indices()
            .find(|&(_, ch)| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .map(|(j, _)| j)
            .unwrap_or(text.len() - i - 1);
        let name = &text[i + 1..i + 1 + name_len];
        if is_identifier(name) {
            refs.push(Reference {
                name,
                start: i,
                end: i + 1 + name_len,
            });
            skip_until = i + 1 + name_len;
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_closing_skips_strings() {
        let text = "{ a: '}', b: `${ {x: 1} }` }";
        assert_eq!(find_closing(text, 1, '}'), Some(text.len() - 1));
    }

    #[test]
    fn test_find_closing_rejects_mismatch() {
        assert_eq!(find_closing("(a]", 1, ')'), None);
        assert_eq!(find_closing("(a", 1, ')'), None);
    }

    #[test]
    fn test_statement_end_stops_at_newline() {
        let text = "$a = 1\n$b = 2";
        assert_eq!(statement_end(text, 5).end, 6);
    }

    #[test]
    fn test_statement_end_spans_blocks() {
        let text = "() => {\n  x++\n}\nnext";
        let end = statement_end(text, 0);
        assert_eq!(end.end, 15);
        assert_eq!(end.open, None);
    }

    #[test]
    fn test_statement_end_reports_unbalanced() {
        let text = "[1, 2\n$b = 3";
        let end = statement_end(text, 0);
        assert_eq!(end.open, Some('['));
        assert_eq!(end.end, 5);
    }

    #[test]
    fn test_statement_end_reports_unterminated_string() {
        let end = statement_end("\"abc\nnext", 0);
        assert_eq!(end.unterminated, Some('"'));
        assert_eq!(end.end, 4);
    }

    #[test]
    fn test_comment_apostrophe_is_ignored() {
        let text = "{ // it's fine\n x }";
        assert_eq!(find_closing(text, 1, '}'), Some(text.len() - 1));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a, f(b, c), 'd,e'", ','),
            vec!["a", " f(b, c)", " 'd,e'"]
        );
    }

    #[test]
    fn test_find_assignment() {
        assert_eq!(find_assignment("b = 2"), Some(2));
        assert_eq!(find_assignment("a == b"), None);
        assert_eq!(find_assignment("f = (x) => x >= 1"), Some(2));
    }

    #[test]
    fn test_find_keyword_respects_word_boundaries() {
        assert_eq!(find_keyword("items as item", "as"), vec![6]);
        assert_eq!(find_keyword("cases as c", "as"), vec![6]);
        assert_eq!(find_keyword("f(a as b) as c", "as"), vec![10]);
    }

    #[test]
    fn test_dollar_references() {
        let refs = dollar_references("$count * 2 + obj.$skip + '$str' + `${$tpl}`");
        let names: Vec<_> = refs.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["count", "tpl"]);
    }

    #[test]
    fn test_dollar_ident() {
        assert_eq!(dollar_ident(" $count "), Some("count"));
        assert_eq!(dollar_ident("$count + 1"), None);
        assert_eq!(dollar_ident("count"), None);
    }
}
