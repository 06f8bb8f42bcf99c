//! Statement-level lexer using logos.
//!
//! The lexer only tokenizes the component's statement level: declarations,
//! imports, exports and the opening of the `<template>` region. Right-hand
//! sides, function bodies and template markup are read as raw source by the
//! parser, which then re-seeks the lexer past them with [`Lexer::at`].

use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: TextRange,
}

/// Token kinds for component statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip(r"//[^\n]*", allow_greedy = true))]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    // === Punctuation ===
    /// `<`
    #[token("<", priority = 10)]
    LAngle,

    /// `</`
    #[token("</", priority = 10)]
    LAngleSlash,

    /// `>`
    #[token(">", priority = 10)]
    RAngle,

    /// `=`
    #[token("=", priority = 10)]
    Eq,

    /// `=>`
    #[token("=>", priority = 10)]
    FatArrow,

    /// `!`, the reactivity marker
    #[token("!", priority = 10)]
    Bang,

    /// `:`
    #[token(":", priority = 10)]
    Colon,

    /// `,`
    #[token(",", priority = 10)]
    Comma,

    /// `;`
    #[token(";", priority = 10)]
    Semicolon,

    /// `*`
    #[token("*", priority = 10)]
    Star,

    /// `(`
    #[token("(", priority = 10)]
    LParen,

    /// `)`
    #[token(")", priority = 10)]
    RParen,

    /// `{`
    #[token("{", priority = 10)]
    LBrace,

    /// `}`
    #[token("}", priority = 10)]
    RBrace,

    /// `[`
    #[token("[", priority = 10)]
    LBracket,

    /// `]`
    #[token("]", priority = 10)]
    RBracket,

    /// Newline, the statement terminator
    #[token("\n", priority = 10)]
    Newline,

    // === Keywords ===
    /// `import`
    #[token("import", priority = 5)]
    Import,

    /// `export`
    #[token("export", priority = 5)]
    Export,

    /// `from`
    #[token("from", priority = 5)]
    From,

    /// `as`
    #[token("as", priority = 5)]
    As,

    /// `default`
    #[token("default", priority = 5)]
    Default,

    /// `async`
    #[token("async", priority = 5)]
    Async,

    /// `function`
    #[token("function", priority = 5)]
    Function,

    // === Literals and names ===
    /// A `$name` component reference
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", priority = 6)]
    DollarIdent,

    /// A plain identifier
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", priority = 4)]
    Ident,

    /// A number
    #[regex(r"[0-9]+(\.[0-9]+)?", priority = 4)]
    Number,

    /// A single- or double-quoted string
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    /// A backtick template string
    #[regex(r"`([^`\\]|\\(.|\n))*`")]
    TemplateString,

    /// Other punctuation runs
    #[regex(r"[.?+\-%&|^~@#]+", priority = 1)]
    Text,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns true if this token ends a statement.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LAngle => "'<'",
            TokenKind::LAngleSlash => "'</'",
            TokenKind::RAngle => "'>'",
            TokenKind::Eq => "'='",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Bang => "'!'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Star => "'*'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Newline => "newline",
            TokenKind::Import => "'import'",
            TokenKind::Export => "'export'",
            TokenKind::From => "'from'",
            TokenKind::As => "'as'",
            TokenKind::Default => "'default'",
            TokenKind::Async => "'async'",
            TokenKind::Function => "'function'",
            TokenKind::DollarIdent => "$name",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::TemplateString => "template string",
            TokenKind::Text => "text",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }
}

/// A lexer over component source, starting at an arbitrary byte offset.
#[derive(Clone)]
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    base: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer for the whole source.
    pub fn new(source: &'src str) -> Self {
        Self::at(source, 0)
    }

    /// Creates a lexer that starts at `offset`. Spans stay relative to `source`.
    pub fn at(source: &'src str, offset: usize) -> Self {
        let (rest, base) = match source.get(offset..) {
            Some(rest) => (rest, offset),
            None => ("", source.len()),
        };
        Self {
            inner: TokenKind::lexer(rest),
            source,
            base,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    fn range(&self, span: std::ops::Range<usize>) -> TextRange {
        TextRange::new(
            TextSize::from((self.base + span.start) as u32),
            TextSize::from((self.base + span.end) as u32),
        )
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => Some(Token {
                kind,
                span: self.range(self.inner.span()),
            }),
            Some(Err(())) => Some(Token {
                kind: TokenKind::Error,
                span: self.range(self.inner.span()),
            }),
            None => {
                self.finished = true;
                let end = TextSize::from(self.source.len() as u32);
                Some(Token {
                    kind: TokenKind::Eof,
                    span: TextRange::empty(end),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_reactive_declaration() {
        assert_eq!(
            tokenize("$count! = 0"),
            vec![
                TokenKind::DollarIdent,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::Number
            ]
        );
    }

    #[test]
    fn test_typed_declaration() {
        assert_eq!(
            tokenize("$name: string! = 'x'"),
            vec![
                TokenKind::DollarIdent,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::String
            ]
        );
    }

    #[test]
    fn test_keywords_versus_identifiers() {
        assert_eq!(
            tokenize("import imports from fromage"),
            vec![
                TokenKind::Import,
                TokenKind::Ident,
                TokenKind::From,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn test_named_import() {
        assert_eq!(
            tokenize("import { a, b as c } from \"./m\""),
            vec![
                TokenKind::Import,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Comma,
                TokenKind::Ident,
                TokenKind::As,
                TokenKind::Ident,
                TokenKind::RBrace,
                TokenKind::From,
                TokenKind::String
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            tokenize("// it's a comment\n/* block\n */$x"),
            vec![TokenKind::Newline, TokenKind::DollarIdent]
        );
    }

    #[test]
    fn test_fat_arrow_and_template_open() {
        assert_eq!(
            tokenize("=> <template>"),
            vec![
                TokenKind::FatArrow,
                TokenKind::LAngle,
                TokenKind::Ident,
                TokenKind::RAngle
            ]
        );
    }

    #[test]
    fn test_lexer_at_offset_keeps_absolute_spans() {
        let source = "xxxx $a";
        let token = Lexer::at(source, 4).next().unwrap();
        assert_eq!(token.kind, TokenKind::DollarIdent);
        assert_eq!(
            token.span,
            TextRange::new(TextSize::from(5), TextSize::from(7))
        );
    }
}
