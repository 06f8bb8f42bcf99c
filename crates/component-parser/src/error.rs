//! Parse error types.

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use text_size::TextRange;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: TextRange,
    /// The 1-based line of `span.start`, when known.
    pub line: Option<u32>,
    /// A human-actionable hint for fixing the error.
    pub suggestion: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: TextRange) -> Self {
        Self {
            kind,
            span,
            line: None,
            suggestion: None,
        }
    }

    /// Sets the suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Returns true if the error leaves the template unusable for code generation.
    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }

    /// Converts the error into a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::ParseError,
            message: self.kind.to_string(),
            line: self.line,
            suggestion: self.suggestion.clone(),
        }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseErrorKind {
    /// An unexpected token was encountered at statement level.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// A declaration without a usable right-hand side.
    #[error("invalid value for ${name}: {message}")]
    InvalidValue {
        /// The declared name.
        name: String,
        /// A description of the problem.
        message: String,
    },

    /// A name declared twice.
    #[error("duplicate declaration: ${name}")]
    DuplicateDeclaration {
        /// The duplicated name.
        name: String,
    },

    /// An invalid function parameter list.
    #[error("invalid parameters for ${name}: {message}")]
    InvalidParameters {
        /// The function name.
        name: String,
        /// A description of the problem.
        message: String,
    },

    /// An invalid import or export statement.
    #[error("invalid {statement} statement: {message}")]
    InvalidModuleStatement {
        /// `import` or `export`.
        statement: &'static str,
        /// A description of the problem.
        message: String,
    },

    /// Brackets, braces or parentheses that never close.
    #[error("unbalanced {delimiter}")]
    UnbalancedDelimiter {
        /// The delimiter that was left open.
        delimiter: char,
    },

    /// A string literal without a closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,

    /// The `<template>` region has no matching `</template>`.
    #[error("unclosed tag: <template>")]
    UnclosedTemplate,

    /// An element was never closed.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
    },

    /// A closing tag did not match the open element.
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        /// The expected tag name.
        expected: String,
        /// The found tag name.
        found: String,
    },

    /// A closing tag with no open element to close.
    #[error("unexpected closing tag: </{tag_name}>")]
    UnexpectedClosingTag {
        /// The name in the closing tag.
        tag_name: String,
    },

    /// A control-flow block was never closed.
    #[error("unclosed block: {{#{block_type}}}")]
    UnclosedBlock {
        /// The type of block (if, each, for, while).
        block_type: String,
    },

    /// A block marker with bad syntax.
    #[error("invalid block syntax: {message}")]
    InvalidBlockSyntax {
        /// A description of the problem.
        message: String,
    },

    /// An interpolation whose closing brace is missing.
    #[error("unterminated expression: missing '}}'")]
    UnterminatedExpression,

    /// A second `<template>` region. Only the first is used.
    #[error("duplicate <template> region")]
    DuplicateTemplate,

    /// Elements or blocks nested deeper than the configured limit.
    #[error("template nesting exceeds {max_depth} levels")]
    NestingTooDeep {
        /// The configured limit.
        max_depth: usize,
    },
}

impl ParseErrorKind {
    /// Returns true if the error makes the template tree unreliable.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::UnclosedTemplate
                | ParseErrorKind::UnclosedTag { .. }
                | ParseErrorKind::MismatchedClosingTag { .. }
                | ParseErrorKind::UnexpectedClosingTag { .. }
                | ParseErrorKind::UnclosedBlock { .. }
                | ParseErrorKind::InvalidBlockSyntax { .. }
                | ParseErrorKind::UnterminatedExpression
                | ParseErrorKind::NestingTooDeep { .. }
        )
    }
}
