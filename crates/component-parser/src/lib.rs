//! Parser for single-file reactive components.
//!
//! This crate provides:
//! - Lexer (tokenizer) for the statement level using `logos`
//! - Recursive descent parser for declarations, functions, imports and exports
//! - Template tree parser with an explicit stack of open elements and blocks
//! - Error recovery: malformed input never panics and yields partial results
//!
//! # Example
//!
//! ```
//! use component_parser::parse;
//!
//! let source = r#"
//! $count! = 0
//! $double = $count * 2
//! $increment = () => { $count++ }
//!
//! <template>
//!   <button click={$increment}>{$count} / {$double}</button>
//! </template>
//! "#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert!(result.variables["double"].computed);
//! ```

mod ast;
mod collect;
mod diagnostic;
mod error;
mod lexer;
mod line_index;
mod literal;
mod parser;
pub mod scan;
mod template;

pub use ast::*;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use line_index::LineIndex;
pub use template::event_name;
pub use text_size::{TextRange, TextSize};

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug_span;

/// Default limit for nested elements and blocks in a template.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for parsing component files.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// The file name, used in log events.
    pub filename: Option<String>,
    /// Maximum nesting of elements and blocks before the template is rejected.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            filename: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Sets the file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// The result of parsing a component file.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseResult {
    /// Declared variables by name, in declaration order.
    pub variables: IndexMap<SmolStr, Variable>,
    /// Declared functions by name, in declaration order.
    pub functions: IndexMap<SmolStr, Function>,
    /// The raw markup inside `<template>`, empty when absent.
    pub template: String,
    /// The span of `template` in the source.
    pub template_span: Option<TextRange>,
    /// The template tree.
    pub fragment: Fragment,
    /// Interpolations in content position, in document order.
    pub bindings: Vec<Binding>,
    /// Event attributes, in document order.
    pub events: Vec<Event>,
    /// Control-flow blocks in pre-order.
    pub control_flow: Vec<ControlFlowNode>,
    /// Import statements.
    pub imports: Vec<ImportRecord>,
    /// Export statements.
    pub exports: Vec<ExportRecord>,
    /// Errors in source order.
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if any error leaves the template unusable for code generation.
    pub fn has_blocking_errors(&self) -> bool {
        self.errors.iter().any(ParseError::is_blocking)
    }

    /// Returns the `export default` record, if any.
    pub fn default_export(&self) -> Option<&ExportRecord> {
        self.exports.iter().find(|e| e.kind == ExportKind::Default)
    }

    /// Returns true if `name` is a declared variable or function.
    pub fn is_declared(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.functions.contains_key(name)
    }
}

/// Parses a component source file.
///
/// This function never fails: errors are collected in
/// [`ParseResult::errors`] and parsing continues past them.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, ParseOptions::default())
}

/// Parses a component source file with custom options.
pub fn parse_with_options(source: &str, options: ParseOptions) -> ParseResult {
    let span = debug_span!(
        "parse",
        filename = options.filename.as_deref().unwrap_or("<anonymous>"),
        len = source.len()
    );
    let _guard = span.enter();
    let result = parser::Parser::new(source, options).parse();
    tracing::debug!(
        variables = result.variables.len(),
        functions = result.functions.len(),
        errors = result.errors.len(),
        "parsed component"
    );
    result
}
