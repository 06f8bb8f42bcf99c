//! Diagnostic types shared by the parser and the code generators.

use std::fmt;

/// A user-facing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    /// The diagnostic category.
    pub kind: DiagnosticKind,
    /// The diagnostic message.
    pub message: String,
    /// The 1-based source line, when known.
    pub line: Option<u32>,
    /// A hint for fixing the problem.
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            suggestion: None,
        }
    }

    /// Sets the line number.
    pub fn with_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }

    /// Sets the suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

/// Diagnostic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DiagnosticKind {
    /// Malformed component syntax. Recoverable.
    ParseError,
    /// A construct or target the generator cannot lower. Degraded output is produced.
    TransformError,
    /// Non-blocking information loss or a suspicious reference.
    SemanticWarning,
}

impl DiagnosticKind {
    /// Returns the category as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::ParseError => "parse_error",
            DiagnosticKind::TransformError => "transform_error",
            DiagnosticKind::SemanticWarning => "semantic_warning",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
