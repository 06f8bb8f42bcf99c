//! Transform errors and semantic warnings.

use component_parser::{Diagnostic, DiagnosticKind};
use thiserror::Error;

/// A problem that prevents faithful code generation.
///
/// Generation still produces output; the affected construct is degraded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformErrorKind {
    /// The requested target id is not supported.
    #[error("unknown target '{name}', expected one of react, vue, svelte, vanilla")]
    UnknownTarget {
        /// The id as given.
        name: String,
    },

    /// The source has parse errors that leave the template unusable.
    #[error("component could not be generated: {count} blocking parse error(s)")]
    BlockingParseErrors {
        /// Number of blocking errors.
        count: usize,
    },

    /// A handler or function assigns to a derived value.
    #[error("cannot assign to computed variable ${name}")]
    AssignToComputed {
        /// The computed variable.
        name: String,
    },

    /// Computed variables that depend on each other.
    #[error("computed variables form a dependency cycle: {names}")]
    CircularComputed {
        /// The variables in the cycle, comma separated.
        names: String,
    },
}

impl TransformErrorKind {
    /// Returns a hint for fixing the problem.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            TransformErrorKind::UnknownTarget { .. } => None,
            TransformErrorKind::BlockingParseErrors { .. } => {
                Some("fix the parse errors listed above".to_string())
            }
            TransformErrorKind::AssignToComputed { name } => Some(format!(
                "assign to the variables ${name} is derived from, or declare it with '!'"
            )),
            TransformErrorKind::CircularComputed { .. } => {
                Some("make one of the variables reactive with '!'".to_string())
            }
        }
    }

    /// Converts this error into a diagnostic.
    pub fn to_diagnostic(&self, line: Option<u32>) -> Diagnostic {
        let diagnostic =
            Diagnostic::new(DiagnosticKind::TransformError, self.to_string()).with_line(line);
        match self.suggestion() {
            Some(suggestion) => diagnostic.with_suggestion(suggestion),
            None => diagnostic,
        }
    }
}

/// A non-blocking issue found during generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticWarningKind {
    /// A `$name` that is neither a declared variable nor a function.
    #[error("reference to undeclared ${name}")]
    UnknownReference {
        /// The referenced name.
        name: String,
    },

    /// A `{#while}` block rendered as a single conditional.
    #[error("{{#while {condition}}} is rendered at most once; templates cannot loop on a condition")]
    WhileLowered {
        /// The raw condition.
        condition: String,
    },
}

impl SemanticWarningKind {
    /// Converts this warning into a diagnostic.
    pub fn to_diagnostic(&self, line: Option<u32>) -> Diagnostic {
        let diagnostic =
            Diagnostic::new(DiagnosticKind::SemanticWarning, self.to_string()).with_line(line);
        match self {
            SemanticWarningKind::UnknownReference { name } => {
                diagnostic.with_suggestion(format!("declare ${name} or remove the '$' prefix"))
            }
            SemanticWarningKind::WhileLowered { .. } => {
                diagnostic.with_suggestion("iterate over a list with {#each} instead")
            }
        }
    }
}
