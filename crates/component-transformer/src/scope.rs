//! Per-call generation state: declared names, diagnostics and runtime requirements.

use crate::error::{SemanticWarningKind, TransformErrorKind};
use crate::TransformOptions;
use component_parser::scan::dollar_references;
use component_parser::{Diagnostic, LineIndex, ParseResult, TextRange, ValueLiteral, Variable};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

/// How a declared `$name` behaves in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateKind {
    /// A non-reactive variable.
    Plain,
    /// A tracked, mutable variable.
    Reactive,
    /// A value derived from other variables.
    Computed,
    /// A tracked variable backed by the shared signal store.
    Signal {
        /// The store key.
        key: String,
    },
    /// A declared function.
    Function,
}

impl StateKind {
    fn of(variable: &Variable) -> Self {
        match &variable.value {
            _ if variable.computed => StateKind::Computed,
            ValueLiteral::Signal { key, .. } => StateKind::Signal { key: key.clone() },
            _ if variable.reactive => StateKind::Reactive,
            _ => StateKind::Plain,
        }
    }
}

/// Generation state for one component.
///
/// Everything here lives for a single transform call.
pub struct Scope<'a> {
    /// The component being generated.
    pub parsed: &'a ParseResult,
    /// Transform options.
    pub options: &'a TransformOptions,
    /// The generated component's name.
    pub component_name: String,
    line_index: Option<LineIndex>,
    kinds: FxHashMap<SmolStr, StateKind>,
    computed_order: Vec<SmolStr>,
    warned: FxHashSet<SmolStr>,
    required: FxHashSet<&'static str>,
    /// Transform errors found so far.
    pub errors: Vec<Diagnostic>,
    /// Semantic warnings found so far.
    pub warnings: Vec<Diagnostic>,
}

impl<'a> Scope<'a> {
    /// Creates the scope. `source` enables line numbers in diagnostics.
    pub fn new(
        parsed: &'a ParseResult,
        options: &'a TransformOptions,
        component_name: String,
        source: Option<&str>,
    ) -> Self {
        let mut kinds = FxHashMap::default();
        for (name, variable) in &parsed.variables {
            kinds.insert(name.clone(), StateKind::of(variable));
        }
        for name in parsed.functions.keys() {
            kinds.insert(name.clone(), StateKind::Function);
        }

        let mut scope = Self {
            parsed,
            options,
            component_name,
            line_index: source.map(LineIndex::new),
            kinds,
            computed_order: Vec::new(),
            warned: FxHashSet::default(),
            required: FxHashSet::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        scope.computed_order = scope.order_computed();
        scope
    }

    /// Returns how `name` (without `$`) behaves, if it is declared.
    pub fn kind(&self, name: &str) -> Option<&StateKind> {
        self.kinds.get(name)
    }

    /// Returns true if any variable is backed by the signal store.
    pub fn uses_signals(&self) -> bool {
        self.kinds
            .values()
            .any(|kind| matches!(kind, StateKind::Signal { .. }))
    }

    /// Records that the generated code needs `item` (a hook, helper or import).
    pub fn require(&mut self, item: &'static str) {
        self.required.insert(item);
    }

    /// Returns true if `item` was required.
    pub fn requires(&self, item: &str) -> bool {
        self.required.contains(item)
    }

    fn line(&self, span: Option<TextRange>) -> Option<u32> {
        let index = self.line_index.as_ref()?;
        span.map(|span| index.line(span.start()))
    }

    /// Records a transform error.
    pub fn error(&mut self, kind: TransformErrorKind, span: Option<TextRange>) {
        debug!(error = %kind, "transform error");
        let diagnostic = kind.to_diagnostic(self.line(span));
        self.errors.push(diagnostic);
    }

    /// Records a semantic warning.
    pub fn warn(&mut self, kind: SemanticWarningKind, span: Option<TextRange>) {
        debug!(warning = %kind, "semantic warning");
        let diagnostic = kind.to_diagnostic(self.line(span));
        self.warnings.push(diagnostic);
    }

    /// Warns about an undeclared `$name`, once per name.
    pub fn unknown_reference(&mut self, name: &str) {
        if self.warned.insert(SmolStr::new(name)) {
            self.warn(
                SemanticWarningKind::UnknownReference {
                    name: name.to_string(),
                },
                None,
            );
        }
    }

    /// Computed variables ordered so that each follows the computed variables it reads.
    pub fn computed_order(&self) -> &[SmolStr] {
        &self.computed_order
    }

    /// Computed variables that must be refreshed when `name` changes, in evaluation order.
    pub fn dependents(&self, name: &str) -> Vec<SmolStr> {
        let mut stale: Vec<SmolStr> = Vec::new();
        for computed in &self.computed_order {
            let Some(variable) = self.parsed.variables.get(computed) else {
                continue;
            };
            if variable
                .dependencies
                .iter()
                .any(|dep| dep == name || stale.contains(dep))
            {
                stale.push(computed.clone());
            }
        }
        stale
    }

    /// Declared names referenced by `text`, in first-use order.
    pub fn references(&self, text: &str) -> Vec<SmolStr> {
        let mut names: Vec<SmolStr> = Vec::new();
        for reference in dollar_references(text) {
            if self.kinds.contains_key(reference.name)
                && !names.iter().any(|n| n == reference.name)
            {
                names.push(SmolStr::new(reference.name));
            }
        }
        names
    }

    /// Orders computed variables by their computed dependencies.
    ///
    /// Variables caught in a cycle are reported and appended in declaration order.
    fn order_computed(&mut self) -> Vec<SmolStr> {
        let parsed = self.parsed;
        let computed: Vec<&Variable> = parsed
            .variables
            .values()
            .filter(|v| v.computed)
            .collect();

        let mut ordered: Vec<SmolStr> = Vec::with_capacity(computed.len());
        loop {
            let before = ordered.len();
            for variable in &computed {
                if ordered.contains(&variable.name) {
                    continue;
                }
                let ready = variable.dependencies.iter().all(|dep| {
                    self.kinds.get(dep) != Some(&StateKind::Computed) || ordered.contains(dep)
                });
                if ready {
                    ordered.push(variable.name.clone());
                }
            }
            if ordered.len() == before {
                break;
            }
        }

        let cyclic: Vec<&Variable> = computed
            .into_iter()
            .filter(|v| !ordered.contains(&v.name))
            .collect();
        if let Some(first) = cyclic.first() {
            let names = cyclic
                .iter()
                .map(|v| format!("${}", v.name))
                .collect::<Vec<_>>()
                .join(", ");
            let span = first.span;
            self.error(TransformErrorKind::CircularComputed { names }, Some(span));
            ordered.extend(cyclic.iter().map(|v| v.name.clone()));
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_parser::parse;
    use pretty_assertions::assert_eq;

    fn names(list: &[SmolStr]) -> Vec<&str> {
        list.iter().map(SmolStr::as_str).collect()
    }

    #[test]
    fn test_state_kinds() {
        let parsed = parse(
            "$a = 1\n$b! = 2\n$c = $b + 1\n$d! = signal(\"k\", 0)\n$f = () => $b",
        );
        let options = TransformOptions::default();
        let scope = Scope::new(&parsed, &options, "C".to_string(), None);
        assert_eq!(scope.kind("a"), Some(&StateKind::Plain));
        assert_eq!(scope.kind("b"), Some(&StateKind::Reactive));
        assert_eq!(scope.kind("c"), Some(&StateKind::Computed));
        assert_eq!(
            scope.kind("d"),
            Some(&StateKind::Signal {
                key: "k".to_string()
            })
        );
        assert_eq!(scope.kind("f"), Some(&StateKind::Function));
        assert!(scope.uses_signals());
    }

    #[test]
    fn test_computed_order_follows_dependencies() {
        let parsed = parse("$quad = $double * 2\n$double = $count * 2\n$count! = 1");
        let options = TransformOptions::default();
        let scope = Scope::new(&parsed, &options, "C".to_string(), None);
        assert_eq!(names(scope.computed_order()), vec!["double", "quad"]);
        assert_eq!(names(&scope.dependents("count")), vec!["double", "quad"]);
        assert!(scope.errors.is_empty());
    }

    #[test]
    fn test_computed_cycle_is_reported() {
        let source = "$a = $b + 1\n$b = $a + 1";
        let parsed = parse(source);
        let options = TransformOptions::default();
        let scope = Scope::new(&parsed, &options, "C".to_string(), Some(source));
        assert_eq!(names(scope.computed_order()), vec!["a", "b"]);
        assert_eq!(scope.errors.len(), 1);
        assert_eq!(
            scope.errors[0].message,
            "computed variables form a dependency cycle: $a, $b"
        );
        assert_eq!(scope.errors[0].line, Some(1));
    }

    #[test]
    fn test_unknown_reference_warns_once() {
        let parsed = parse("");
        let options = TransformOptions::default();
        let mut scope = Scope::new(&parsed, &options, "C".to_string(), None);
        scope.unknown_reference("ghost");
        scope.unknown_reference("ghost");
        assert_eq!(scope.warnings.len(), 1);
    }
}
