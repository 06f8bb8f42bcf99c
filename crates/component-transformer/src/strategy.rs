//! The code generation interface implemented once per target.
//!
//! The driver in [`crate::transform`] walks a [`ParseResult`] once. It
//! rewrites every expression through [`crate::expr::rewrite`] and renders
//! the template bottom-up, so each hook receives finished code for its
//! children and only decides how the target spells one construct.
//!
//! [`ParseResult`]: component_parser::ParseResult

use crate::expr::{ExprContext, WriteOp};
use crate::scope::{Scope, StateKind};
use crate::target::Target;
use component_parser::{Element, Variable};
use smol_str::SmolStr;

/// A variable prepared for emission.
#[derive(Debug)]
pub struct VariableCode<'a> {
    /// The declaration.
    pub variable: &'a Variable,
    /// How the variable behaves.
    pub kind: StateKind,
    /// The rewritten initializer. For signals, the initial value passed to the store.
    pub init: String,
    /// Names the initializer reads that are already declared, in first-use order.
    pub references: Vec<SmolStr>,
}

/// A function prepared for emission.
#[derive(Debug)]
pub struct FunctionCode<'a> {
    /// The function name.
    pub name: &'a str,
    /// Declared `async`.
    pub is_async: bool,
    /// The parameter list without type annotations.
    pub params: String,
    /// The rewritten body.
    pub body: String,
    /// Whether `body` is a statement block rather than an expression.
    pub block_body: bool,
    /// Names the body references that are already declared, in first-use order.
    pub references: Vec<SmolStr>,
}

/// How an event attribute refers to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// A declared function, by name.
    Function(SmolStr),
    /// Rewritten inline code.
    Inline {
        /// The code.
        code: String,
        /// The code is already a function expression.
        is_function: bool,
    },
}

/// An attribute value prepared for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue<'a> {
    /// A literal value; `None` for a bare boolean attribute.
    Static(Option<&'a str>),
    /// A rewritten expression.
    Expression(String),
}

/// A control-flow block whose bodies are already rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<'a> {
    /// An if chain: `(condition, body)` branches then an optional final else.
    Conditional {
        /// The branches in order.
        branches: Vec<(String, String)>,
        /// The `{:else}` body.
        otherwise: Option<String>,
    },
    /// Iteration over a list.
    Each {
        /// The rewritten iterable.
        iterable: String,
        /// The item name.
        item: &'a str,
        /// The index name.
        index: Option<&'a str>,
        /// The rewritten key expression.
        key: Option<String>,
        /// The rendered body.
        body: String,
    },
    /// A counted loop over `start..=end`.
    Range {
        /// The counter name.
        variable: &'a str,
        /// First value.
        start: i64,
        /// Last value.
        end: i64,
        /// The rendered body.
        body: String,
    },
}

/// Generated script sections handed to the component shell.
#[derive(Debug, Default)]
pub struct ComponentParts {
    /// Import statements, one per entry.
    pub imports: Vec<String>,
    /// Named export statements, verbatim.
    pub exports: Vec<String>,
    /// Variable and function declarations, each after what it reads.
    ///
    /// Consecutive declarations of the same sort share a section.
    pub declarations: Vec<Vec<String>>,
    /// The rendered template.
    pub template: String,
}

/// Target-specific code generation.
pub trait CodeGenStrategy: Sync {
    /// The target this strategy generates.
    fn target(&self) -> Target;

    /// Spells a read of a declared name.
    fn read(&self, name: &str, _kind: &StateKind, _ctx: ExprContext) -> String {
        name.to_string()
    }

    /// Spells a write to a reactive variable.
    fn write(&self, name: &str, op: WriteOp, value: &str, ctx: ExprContext) -> String;

    /// Declares one variable.
    fn emit_variable(&self, scope: &mut Scope<'_>, variable: &VariableCode<'_>) -> String;

    /// Declares one function.
    fn emit_function(&self, scope: &mut Scope<'_>, function: &FunctionCode<'_>) -> String;

    /// Renders a data interpolation.
    fn emit_binding(&self, scope: &mut Scope<'_>, code: &str) -> String;

    /// Renders an event attribute.
    fn emit_event(&self, scope: &mut Scope<'_>, event_type: &str, handler: &Handler) -> String;

    /// Renders a non-event attribute.
    fn emit_attribute(&self, name: &str, value: &AttributeValue<'_>) -> String;

    /// Renders an element from its rendered attributes, events and children.
    fn emit_element(
        &self,
        scope: &mut Scope<'_>,
        element: &Element,
        attributes: Vec<String>,
        events: Vec<String>,
        children: String,
    ) -> String;

    /// Renders text content.
    fn emit_text(&self, text: &str) -> String;

    /// Renders an HTML comment.
    fn emit_comment(&self, text: &str) -> String;

    /// Renders a control-flow block.
    fn emit_control_flow(&self, scope: &mut Scope<'_>, flow: Flow<'_>) -> String;

    /// Joins rendered sibling nodes.
    fn join(&self, nodes: Vec<String>) -> String {
        nodes.concat()
    }

    /// Assembles the component.
    fn emit_component_shell(&self, scope: &mut Scope<'_>, parts: ComponentParts) -> String;

    /// A minimal valid component that reports `message` for `filename`.
    fn emit_error_component(&self, component_name: &str, message: &str, filename: &str) -> String;
}

/// Renders `params` as a plain JavaScript parameter list.
pub fn params_js(params: &[component_parser::Param]) -> String {
    params
        .iter()
        .map(|param| match &param.default {
            Some(default) => format!("{} = {}", param.name, default),
            None => param.name.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The signal store import shared by every target.
pub fn signal_import(scope: &Scope<'_>) -> Option<String> {
    scope.uses_signals().then(|| {
        format!(
            "import {{ signal }} from {};",
            crate::code::js_string(&scope.options.signal_module)
        )
    })
}
