//! AST types for component sources.
//!
//! A component is a flat list of statements (variables, functions, imports,
//! exports) plus one `<template>` region. Statement-level types mirror what
//! the code generators need; the template is kept both as raw text and as a
//! node tree.

use smol_str::SmolStr;
use std::fmt;
use text_size::TextRange;

/// A declared component variable (`$name = value`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Variable {
    /// The variable name without the `$` sigil.
    pub name: SmolStr,
    /// Declared with the `!` marker as a tracked, mutable value.
    pub reactive: bool,
    /// Derived from other declared variables. Never set together with `reactive`.
    pub computed: bool,
    /// Whether a `: type` annotation was written.
    pub has_type_annotation: bool,
    /// The annotated type, if any.
    pub type_name: Option<SmolStr>,
    /// The initial value, or the source expression for computed variables.
    pub value: ValueLiteral,
    /// Declared variables referenced by the right-hand side, in first-use order.
    pub dependencies: Vec<SmolStr>,
    /// The span of the whole declaration.
    pub span: TextRange,
}

/// The right-hand side of a variable declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "lowercase"))]
pub enum ValueLiteral {
    /// A quoted string; holds the text between the quotes, escapes untouched.
    String(String),
    /// A numeric literal.
    Number(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// `null` or `~`.
    Null,
    /// An array literal, kept as source text.
    Array(String),
    /// An object literal, kept as source text.
    Object(String),
    /// A `signal(key, initial)` call backed by the shared store.
    Signal {
        /// The store key.
        key: String,
        /// The initial value used when the key is not yet present.
        initial: Box<ValueLiteral>,
    },
    /// Any other expression, kept as source text.
    Expression(String),
}

impl ValueLiteral {
    /// Returns the semantic name of this literal kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueLiteral::String(_) => "string",
            ValueLiteral::Number(_) => "number",
            ValueLiteral::Boolean(_) => "boolean",
            ValueLiteral::Null => "null",
            ValueLiteral::Array(_) => "array",
            ValueLiteral::Object(_) => "object",
            ValueLiteral::Signal { .. } => "signal",
            ValueLiteral::Expression(_) => "expression",
        }
    }

    /// Renders the value as JavaScript source.
    pub fn to_js(&self) -> String {
        match self {
            ValueLiteral::String(s) => quote_js(s),
            ValueLiteral::Number(n) => format_number(*n),
            ValueLiteral::Boolean(b) => b.to_string(),
            ValueLiteral::Null => "null".to_string(),
            ValueLiteral::Array(raw) | ValueLiteral::Object(raw) | ValueLiteral::Expression(raw) => {
                raw.clone()
            }
            ValueLiteral::Signal { key, initial } => {
                format!("signal.use({}, {})", quote_js(key), initial.to_js())
            }
        }
    }
}

/// Wraps string content in double quotes, escaping any bare `"` and line breaks.
fn quote_js(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2);
    out.push('"');
    let mut backslashes = 0usize;
    for c in content.chars() {
        match c {
            '"' if backslashes % 2 == 0 => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
    }
    out.push('"');
    out
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{sign}Infinity")
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A declared component function (`$name = (params) => body`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Function {
    /// The function name without the `$` sigil.
    pub name: SmolStr,
    /// Parameters in declaration order.
    pub params: Vec<Param>,
    /// Arrow syntax (`=>`) rather than the `function` keyword.
    pub is_arrow: bool,
    /// Declared `async`.
    pub is_async: bool,
    /// The body text. Block bodies exclude their outer braces.
    pub body: String,
    /// Whether `body` came from a `{ ... }` block rather than a single expression.
    pub block_body: bool,
    /// The span of the whole declaration.
    pub span: TextRange,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Param {
    /// The parameter name (rest parameters keep their `...`).
    pub name: SmolStr,
    /// The annotated type, if any.
    pub type_name: Option<String>,
    /// Whether a `: type` annotation was written.
    pub has_type_annotation: bool,
    /// The default value expression, if any.
    pub default: Option<String>,
}

/// The kind of a template binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BindingKind {
    /// A data interpolation rendering an expression's value.
    #[default]
    Data,
}

/// One interpolation site in the template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Binding {
    /// The raw expression text between the braces.
    pub expression: String,
    /// The binding kind.
    pub kind: BindingKind,
    /// The expression is exactly one `$identifier` reference.
    pub is_variable: bool,
    /// The referenced name (without `$`) when `is_variable`.
    pub variable_name: Option<SmolStr>,
    /// The span of the interpolation including braces.
    pub span: TextRange,
}

/// One event attribute in the template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event {
    /// The DOM event name (`click`, `input`, ...).
    pub event_type: SmolStr,
    /// The raw handler text between the braces.
    pub handler: String,
    /// The handler is a bare reference to a declared function.
    pub is_function: bool,
    /// The handler is an inline expression.
    pub is_inline: bool,
    /// The referenced function name (without `$`) when `is_function`.
    pub function_name: Option<SmolStr>,
    /// The span of the attribute.
    pub span: TextRange,
}

/// A control-flow block found in the template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum ControlFlowNode {
    /// `{#if}` with optional `{:else if}` chain and `{:else}`.
    Conditional(Conditional),
    /// `{#each iterable as item, index (key)}`.
    Loop {
        /// The iterated expression.
        iterable: String,
        /// The item binding name.
        item_name: SmolStr,
        /// The optional index binding name.
        index_name: Option<SmolStr>,
        /// The optional key expression.
        key: Option<String>,
        /// The raw body markup.
        content: String,
    },
    /// `{#for v = start to end}` with inclusive integer bounds.
    For {
        /// The counter name.
        variable: SmolStr,
        /// First value.
        start: i64,
        /// Last value (inclusive).
        end: i64,
        /// The raw body markup.
        content: String,
    },
    /// `{#while condition}`.
    While {
        /// The raw condition.
        condition: String,
        /// The raw body markup.
        content: String,
    },
}

impl ControlFlowNode {
    /// Returns the block kind as written in the template.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ControlFlowNode::Conditional(_) => "conditional",
            ControlFlowNode::Loop { .. } => "loop",
            ControlFlowNode::For { .. } => "for",
            ControlFlowNode::While { .. } => "while",
        }
    }
}

/// A conditional block; `else_if` links form the `{:else if}` chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Conditional {
    /// The raw condition.
    pub condition: String,
    /// The markup rendered when the condition holds.
    pub if_content: String,
    /// The markup of a final `{:else}` branch.
    pub else_content: Option<String>,
    /// The next link of an `{:else if}` chain.
    pub else_if: Option<Box<Conditional>>,
}

/// The shape of an import statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImportKind {
    /// `import Name from 'mod'`
    Default,
    /// `import { a, b as c } from 'mod'`
    Named,
    /// `import * as ns from 'mod'`
    Namespace,
    /// `import 'mod'`
    SideEffect,
}

/// An imported or exported name pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImportName {
    /// The name in the source module.
    pub imported: SmolStr,
    /// The name bound locally.
    pub local: SmolStr,
}

impl ImportName {
    /// Creates a pair where both names are the same.
    pub fn same(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        Self {
            imported: name.clone(),
            local: name,
        }
    }

    fn write_pair(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.imported == self.local {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{} as {}", self.imported, self.local)
        }
    }
}

/// An import statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ImportRecord {
    /// The import shape.
    pub kind: ImportKind,
    /// Bound names. Default and namespace imports hold one entry.
    pub names: Vec<ImportName>,
    /// The module path.
    pub source: String,
    /// Written as `import type ...`.
    pub type_only: bool,
    /// The span of the statement this record came from.
    pub span: TextRange,
}

impl fmt::Display for ImportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.type_only { "import type" } else { "import" };
        match self.kind {
            ImportKind::SideEffect => write!(f, "import '{}';", self.source),
            ImportKind::Default => {
                let local = self.names.first().map(|n| n.local.as_str()).unwrap_or("_default");
                write!(f, "{} {} from '{}';", keyword, local, self.source)
            }
            ImportKind::Namespace => {
                let local = self.names.first().map(|n| n.local.as_str()).unwrap_or("_ns");
                write!(f, "{} * as {} from '{}';", keyword, local, self.source)
            }
            ImportKind::Named => {
                write!(f, "{} {{ ", keyword)?;
                for (i, name) in self.names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    name.write_pair(f)?;
                }
                write!(f, " }} from '{}';", self.source)
            }
        }
    }
}

/// The shape of an export statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExportKind {
    /// `export default ...`
    Default,
    /// `export const ...`, `export function ...`, `export { ... }`
    Named,
}

/// An export statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExportRecord {
    /// The export shape.
    pub kind: ExportKind,
    /// Exported names (`imported` is the local name, `local` the exported one).
    pub names: Vec<ImportName>,
    /// The export declares a function.
    pub is_function: bool,
    /// The statement text as written, for verbatim re-emission.
    pub declaration: String,
    /// The module path of a re-export (`export { a } from 'mod'`).
    pub source: Option<String>,
    /// The span of the statement.
    pub span: TextRange,
}

impl ExportRecord {
    /// For default exports, the identifier naming the exported value, if any.
    pub fn default_name(&self) -> Option<&str> {
        match self.kind {
            ExportKind::Default => self.names.first().map(|n| n.local.as_str()),
            ExportKind::Named => None,
        }
    }
}

impl fmt::Display for ExportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ExportKind::Default => f.write_str(self.declaration.trim()),
            ExportKind::Named => {
                let is_list = self
                    .declaration
                    .trim_start()
                    .strip_prefix("export")
                    .is_some_and(|rest| rest.trim_start().starts_with('{'));
                if !is_list {
                    return f.write_str(self.declaration.trim());
                }
                f.write_str("export { ")?;
                for (i, name) in self.names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    name.write_pair(f)?;
                }
                f.write_str(" }")?;
                if let Some(source) = &self.source {
                    write!(f, " from '{}'", source)?;
                }
                f.write_str(";")
            }
        }
    }
}

// === Template tree ===

/// A sequence of template nodes.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fragment {
    /// The child nodes.
    pub nodes: Vec<TemplateNode>,
    /// The source span covered by the nodes.
    pub span: TextRange,
}

/// A node in the template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum TemplateNode {
    /// An element or child component.
    Element(Element),
    /// Text content.
    Text(Text),
    /// An HTML comment.
    Comment(Comment),
    /// A `{expression}` interpolation.
    Interpolation(Interpolation),
    /// `{#if}` block.
    IfBlock(IfBlock),
    /// `{#each}` block.
    EachBlock(EachBlock),
    /// `{#for}` block.
    ForBlock(ForBlock),
    /// `{#while}` block.
    WhileBlock(WhileBlock),
}

/// An element such as `<div class="x">`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Element {
    /// The tag name.
    pub name: SmolStr,
    /// Attributes in source order.
    pub attributes: Vec<Attribute>,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
    /// Written as `<name />` or a void HTML element.
    pub self_closing: bool,
    /// The span of the element.
    pub span: TextRange,
}

impl Element {
    /// Returns true if the tag names a component rather than an HTML element.
    pub fn is_component(&self) -> bool {
        self.name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
    }
}

/// An element attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Attribute {
    /// `name`, `name="value"` or `name=value`.
    Static {
        /// The attribute name.
        name: SmolStr,
        /// The literal value, if any.
        value: Option<String>,
    },
    /// `name={expression}`.
    Expression {
        /// The attribute name.
        name: SmolStr,
        /// The raw expression.
        expression: String,
    },
    /// An event attribute (`click={handler}`).
    Event {
        /// The normalized DOM event name.
        event_type: SmolStr,
        /// The raw handler.
        handler: String,
        /// The span of the attribute.
        span: TextRange,
    },
}

/// Text content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Text {
    /// The raw text.
    pub data: String,
    /// The span of the text.
    pub span: TextRange,
}

/// An HTML comment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Comment {
    /// The comment text between `<!--` and `-->`.
    pub data: String,
    /// The span of the comment.
    pub span: TextRange,
}

/// A `{expression}` interpolation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Interpolation {
    /// The raw expression between the braces.
    pub expression: String,
    /// The span including braces.
    pub span: TextRange,
}

/// An `{#if}` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IfBlock {
    /// The raw condition.
    pub condition: String,
    /// Nodes rendered when the condition holds.
    pub consequent: Fragment,
    /// The `{:else if}` or `{:else}` branch.
    pub alternate: Option<ElseBranch>,
    /// The span of the block.
    pub span: TextRange,
}

/// The alternate branch of an if block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ElseBranch {
    /// `{:else}`
    Else(Fragment),
    /// `{:else if condition}`
    ElseIf(Box<IfBlock>),
}

/// An `{#each}` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EachBlock {
    /// The iterated expression.
    pub iterable: String,
    /// The item binding.
    pub item: SmolStr,
    /// The index binding.
    pub index: Option<SmolStr>,
    /// The key expression.
    pub key: Option<String>,
    /// The loop body.
    pub body: Fragment,
    /// The span of the block.
    pub span: TextRange,
}

/// A `{#for v = start to end}` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ForBlock {
    /// The counter name.
    pub variable: SmolStr,
    /// First value.
    pub start: i64,
    /// Last value (inclusive).
    pub end: i64,
    /// The loop body.
    pub body: Fragment,
    /// The span of the block.
    pub span: TextRange,
}

/// A `{#while condition}` block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WhileBlock {
    /// The raw condition.
    pub condition: String,
    /// The body.
    pub body: Fragment,
    /// The span of the block.
    pub span: TextRange,
}
