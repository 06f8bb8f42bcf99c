//! The transform driver: one walk over a parsed component per target.

use crate::error::{SemanticWarningKind, TransformErrorKind};
use crate::expr::{is_function_expression, rewrite, ExprContext};
use crate::naming::component_name;
use crate::scope::{Scope, StateKind};
use crate::strategy::{
    params_js, AttributeValue, CodeGenStrategy, ComponentParts, Flow, FunctionCode, Handler,
    VariableCode,
};
use crate::target::Target;
use crate::targets::{strategy_for, Vanilla};
use component_parser::scan::dollar_ident;
use component_parser::{
    parse_with_options, Attribute, Diagnostic, DiagnosticKind, EachBlock, Element, ElseBranch,
    ExportKind, ForBlock, Function, IfBlock, ParseError, ParseOptions, ParseResult, TemplateNode,
    ValueLiteral, Variable, WhileBlock,
};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, debug_span, warn};

/// Module the generated code imports the signal store from.
pub const DEFAULT_SIGNAL_MODULE: &str = "@components/signal";

/// Filename reported when none is given.
const ANONYMOUS: &str = "<anonymous>";

/// Options for transformation.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// The filename of the source file.
    pub filename: Option<String>,
    /// Overrides the generated component name.
    pub component_name: Option<String>,
    /// Module path of the signal store runtime.
    pub signal_module: String,
    /// Report semantic warnings as transform errors.
    pub strict: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            filename: None,
            component_name: None,
            signal_module: DEFAULT_SIGNAL_MODULE.to_string(),
            strict: false,
        }
    }
}

impl TransformOptions {
    /// Sets the filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the component name.
    pub fn with_component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = Some(name.into());
        self
    }

    /// Sets the signal store module.
    pub fn with_signal_module(mut self, module: impl Into<String>) -> Self {
        self.signal_module = module.into();
        self
    }

    /// Enables or disables strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn parse_options(&self) -> ParseOptions {
        match &self.filename {
            Some(filename) => ParseOptions::default().with_filename(filename.clone()),
            None => ParseOptions::default(),
        }
    }
}

/// The result of transformation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransformResult {
    /// The generated component source.
    pub code: String,
    /// Parse and transform errors.
    pub errors: Vec<Diagnostic>,
    /// Semantic warnings.
    pub warnings: Vec<Diagnostic>,
    /// The parsed component.
    pub parsed: ParseResult,
    /// The target the code was generated for.
    pub target: Target,
    /// The generated component's name.
    pub component_name: String,
}

impl TransformResult {
    /// Returns true if no errors were reported.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses `source` and generates a component for `target`.
pub fn transform(source: &str, target: Target, options: TransformOptions) -> TransformResult {
    let parsed = parse_with_options(source, options.parse_options());
    generate(parsed, target, &options, Some(source))
}

/// Like [`transform`], with the target given by id.
///
/// An unknown id yields a vanilla error component and a transform error.
pub fn transform_named(source: &str, target: &str, options: TransformOptions) -> TransformResult {
    let error = match target.parse::<Target>() {
        Ok(target) => return transform(source, target, options),
        Err(error) => error,
    };

    warn!(requested = target, "unknown target, emitting error component");
    let parsed = parse_with_options(source, options.parse_options());
    let name = component_name(&options, Some(&parsed));
    let filename = options.filename.as_deref().unwrap_or(ANONYMOUS);
    let code = Vanilla.emit_error_component(&name, &error.to_string(), filename);
    let mut errors: Vec<Diagnostic> = parsed.errors.iter().map(ParseError::to_diagnostic).collect();
    errors.push(error.to_diagnostic(None));
    TransformResult {
        code,
        errors,
        warnings: Vec::new(),
        parsed,
        target: Target::Vanilla,
        component_name: name,
    }
}

/// Generates a component from an already parsed source.
///
/// Diagnostics carry no line numbers beyond those the parser recorded.
pub fn transform_parsed(
    parsed: ParseResult,
    target: Target,
    options: &TransformOptions,
) -> TransformResult {
    generate(parsed, target, options, None)
}

fn generate(
    parsed: ParseResult,
    target: Target,
    options: &TransformOptions,
    source: Option<&str>,
) -> TransformResult {
    let filename = options.filename.as_deref().unwrap_or(ANONYMOUS);
    let span = debug_span!("transform", %target, filename);
    let _guard = span.enter();

    let strategy = strategy_for(target);
    let name = component_name(options, Some(&parsed));
    let mut errors: Vec<Diagnostic> = parsed.errors.iter().map(ParseError::to_diagnostic).collect();

    if parsed.has_blocking_errors() {
        let blocking: Vec<String> = parsed
            .errors
            .iter()
            .filter(|error| error.is_blocking())
            .map(|error| error.to_diagnostic().to_string())
            .collect();
        warn!(
            count = blocking.len(),
            "blocking parse errors, emitting error component"
        );
        let code = strategy.emit_error_component(&name, &blocking.join("\n"), filename);
        errors.push(
            TransformErrorKind::BlockingParseErrors {
                count: blocking.len(),
            }
            .to_diagnostic(None),
        );
        return TransformResult {
            code,
            errors,
            warnings: Vec::new(),
            parsed,
            target,
            component_name: name,
        };
    }

    let (code, transform_errors, mut warnings) = {
        let mut scope = Scope::new(&parsed, options, name.clone(), source);
        let code = Generator {
            strategy,
            scope: &mut scope,
        }
        .component();
        (code, scope.errors, scope.warnings)
    };
    errors.extend(transform_errors);

    if options.strict {
        for mut warning in warnings.drain(..) {
            warning.kind = DiagnosticKind::TransformError;
            errors.push(warning);
        }
    }

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "generated component"
    );
    TransformResult {
        code,
        errors,
        warnings,
        parsed,
        target,
        component_name: name,
    }
}

/// The source of a variable's initial value. Signals start from their store default.
fn initializer(variable: &Variable) -> String {
    match &variable.value {
        ValueLiteral::Signal { initial, .. } => initial.to_js(),
        value => value.to_js(),
    }
}

/// A script-level declaration.
#[derive(Debug, Clone, Copy)]
enum Declaration<'p> {
    Variable(&'p Variable),
    Function(&'p Function),
}

impl<'p> Declaration<'p> {
    fn name(self) -> &'p SmolStr {
        match self {
            Declaration::Variable(variable) => &variable.name,
            Declaration::Function(function) => &function.name,
        }
    }

    fn is_function(self) -> bool {
        matches!(self, Declaration::Function(_))
    }
}

/// Orders declarations so each one follows every declared name it reads.
///
/// The base order is plain and reactive variables, then computed variables,
/// then functions. A declaration only moves to wait for its reads. When a
/// cycle leaves nothing ready, a function goes first: its body runs later,
/// while initializers run at declaration.
fn declaration_order<'p>(scope: &Scope<'p>) -> Vec<Declaration<'p>> {
    let parsed = scope.parsed;
    let variables = parsed
        .variables
        .values()
        .filter(|variable| !variable.computed)
        .chain(
            scope
                .computed_order()
                .iter()
                .filter_map(move |name| parsed.variables.get(name)),
        )
        .map(Declaration::Variable);
    let functions = parsed.functions.values().map(Declaration::Function);

    let mut pending: Vec<(Declaration<'p>, Vec<SmolStr>)> = variables
        .chain(functions)
        .map(|declaration| {
            let reads = match declaration {
                Declaration::Variable(variable) => scope.references(&initializer(variable)),
                Declaration::Function(function) => scope.references(&format!(
                    "{} {}",
                    params_js(&function.params),
                    function.body
                )),
            };
            (declaration, reads)
        })
        .collect();

    let mut declared: FxHashSet<&SmolStr> = FxHashSet::default();
    let mut ordered = Vec::with_capacity(pending.len());
    while !pending.is_empty() {
        let next = pending
            .iter()
            .position(|(declaration, reads)| {
                reads
                    .iter()
                    .all(|name| name == declaration.name() || declared.contains(name))
            })
            .or_else(|| pending.iter().position(|(declaration, _)| declaration.is_function()))
            .unwrap_or(0);
        let (declaration, _) = pending.remove(next);
        declared.insert(declaration.name());
        ordered.push(declaration);
    }
    ordered
}

/// Walks one parsed component, handing each construct to the strategy.
struct Generator<'g, 'a> {
    strategy: &'static dyn CodeGenStrategy,
    scope: &'g mut Scope<'a>,
}

impl<'g, 'a> Generator<'g, 'a> {
    fn component(mut self) -> String {
        let parsed = self.scope.parsed;

        let imports = parsed
            .imports
            .iter()
            .filter(|import| !import.type_only)
            .map(ToString::to_string)
            .collect();
        // the default export is replaced by the generated component
        let exports = parsed
            .exports
            .iter()
            .filter(|export| export.kind == ExportKind::Named)
            .map(ToString::to_string)
            .collect();

        let mut declared: FxHashSet<SmolStr> = FxHashSet::default();
        let mut declarations: Vec<Vec<String>> = Vec::new();
        let mut previous = None;
        for declaration in declaration_order(self.scope) {
            let visible = |names: Vec<SmolStr>| -> Vec<SmolStr> {
                names
                    .into_iter()
                    .filter(|name| declared.contains(name))
                    .collect()
            };
            let (name, code) = match declaration {
                Declaration::Variable(variable) => {
                    let references = visible(self.scope.references(&initializer(variable)));
                    (&variable.name, self.variable(variable, references))
                }
                Declaration::Function(function) => {
                    let references = visible(self.scope.references(&function.body));
                    (&function.name, self.function(function, references))
                }
            };
            declared.insert(name.clone());

            let sort = declaration.is_function();
            match declarations.last_mut() {
                Some(section) if previous == Some(sort) => section.push(code),
                _ => declarations.push(vec![code]),
            }
            previous = Some(sort);
        }

        let template = self.nodes(&parsed.fragment.nodes);
        let parts = ComponentParts {
            imports,
            exports,
            declarations,
            template,
        };
        self.strategy.emit_component_shell(self.scope, parts)
    }

    fn rewrite(&mut self, text: &str, ctx: ExprContext) -> String {
        rewrite(self.strategy, self.scope, text, ctx)
    }

    fn variable(&mut self, variable: &Variable, references: Vec<SmolStr>) -> String {
        let kind = self
            .scope
            .kind(&variable.name)
            .cloned()
            .unwrap_or(StateKind::Plain);
        let init = self.rewrite(&initializer(variable), ExprContext::Script);
        let code = VariableCode {
            variable,
            kind,
            init,
            references,
        };
        self.strategy.emit_variable(self.scope, &code)
    }

    fn function(&mut self, function: &Function, references: Vec<SmolStr>) -> String {
        let params = self.rewrite(&params_js(&function.params), ExprContext::Script);
        let body = self.rewrite(&function.body, ExprContext::Script);
        let code = FunctionCode {
            name: &function.name,
            is_async: function.is_async,
            params,
            body,
            block_body: function.block_body,
            references,
        };
        self.strategy.emit_function(self.scope, &code)
    }

    fn nodes(&mut self, nodes: &[TemplateNode]) -> String {
        let mut rendered = Vec::with_capacity(nodes.len());
        for node in nodes {
            rendered.push(self.node(node));
        }
        self.strategy.join(rendered)
    }

    fn node(&mut self, node: &TemplateNode) -> String {
        match node {
            TemplateNode::Element(element) => self.element(element),
            TemplateNode::Text(text) => self.strategy.emit_text(&text.data),
            TemplateNode::Comment(comment) => self.strategy.emit_comment(&comment.data),
            TemplateNode::Interpolation(interpolation) => {
                let code = self.rewrite(&interpolation.expression, ExprContext::Template);
                self.strategy.emit_binding(self.scope, &code)
            }
            TemplateNode::IfBlock(block) => self.if_block(block),
            TemplateNode::EachBlock(block) => self.each_block(block),
            TemplateNode::ForBlock(block) => self.for_block(block),
            TemplateNode::WhileBlock(block) => self.while_block(block),
        }
    }

    fn element(&mut self, element: &Element) -> String {
        let mut attributes = Vec::new();
        let mut events = Vec::new();
        for attribute in &element.attributes {
            match attribute {
                Attribute::Static { name, value } => {
                    let value = AttributeValue::Static(value.as_deref());
                    attributes.push(self.strategy.emit_attribute(name, &value));
                }
                Attribute::Expression { name, expression } => {
                    let code = self.rewrite(expression, ExprContext::Template);
                    let value = AttributeValue::Expression(code);
                    attributes.push(self.strategy.emit_attribute(name, &value));
                }
                Attribute::Event {
                    event_type,
                    handler,
                    ..
                } => {
                    let handler = self.handler(handler);
                    events.push(self.strategy.emit_event(self.scope, event_type, &handler));
                }
            }
        }
        let children = self.nodes(&element.children);
        self.strategy
            .emit_element(self.scope, element, attributes, events, children)
    }

    fn handler(&mut self, raw: &str) -> Handler {
        if let Some(name) = dollar_ident(raw) {
            if self.scope.kind(name) == Some(&StateKind::Function) {
                return Handler::Function(SmolStr::new(name));
            }
        }
        let code = self.rewrite(raw.trim(), ExprContext::Template);
        let is_function = is_function_expression(&code);
        Handler::Inline { code, is_function }
    }

    fn if_block(&mut self, block: &IfBlock) -> String {
        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut current = Some(block);
        while let Some(block) = current.take() {
            let condition = self.rewrite(&block.condition, ExprContext::Template);
            let body = self.nodes(&block.consequent.nodes);
            branches.push((condition, body));
            match &block.alternate {
                Some(ElseBranch::ElseIf(next)) => current = Some(&**next),
                Some(ElseBranch::Else(fragment)) => otherwise = Some(self.nodes(&fragment.nodes)),
                None => {}
            }
        }
        let flow = Flow::Conditional {
            branches,
            otherwise,
        };
        self.strategy.emit_control_flow(self.scope, flow)
    }

    fn each_block(&mut self, block: &EachBlock) -> String {
        let iterable = self.rewrite(&block.iterable, ExprContext::Template);
        let key = block
            .key
            .as_deref()
            .map(|key| self.rewrite(key, ExprContext::Template));
        let body = self.nodes(&block.body.nodes);
        let flow = Flow::Each {
            iterable,
            item: &block.item,
            index: block.index.as_deref(),
            key,
            body,
        };
        self.strategy.emit_control_flow(self.scope, flow)
    }

    fn for_block(&mut self, block: &ForBlock) -> String {
        let body = self.nodes(&block.body.nodes);
        let flow = Flow::Range {
            variable: &block.variable,
            start: block.start,
            end: block.end,
            body,
        };
        self.strategy.emit_control_flow(self.scope, flow)
    }

    /// Lowers `{#while}` to a guard: a template renders once per update, so
    /// the body appears at most once while the condition holds.
    fn while_block(&mut self, block: &WhileBlock) -> String {
        self.scope.warn(
            SemanticWarningKind::WhileLowered {
                condition: block.condition.trim().to_string(),
            },
            Some(block.span),
        );
        let condition = self.rewrite(&block.condition, ExprContext::Template);
        let body = self.nodes(&block.body.nodes);
        let flow = Flow::Conditional {
            branches: vec![(condition, body)],
            otherwise: None,
        };
        self.strategy.emit_control_flow(self.scope, flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let options = TransformOptions::default();
        assert_eq!(options.signal_module, DEFAULT_SIGNAL_MODULE);
        assert!(!options.strict);
        assert!(options.filename.is_none());
    }

    #[test]
    fn test_handler_classification() {
        let parsed = component_parser::parse("$count! = 0\n$inc = () => $count++");
        let options = TransformOptions::default();
        let mut scope = Scope::new(&parsed, &options, "C".to_string(), None);
        let mut generator = Generator {
            strategy: strategy_for(Target::Svelte),
            scope: &mut scope,
        };
        assert_eq!(
            generator.handler("$inc"),
            Handler::Function(SmolStr::new("inc"))
        );
        assert_eq!(
            generator.handler("$count++"),
            Handler::Inline {
                code: "count++".to_string(),
                is_function: false,
            }
        );
        assert_eq!(
            generator.handler("(e) => $count = e.detail"),
            Handler::Inline {
                code: "(e) => count = e.detail".to_string(),
                is_function: true,
            }
        );
    }

    #[test]
    fn test_declaration_order_waits_for_reads() {
        let parsed = component_parser::parse("$a = () => $b()\n$seed! = $a()\n$b = () => 1");
        let options = TransformOptions::default();
        let scope = Scope::new(&parsed, &options, "C".to_string(), None);
        let names: Vec<&str> = declaration_order(&scope)
            .into_iter()
            .map(|declaration| declaration.name().as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "seed"]);
    }

    #[test]
    fn test_while_lowering_warns_with_line() {
        let source = "$busy! = true\n<template>\n{#while $busy}<p>working</p>{/while}\n</template>";
        let result = transform(source, Target::Svelte, TransformOptions::default());
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].line, Some(3));
        assert!(result.code.contains("{#if busy}<p>working</p>{/if}"));
    }

    #[test]
    fn test_strict_mode_promotes_warnings() {
        let source = "<template><p>{$ghost}</p></template>";
        let result = transform(
            source,
            Target::React,
            TransformOptions::default().with_strict(true),
        );
        assert!(result.warnings.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, DiagnosticKind::TransformError);
        assert!(result.code.contains("{ghost}"));
    }
}
