//! Framework-free components that render with the DOM API.
//!
//! A component is a function taking its mount target. State lives in the
//! closure; every setter refreshes derived values and re-renders the target.

use super::{function_declaration, handler_function};
use crate::code::{block, indent, js_string};
use crate::expr::{ExprContext, WriteOp};
use crate::naming::{compute_name, setter_name};
use crate::scope::{Scope, StateKind};
use crate::strategy::{
    signal_import, AttributeValue, CodeGenStrategy, ComponentParts, Flow, FunctionCode, Handler,
    VariableCode,
};
use crate::target::Target;
use component_parser::Element;

const ELEMENT_HELPER: &str = r#"function __el(tag, attributes, events, children) {
  if (typeof tag === "function") {
    const host = document.createElement("div");
    tag(host, attributes);
    return host;
  }
  const element = document.createElement(tag);
  for (const [name, value] of Object.entries(attributes)) {
    if (value === false || value == null) continue;
    element.setAttribute(name, value === true ? "" : String(value));
  }
  for (const [type, handler] of Object.entries(events)) {
    element.addEventListener(type, handler);
  }
  element.append(...children.flat(Infinity));
  return element;
}"#;

const TEXT_HELPER: &str = r#"function __text(value) {
  const node = document.createTextNode("");
  node.textContent = value == null ? "" : String(value);
  return node;
}"#;

/// Generates plain DOM components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vanilla;

fn entries(items: &[String]) -> String {
    if items.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", items.join(", "))
    }
}

/// An immediately invoked function returning a node list.
fn nodes_iife(body: &str) -> String {
    format!("(() => {{\n{}\n}})()", indent(body, "  "))
}

fn setter(scope: &Scope<'_>, name: &str) -> String {
    let mut body = format!("{name} = value;");
    for computed in scope.dependents(name) {
        body.push_str(&format!("\n{}();", compute_name(&computed)));
    }
    body.push_str("\n__update();");
    format!(
        "function {}(value) {{\n{}\n}}",
        setter_name(name),
        indent(&body, "  ")
    )
}

impl CodeGenStrategy for Vanilla {
    fn target(&self) -> Target {
        Target::Vanilla
    }

    fn write(&self, name: &str, op: WriteOp, value: &str, _ctx: ExprContext) -> String {
        format!("{}({})", setter_name(name), op.next_value(name, value))
    }

    fn emit_variable(&self, scope: &mut Scope<'_>, variable: &VariableCode<'_>) -> String {
        let name = variable.variable.name.as_str();
        match &variable.kind {
            StateKind::Reactive => {
                format!("let {name} = {};\n{}", variable.init, setter(scope, name))
            }
            StateKind::Computed => {
                let compute = compute_name(name);
                format!(
                    "let {name};\nfunction {compute}() {{\n  {name} = {};\n}}\n{compute}();",
                    variable.init
                )
            }
            StateKind::Signal { key } => {
                let key = js_string(key);
                format!(
                    "let {name} = signal.use({key}, {});\n{}\n__cleanup.push(signal.on({key}, {}));",
                    variable.init,
                    setter(scope, name),
                    setter_name(name)
                )
            }
            StateKind::Plain | StateKind::Function => format!("let {name} = {};", variable.init),
        }
    }

    fn emit_function(&self, _scope: &mut Scope<'_>, function: &FunctionCode<'_>) -> String {
        function_declaration(function)
    }

    fn emit_binding(&self, scope: &mut Scope<'_>, code: &str) -> String {
        scope.require("__text");
        format!("__text({})", code.trim())
    }

    fn emit_event(&self, _scope: &mut Scope<'_>, event_type: &str, handler: &Handler) -> String {
        format!("{}: {}", js_string(event_type), handler_function(handler))
    }

    fn emit_attribute(&self, name: &str, value: &AttributeValue<'_>) -> String {
        let value = match value {
            AttributeValue::Static(None) => "true".to_string(),
            AttributeValue::Static(Some(value)) => js_string(value),
            AttributeValue::Expression(code) => code.trim().to_string(),
        };
        format!("{}: {value}", js_string(name))
    }

    fn emit_element(
        &self,
        scope: &mut Scope<'_>,
        element: &Element,
        attributes: Vec<String>,
        events: Vec<String>,
        children: String,
    ) -> String {
        scope.require("__el");
        let tag = if element.is_component() {
            element.name.to_string()
        } else {
            js_string(&element.name)
        };
        format!(
            "__el({tag}, {}, {}, [{children}])",
            entries(&attributes),
            entries(&events)
        )
    }

    fn emit_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }
        format!("document.createTextNode({})", js_string(text))
    }

    fn emit_comment(&self, text: &str) -> String {
        format!("document.createComment({})", js_string(text))
    }

    fn emit_control_flow(&self, _scope: &mut Scope<'_>, flow: Flow<'_>) -> String {
        match flow {
            Flow::Conditional {
                branches,
                otherwise,
            } => {
                let mut body = String::new();
                for (condition, nodes) in &branches {
                    body.push_str(&format!(
                        "if ({}) {{\n  return [{nodes}];\n}}\n",
                        condition.trim()
                    ));
                }
                body.push_str(&format!("return [{}];", otherwise.unwrap_or_default()));
                nodes_iife(&body)
            }
            Flow::Each {
                iterable,
                item,
                index,
                body,
                ..
            } => {
                let params = match index {
                    Some(index) => format!("{item}, {index}"),
                    None => item.to_string(),
                };
                nodes_iife(&format!(
                    "const __nodes = [];\n({}).forEach(({params}) => {});\nreturn __nodes;",
                    iterable.trim(),
                    block(&format!("__nodes.push([{body}]);"))
                ))
            }
            Flow::Range {
                variable,
                start,
                end,
                body,
            } => nodes_iife(&format!(
                "const __nodes = [];\nfor (let {variable} = {start}; {variable} <= {end}; {variable}++) {}\nreturn __nodes;",
                block(&format!("__nodes.push([{body}]);"))
            )),
        }
    }

    fn join(&self, nodes: Vec<String>) -> String {
        nodes
            .into_iter()
            .filter(|node| !node.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn emit_component_shell(&self, scope: &mut Scope<'_>, parts: ComponentParts) -> String {
        let mut out = String::new();
        let mut header: Vec<String> = Vec::new();
        header.extend(signal_import(scope));
        header.extend(parts.imports);
        for section in [&header, &parts.exports] {
            for line in section.iter() {
                out.push_str(line);
                out.push('\n');
            }
            if !section.is_empty() {
                out.push('\n');
            }
        }
        for (item, helper) in [("__el", ELEMENT_HELPER), ("__text", TEXT_HELPER)] {
            if scope.requires(item) {
                out.push_str(helper);
                out.push_str("\n\n");
            }
        }

        let mut body = String::from("const __cleanup = [];\n");
        for section in &parts.declarations {
            for item in section.iter() {
                body.push_str(item);
                body.push('\n');
            }
        }
        let template = parts.template.trim();
        if template.is_empty() {
            body.push_str("function __render() {\n  return [];\n}\n");
        } else {
            body.push_str(&format!(
                "function __render() {{\n  return [\n{}\n  ];\n}}\n",
                indent(template, "    ")
            ));
        }
        body.push_str(
            "function __update() {\n  target.replaceChildren(...__render().flat(Infinity));\n}\n__update();\nreturn {\n  update: __update,\n  destroy() {\n    __cleanup.forEach((unsubscribe) => unsubscribe());\n    target.replaceChildren();\n  },\n};",
        );

        out.push_str(&format!(
            "export default function {}(target) {{\n{}\n}}\n",
            scope.component_name,
            indent(&body, "  ")
        ));
        out
    }

    fn emit_error_component(&self, component_name: &str, message: &str, filename: &str) -> String {
        format!(
            "export default function {component_name}(target) {{\n  const message = {};\n  const element = document.createElement(\"div\");\n  element.className = \"component-error\";\n  element.dataset.filename = {};\n  const pre = document.createElement(\"pre\");\n  pre.textContent = message;\n  element.append(pre);\n  target.replaceChildren(element);\n  return {{\n    update() {{}},\n    destroy() {{\n      target.replaceChildren();\n    }},\n  }};\n}}\n",
            js_string(message),
            js_string(filename)
        )
    }
}
