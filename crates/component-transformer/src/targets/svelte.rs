//! Svelte components.

use super::{function_declaration, handler_function};
use crate::code::{escape_attribute, indent, js_string, markup_element, range_expression};
use crate::expr::{ExprContext, WriteOp};
use crate::scope::{Scope, StateKind};
use crate::strategy::{
    signal_import, AttributeValue, CodeGenStrategy, ComponentParts, Flow, FunctionCode, Handler,
    VariableCode,
};
use crate::target::Target;
use component_parser::Element;

/// Generates Svelte components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svelte;

impl CodeGenStrategy for Svelte {
    fn target(&self) -> Target {
        Target::Svelte
    }

    fn write(&self, name: &str, op: WriteOp, value: &str, _ctx: ExprContext) -> String {
        op.apply_to(name, value)
    }

    fn emit_variable(&self, scope: &mut Scope<'_>, variable: &VariableCode<'_>) -> String {
        let name = variable.variable.name.as_str();
        match &variable.kind {
            StateKind::Computed => format!("$: {name} = {};", variable.init),
            StateKind::Signal { key } => {
                scope.require("onDestroy");
                let key = js_string(key);
                format!(
                    "let {name} = signal.use({key}, {init});\nconst __unsubscribe_{name} = signal.on({key}, (value) => {{\n  {name} = value;\n}});\nonDestroy(__unsubscribe_{name});",
                    init = variable.init
                )
            }
            StateKind::Reactive | StateKind::Plain | StateKind::Function => {
                format!("let {name} = {};", variable.init)
            }
        }
    }

    fn emit_function(&self, _scope: &mut Scope<'_>, function: &FunctionCode<'_>) -> String {
        function_declaration(function)
    }

    fn emit_binding(&self, _scope: &mut Scope<'_>, code: &str) -> String {
        format!("{{{}}}", code.trim())
    }

    fn emit_event(&self, _scope: &mut Scope<'_>, event_type: &str, handler: &Handler) -> String {
        format!("on:{event_type}={{{}}}", handler_function(handler))
    }

    fn emit_attribute(&self, name: &str, value: &AttributeValue<'_>) -> String {
        match value {
            AttributeValue::Static(None) => name.to_string(),
            AttributeValue::Static(Some(value)) => {
                format!("{name}=\"{}\"", escape_attribute(value))
            }
            AttributeValue::Expression(code) => format!("{name}={{{}}}", code.trim()),
        }
    }

    fn emit_element(
        &self,
        _scope: &mut Scope<'_>,
        element: &Element,
        mut attributes: Vec<String>,
        events: Vec<String>,
        children: String,
    ) -> String {
        attributes.extend(events);
        markup_element(&element.name, &attributes, &children, element.self_closing)
    }

    fn emit_text(&self, text: &str) -> String {
        crate::code::escape_text(text)
    }

    fn emit_comment(&self, text: &str) -> String {
        format!("<!--{text}-->")
    }

    fn emit_control_flow(&self, _scope: &mut Scope<'_>, flow: Flow<'_>) -> String {
        match flow {
            Flow::Conditional {
                branches,
                otherwise,
            } => {
                let mut out = String::new();
                for (i, (condition, body)) in branches.iter().enumerate() {
                    let tag = if i == 0 { "#if" } else { ":else if" };
                    out.push_str(&format!("{{{tag} {}}}{body}", condition.trim()));
                }
                if let Some(body) = otherwise {
                    out.push_str("{:else}");
                    out.push_str(&body);
                }
                out.push_str("{/if}");
                out
            }
            Flow::Each {
                iterable,
                item,
                index,
                key,
                body,
            } => {
                let mut head = format!("{{#each {} as {item}", iterable.trim());
                if let Some(index) = index {
                    head.push_str(&format!(", {index}"));
                }
                if let Some(key) = key {
                    head.push_str(&format!(" ({})", key.trim()));
                }
                format!("{head}}}{body}{{/each}}")
            }
            Flow::Range {
                variable,
                start,
                end,
                body,
            } => format!(
                "{{#each {} as {variable} ({variable})}}{body}{{/each}}",
                range_expression(start, end)
            ),
        }
    }

    fn emit_component_shell(&self, scope: &mut Scope<'_>, parts: ComponentParts) -> String {
        let mut out = String::new();
        if !parts.exports.is_empty() {
            out.push_str("<script context=\"module\">\n");
            for export in &parts.exports {
                out.push_str(&indent(export, "  "));
                out.push('\n');
            }
            out.push_str("</script>\n\n");
        }

        let mut header: Vec<String> = Vec::new();
        if scope.requires("onDestroy") {
            header.push("import { onDestroy } from \"svelte\";".to_string());
        }
        header.extend(signal_import(scope));
        header.extend(parts.imports);

        let mut sections = vec![header];
        sections.extend(parts.declarations);
        if sections.iter().any(|section| !section.is_empty()) {
            out.push_str("<script>\n");
            let mut first = true;
            for section in sections.iter().filter(|section| !section.is_empty()) {
                if !first {
                    out.push('\n');
                }
                first = false;
                for item in section {
                    out.push_str(&indent(item, "  "));
                    out.push('\n');
                }
            }
            out.push_str("</script>\n\n");
        }

        let template = parts.template.trim();
        if !template.is_empty() {
            out.push_str(template);
            out.push('\n');
        }
        out
    }

    fn emit_error_component(&self, _component_name: &str, message: &str, filename: &str) -> String {
        format!(
            "<script>\n  const message = {};\n</script>\n\n<div class=\"component-error\" data-filename=\"{}\">\n  <pre>{{message}}</pre>\n</div>\n",
            js_string(message),
            escape_attribute(filename)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_each_head() {
        let flow = Flow::Each {
            iterable: "todos".to_string(),
            item: "todo",
            index: Some("i"),
            key: Some("todo.id".to_string()),
            body: "<li>{todo.text}</li>".to_string(),
        };
        let parsed = component_parser::parse("");
        let options = crate::TransformOptions::default();
        let mut scope = Scope::new(&parsed, &options, "C".to_string(), None);
        assert_eq!(
            Svelte.emit_control_flow(&mut scope, flow),
            "{#each todos as todo, i (todo.id)}<li>{todo.text}</li>{/each}"
        );
    }

    #[test]
    fn test_conditional_chain() {
        let flow = Flow::Conditional {
            branches: vec![
                ("a".to_string(), "A".to_string()),
                ("b".to_string(), "B".to_string()),
            ],
            otherwise: Some("C".to_string()),
        };
        let parsed = component_parser::parse("");
        let options = crate::TransformOptions::default();
        let mut scope = Scope::new(&parsed, &options, "C".to_string(), None);
        assert_eq!(
            Svelte.emit_control_flow(&mut scope, flow),
            "{#if a}A{:else if b}B{:else}C{/if}"
        );
    }

    #[test]
    fn test_events() {
        let parsed = component_parser::parse("");
        let options = crate::TransformOptions::default();
        let mut scope = Scope::new(&parsed, &options, "C".to_string(), None);
        let inline = Handler::Inline {
            code: "count += 1".to_string(),
            is_function: false,
        };
        assert_eq!(
            Svelte.emit_event(&mut scope, "click", &inline),
            "on:click={() => { count += 1 }}"
        );
    }
}
