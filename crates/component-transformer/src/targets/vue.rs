//! Vue single-file components using `<script setup>`.

use super::{arrow_function, handler_function, is_void_element};
use crate::code::{escape_attribute, indent, js_string, markup_element, range_expression};
use crate::expr::{ExprContext, WriteOp};
use crate::scope::{Scope, StateKind};
use crate::strategy::{
    signal_import, AttributeValue, CodeGenStrategy, ComponentParts, Flow, FunctionCode, Handler,
    VariableCode,
};
use crate::target::Target;
use component_parser::Element;

/// Composition API imports in the order they are listed.
const VUE_IMPORTS: &[&str] = &["computed", "onUnmounted", "ref"];

/// Generates Vue components.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vue;

fn directive(name: &str, code: &str) -> String {
    format!("{name}=\"{}\"", escape_attribute(code.trim()))
}

fn template_block(attribute: String, body: &str) -> String {
    format!("<template {attribute}>{body}</template>")
}

impl CodeGenStrategy for Vue {
    fn target(&self) -> Target {
        Target::Vue
    }

    fn read(&self, name: &str, kind: &StateKind, ctx: ExprContext) -> String {
        match (kind, ctx) {
            (
                StateKind::Reactive | StateKind::Computed | StateKind::Signal { .. },
                ExprContext::Script,
            ) => format!("{name}.value"),
            _ => name.to_string(),
        }
    }

    fn write(&self, name: &str, op: WriteOp, value: &str, ctx: ExprContext) -> String {
        match ctx {
            ExprContext::Script => op.apply_to(&format!("{name}.value"), value),
            // templates unwrap refs
            ExprContext::Template => op.apply_to(name, value),
        }
    }

    fn emit_variable(&self, scope: &mut Scope<'_>, variable: &VariableCode<'_>) -> String {
        let name = variable.variable.name.as_str();
        match &variable.kind {
            StateKind::Reactive => {
                scope.require("ref");
                format!("const {name} = ref({});", variable.init)
            }
            StateKind::Computed => {
                scope.require("computed");
                format!("const {name} = computed(() => {});", variable.init)
            }
            StateKind::Signal { key } => {
                scope.require("ref");
                scope.require("onUnmounted");
                let key = js_string(key);
                format!(
                    "const {name} = ref(signal.use({key}, {init}));\nconst __unsubscribe_{name} = signal.on({key}, (value) => {{\n  {name}.value = value;\n}});\nonUnmounted(__unsubscribe_{name});",
                    init = variable.init
                )
            }
            StateKind::Plain | StateKind::Function => format!("let {name} = {};", variable.init),
        }
    }

    fn emit_function(&self, _scope: &mut Scope<'_>, function: &FunctionCode<'_>) -> String {
        format!("const {} = {};", function.name, arrow_function(function))
    }

    fn emit_binding(&self, _scope: &mut Scope<'_>, code: &str) -> String {
        format!("{{{{ {} }}}}", code.trim())
    }

    fn emit_event(&self, _scope: &mut Scope<'_>, event_type: &str, handler: &Handler) -> String {
        let code = match handler {
            Handler::Function(name) => name.to_string(),
            // Vue runs inline statements as the handler body
            Handler::Inline {
                code,
                is_function: false,
            } => code.trim().to_string(),
            Handler::Inline { .. } => handler_function(handler),
        };
        directive(&format!("@{event_type}"), &code)
    }

    fn emit_attribute(&self, name: &str, value: &AttributeValue<'_>) -> String {
        match value {
            AttributeValue::Static(None) => name.to_string(),
            AttributeValue::Static(Some(value)) => {
                format!("{name}=\"{}\"", escape_attribute(value))
            }
            AttributeValue::Expression(code) => directive(&format!(":{name}"), code),
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
        let self_close = element.self_closing
            && (element.is_component() || is_void_element(&element.name));
        markup_element(&element.name, &attributes, &children, self_close)
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
                    let name = if i == 0 { "v-if" } else { "v-else-if" };
                    out.push_str(&template_block(directive(name, condition), body));
                }
                if let Some(body) = otherwise {
                    out.push_str(&template_block("v-else".to_string(), &body));
                }
                out
            }
            Flow::Each {
                iterable,
                item,
                index,
                key,
                body,
            } => {
                let index = index.unwrap_or("__index");
                let key = key.unwrap_or_else(|| index.to_string());
                let attributes = format!(
                    "{} {}",
                    directive("v-for", &format!("({item}, {index}) in {}", iterable.trim())),
                    directive(":key", &key)
                );
                template_block(attributes, &body)
            }
            Flow::Range {
                variable,
                start,
                end,
                body,
            } => {
                let attributes = format!(
                    "{} {}",
                    directive(
                        "v-for",
                        &format!("{variable} in {}", range_expression(start, end))
                    ),
                    directive(":key", variable)
                );
                template_block(attributes, &body)
            }
        }
    }

    fn emit_component_shell(&self, scope: &mut Scope<'_>, parts: ComponentParts) -> String {
        let mut out = String::new();
        if !parts.exports.is_empty() {
            out.push_str("<script>\n");
            for export in &parts.exports {
                out.push_str(export);
                out.push('\n');
            }
            out.push_str("</script>\n\n");
        }

        let mut header: Vec<String> = Vec::new();
        let used: Vec<&str> = VUE_IMPORTS
            .iter()
            .copied()
            .filter(|item| scope.requires(item))
            .collect();
        if !used.is_empty() {
            header.push(format!("import {{ {} }} from \"vue\";", used.join(", ")));
        }
        header.extend(signal_import(scope));
        header.extend(parts.imports);

        out.push_str("<script setup>\n");
        for line in &header {
            out.push_str(line);
            out.push('\n');
        }
        if !header.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!(
            "defineOptions({{ name: {} }});\n",
            js_string(&scope.component_name)
        ));
        for section in &parts.declarations {
            if !section.is_empty() {
                out.push('\n');
            }
            for item in section.iter() {
                out.push_str(item);
                out.push('\n');
            }
        }
        out.push_str("</script>\n\n<template>\n");
        let template = parts.template.trim();
        if !template.is_empty() {
            out.push_str(&indent(template, "  "));
            out.push('\n');
        }
        out.push_str("</template>\n");
        out
    }

    fn emit_error_component(&self, component_name: &str, message: &str, filename: &str) -> String {
        format!(
            "<script setup>\ndefineOptions({{ name: {} }});\n\nconst message = {};\n</script>\n\n<template>\n  <div class=\"component-error\" data-filename=\"{}\">\n    <pre>{{{{ message }}}}</pre>\n  </div>\n</template>\n",
            js_string(component_name),
            js_string(message),
            escape_attribute(filename)
        )
    }
}
