//! React function components with hooks and JSX.

use super::{arrow_function, handler_function};
use crate::code::{
    escape_attribute, escape_text, group, indent, js_string, markup_element, range_expression,
};
use crate::expr::{ExprContext, WriteOp};
use crate::naming::setter_name;
use crate::scope::{Scope, StateKind};
use crate::strategy::{
    signal_import, AttributeValue, CodeGenStrategy, ComponentParts, Flow, FunctionCode, Handler,
    VariableCode,
};
use crate::target::Target;
use component_parser::Element;

/// Hooks in the order they are imported.
const HOOKS: &[&str] = &["Fragment", "useCallback", "useEffect", "useMemo", "useState"];

/// Generates React components.
#[derive(Debug, Clone, Copy, Default)]
pub struct React;

/// Maps a DOM event name to its JSX prop.
pub fn event_prop(event_type: &str) -> String {
    let known = match event_type {
        "dblclick" => Some("onDoubleClick"),
        "mousedown" => Some("onMouseDown"),
        "mouseup" => Some("onMouseUp"),
        "mouseenter" => Some("onMouseEnter"),
        "mouseleave" => Some("onMouseLeave"),
        "mousemove" => Some("onMouseMove"),
        "mouseover" => Some("onMouseOver"),
        "mouseout" => Some("onMouseOut"),
        "keydown" => Some("onKeyDown"),
        "keyup" => Some("onKeyUp"),
        "keypress" => Some("onKeyPress"),
        "focusin" => Some("onFocus"),
        "focusout" => Some("onBlur"),
        "contextmenu" => Some("onContextMenu"),
        "pointerdown" => Some("onPointerDown"),
        "pointerup" => Some("onPointerUp"),
        "pointermove" => Some("onPointerMove"),
        "touchstart" => Some("onTouchStart"),
        "touchend" => Some("onTouchEnd"),
        "touchmove" => Some("onTouchMove"),
        "dragstart" => Some("onDragStart"),
        "dragend" => Some("onDragEnd"),
        "dragover" => Some("onDragOver"),
        _ => None,
    };
    match known {
        Some(prop) => prop.to_string(),
        None => format!("on{}", crate::naming::capitalize(event_type)),
    }
}

fn attribute_prop(name: &str) -> &str {
    match name {
        "class" => "className",
        "for" => "htmlFor",
        "tabindex" => "tabIndex",
        "readonly" => "readOnly",
        _ => name,
    }
}

/// Converts an inline CSS declaration list into a JSX style object.
fn style_object(css: &str) -> String {
    let entries: Vec<String> = css
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .map(|(property, value)| {
            let property = property.trim();
            let key = if property.starts_with("--") {
                js_string(property)
            } else {
                css_property(property)
            };
            format!("{key}: {}", js_string(value.trim()))
        })
        .collect();
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    }
}

/// Camel-cases a CSS property. Vendor prefixes are capitalized except `-ms-`.
fn css_property(property: &str) -> String {
    let mut out = String::with_capacity(property.len());
    let mut upper = false;
    for (i, c) in property.chars().enumerate() {
        if c == '-' {
            upper = i > 0 || !property.starts_with("-ms-");
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Escapes text for a JSX child position, where braces open expressions.
fn jsx_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in escape_text(text).chars() {
        match c {
            '{' => out.push_str("{'{'}"),
            '}' => out.push_str("{'}'}"),
            _ => out.push(c),
        }
    }
    out
}

fn fragment(body: &str) -> String {
    format!("(<>{body}</>)")
}

impl CodeGenStrategy for React {
    fn target(&self) -> Target {
        Target::React
    }

    fn write(&self, name: &str, op: WriteOp, value: &str, _ctx: ExprContext) -> String {
        let setter = setter_name(name);
        match op {
            WriteOp::Assign => format!("{setter}({value})"),
            _ => format!("{setter}(prev => {})", op.next_value("prev", value)),
        }
    }

    fn emit_variable(&self, scope: &mut Scope<'_>, variable: &VariableCode<'_>) -> String {
        let name = variable.variable.name.as_str();
        match &variable.kind {
            StateKind::Reactive => {
                scope.require("useState");
                format!(
                    "const [{name}, {}] = useState({});",
                    setter_name(name),
                    variable.init
                )
            }
            StateKind::Computed => {
                scope.require("useMemo");
                let deps = variable.references.join(", ");
                format!("const {name} = useMemo(() => {}, [{deps}]);", variable.init)
            }
            StateKind::Signal { key } => {
                scope.require("useState");
                scope.require("useEffect");
                let key = js_string(key);
                let setter = setter_name(name);
                format!(
                    "const [{name}, {setter}] = useState(() => signal.use({key}, {}));\nuseEffect(() => signal.on({key}, {setter}), []);",
                    variable.init
                )
            }
            StateKind::Plain | StateKind::Function => format!("let {name} = {};", variable.init),
        }
    }

    fn emit_function(&self, scope: &mut Scope<'_>, function: &FunctionCode<'_>) -> String {
        scope.require("useCallback");
        format!(
            "const {} = useCallback({}, [{}]);",
            function.name,
            arrow_function(function),
            function.references.join(", ")
        )
    }

    fn emit_binding(&self, _scope: &mut Scope<'_>, code: &str) -> String {
        format!("{{{}}}", code.trim())
    }

    fn emit_event(&self, _scope: &mut Scope<'_>, event_type: &str, handler: &Handler) -> String {
        format!("{}={{{}}}", event_prop(event_type), handler_function(handler))
    }

    fn emit_attribute(&self, name: &str, value: &AttributeValue<'_>) -> String {
        let name = attribute_prop(name);
        match value {
            AttributeValue::Static(None) => name.to_string(),
            AttributeValue::Static(Some(value)) if name == "style" => {
                format!("style={{{}}}", style_object(value))
            }
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
        let self_close = element.self_closing || (children.is_empty() && element.is_component());
        markup_element(&element.name, &attributes, &children, self_close)
    }

    fn emit_text(&self, text: &str) -> String {
        jsx_text(text)
    }

    fn emit_comment(&self, text: &str) -> String {
        format!("{{/*{}*/}}", text.replace("*/", "* /"))
    }

    fn emit_control_flow(&self, scope: &mut Scope<'_>, flow: Flow<'_>) -> String {
        match flow {
            Flow::Conditional {
                branches,
                otherwise,
            } => {
                if let ([(condition, body)], None) = (branches.as_slice(), &otherwise) {
                    return format!("{{{} && {}}}", group(condition), fragment(body));
                }
                let mut out = String::from("{");
                for (condition, body) in &branches {
                    out.push_str(&format!("{} ? {} : ", group(condition), fragment(body)));
                }
                match otherwise {
                    Some(body) => out.push_str(&fragment(&body)),
                    None => out.push_str("null"),
                }
                out.push('}');
                out
            }
            Flow::Each {
                iterable,
                item,
                index,
                key,
                body,
            } => {
                scope.require("Fragment");
                let index = index.unwrap_or("__index");
                let key = key.unwrap_or_else(|| index.to_string());
                format!(
                    "{{{}.map(({item}, {index}) => (<Fragment key={{{key}}}>{body}</Fragment>))}}",
                    group(&iterable)
                )
            }
            Flow::Range {
                variable,
                start,
                end,
                body,
            } => {
                scope.require("Fragment");
                format!(
                    "{{{}.map(({variable}) => (<Fragment key={{{variable}}}>{body}</Fragment>))}}",
                    range_expression(start, end)
                )
            }
        }
    }

    fn emit_component_shell(&self, scope: &mut Scope<'_>, parts: ComponentParts) -> String {
        let mut header: Vec<String> = Vec::new();
        let hooks: Vec<&str> = HOOKS
            .iter()
            .copied()
            .filter(|hook| scope.requires(hook))
            .collect();
        if !hooks.is_empty() {
            header.push(format!("import {{ {} }} from \"react\";", hooks.join(", ")));
        }
        header.extend(signal_import(scope));
        header.extend(parts.imports);

        let mut out = String::new();
        for line in &header {
            out.push_str(line);
            out.push('\n');
        }
        if !header.is_empty() {
            out.push('\n');
        }
        for export in &parts.exports {
            out.push_str(export);
            out.push('\n');
        }
        if !parts.exports.is_empty() {
            out.push('\n');
        }

        out.push_str(&format!(
            "export default function {}() {{\n",
            scope.component_name
        ));
        for section in &parts.declarations {
            for item in section.iter() {
                out.push_str(&indent(item, "  "));
                out.push('\n');
            }
            if !section.is_empty() {
                out.push('\n');
            }
        }

        let template = parts.template.trim();
        if template.is_empty() {
            out.push_str("  return null;\n");
        } else {
            out.push_str("  return (\n    <>\n");
            out.push_str(&indent(template, "      "));
            out.push_str("\n    </>\n  );\n");
        }
        out.push_str("}\n");
        out
    }

    fn emit_error_component(&self, component_name: &str, message: &str, filename: &str) -> String {
        format!(
            "export default function {component_name}() {{\n  const message = {};\n  return (\n    <div className=\"component-error\" data-filename=\"{}\">\n      <pre>{{message}}</pre>\n    </div>\n  );\n}}\n",
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
    fn test_event_prop() {
        assert_eq!(event_prop("click"), "onClick");
        assert_eq!(event_prop("dblclick"), "onDoubleClick");
        assert_eq!(event_prop("keydown"), "onKeyDown");
        assert_eq!(event_prop("submit"), "onSubmit");
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            React.emit_attribute("class", &AttributeValue::Static(Some("card"))),
            "className=\"card\""
        );
        assert_eq!(
            React.emit_attribute("disabled", &AttributeValue::Expression("busy".to_string())),
            "disabled={busy}"
        );
    }

    #[test]
    fn test_static_style_becomes_object() {
        assert_eq!(
            React.emit_attribute(
                "style",
                &AttributeValue::Static(Some("color: red; font-size: 12px;"))
            ),
            "style={{ color: \"red\", fontSize: \"12px\" }}"
        );
        assert_eq!(
            React.emit_attribute(
                "style",
                &AttributeValue::Static(Some("-webkit-user-select: none; --gap: 4px"))
            ),
            "style={{ WebkitUserSelect: \"none\", \"--gap\": \"4px\" }}"
        );
        assert_eq!(
            React.emit_attribute("style", &AttributeValue::Static(Some(""))),
            "style={{}}"
        );
    }

    #[test]
    fn test_text_braces_are_escaped() {
        assert_eq!(React.emit_text("a } b {"), "a {'}'} b {'{'}");
        assert_eq!(React.emit_text("1 < 2"), "1 &lt; 2");
    }

    #[test]
    fn test_writes() {
        assert_eq!(
            React.write("open", WriteOp::Assign, "!open", ExprContext::Script),
            "setOpen(!open)"
        );
        assert_eq!(
            React.write("total", WriteOp::Compound("*"), "a + b", ExprContext::Template),
            "setTotal(prev => prev * (a + b))"
        );
    }

    #[test]
    fn test_error_component() {
        let code = React.emit_error_component("Card", "parse_error: bad", "card.component");
        insta::assert_snapshot!(code.trim_end(), @r###"
        export default function Card() {
          const message = "parse_error: bad";
          return (
            <div className="component-error" data-filename="card.component">
              <pre>{message}</pre>
            </div>
          );
        }
        "###);
    }
}
