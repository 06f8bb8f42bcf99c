//! Small text helpers shared by the code generators.

/// Quotes `text` as a double-quoted JavaScript string literal.
pub fn js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // keeps the literal safe inside inline <script> blocks
            '<' if chars.peek() == Some(&'/') => out.push_str("<\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Escapes markup-significant characters in text content.
pub fn escape_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Escapes a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}

/// Parenthesizes `expr` unless it is a single operand.
pub fn group(expr: &str) -> String {
    let expr = expr.trim();
    let simple = expr
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '"' | '\''));
    if simple {
        expr.to_string()
    } else {
        format!("({expr})")
    }
}

/// Indents every non-empty line of `text` by `prefix`.
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes the common leading whitespace of every line after the first.
///
/// Block bodies are stored trimmed, so their first line has already lost
/// its indentation while the others keep the source's.
pub fn dedent_tail(text: &str) -> String {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return String::new();
    };
    let rest: Vec<&str> = lines.collect();
    let common = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = first.to_string();
    for line in rest {
        out.push('\n');
        out.push_str(line.get(common..).unwrap_or_else(|| line.trim_start()));
    }
    out
}

/// Renders a `{ ... }` block around statements.
pub fn block(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        "{}".to_string()
    } else if body.contains('\n') {
        format!("{{\n{}\n}}", indent(&dedent_tail(body), "  "))
    } else {
        format!("{{ {body} }}")
    }
}

/// An array holding `start..=end`, or an empty array when `end < start`.
pub fn range_expression(start: i64, end: i64) -> String {
    let length = if end < start {
        0
    } else {
        end.abs_diff(start).saturating_add(1)
    };
    let item = if start == 0 {
        "__i".to_string()
    } else {
        format!("{start} + __i")
    };
    format!("Array.from({{ length: {length} }}, (_, __i) => {item})")
}

/// Renders an element tag with its children.
pub fn markup_element(name: &str, attributes: &[String], children: &str, self_close: bool) -> String {
    let mut out = String::with_capacity(name.len() * 2 + children.len() + 8);
    out.push('<');
    out.push_str(name);
    for attribute in attributes {
        out.push(' ');
        out.push_str(attribute);
    }
    if self_close {
        out.push_str(" />");
        return out;
    }
    out.push('>');
    out.push_str(children);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
    out
}
