//! Rewrites `$name` references inside opaque code.
//!
//! Expressions, handler bodies and function bodies are never parsed into an
//! AST. Each `$name` reference is classified as a read or a write by looking
//! at the operator that follows (or, for `++`/`--`, precedes) it, and the
//! active strategy decides how the target spells it.

use crate::code::{group, js_string};
use crate::error::TransformErrorKind;
use crate::scope::{Scope, StateKind};
use crate::strategy::CodeGenStrategy;
use component_parser::scan::{
    dollar_references, is_ident_char, is_identifier, CodeScanner, Reference,
};

/// Where the rewritten code ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprContext {
    /// Component script: initializers and function bodies.
    Script,
    /// Template expressions and inline handlers.
    Template,
}

/// The kind of assignment applied to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// `x = v`
    Assign,
    /// `x op= v`, holding the binary operator.
    Compound(&'static str),
    /// `x++` or `++x`
    Increment,
    /// `x--` or `--x`
    Decrement,
}

/// Binary operators with a compound assignment form, longest first.
const COMPOUND_OPERATORS: &[&str] = &["**", "&&", "||", "??", "+", "-", "*", "/", "%"];

impl WriteOp {
    /// The assigned value expressed in terms of the `current` one.
    pub fn next_value(&self, current: &str, value: &str) -> String {
        match self {
            WriteOp::Assign => value.to_string(),
            WriteOp::Compound(op) => format!("{current} {op} {}", group(value)),
            WriteOp::Increment => format!("{current} + 1"),
            WriteOp::Decrement => format!("{current} - 1"),
        }
    }

    /// The write in plain JavaScript syntax against `place`.
    pub fn apply_to(&self, place: &str, value: &str) -> String {
        match self {
            WriteOp::Assign => format!("{place} = {value}"),
            WriteOp::Compound(op) => format!("{place} {op}= {value}"),
            WriteOp::Increment => format!("{place}++"),
            WriteOp::Decrement => format!("{place}--"),
        }
    }
}

/// A write site found in the text.
struct WriteSite {
    /// Start of the rewritten region (the `$` or a prefix `++`/`--`).
    start: usize,
    /// End of the rewritten region.
    end: usize,
    op: WriteOp,
    /// The right-hand side, empty for increments.
    value: (usize, usize),
}

/// Rewrites every `$name` in `text` for the active target.
pub fn rewrite<S>(strategy: &S, scope: &mut Scope<'_>, text: &str, ctx: ExprContext) -> String
where
    S: CodeGenStrategy + ?Sized,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for reference in dollar_references(text) {
        if reference.start < last {
            continue;
        }
        let Some(kind) = scope.kind(reference.name).cloned() else {
            scope.unknown_reference(reference.name);
            out.push_str(&text[last..reference.start]);
            out.push_str(reference.name);
            last = reference.end;
            continue;
        };

        match write_site(text, last, &reference) {
            Some(site) => {
                out.push_str(&text[last..site.start]);
                let (value_start, value_end) = site.value;
                let value = rewrite(strategy, scope, &text[value_start..value_end], ctx);
                let code = write(strategy, scope, reference.name, &kind, site.op, value.trim(), ctx);
                out.push_str(&code);
                last = site.end;
            }
            None => {
                out.push_str(&text[last..reference.start]);
                out.push_str(&strategy.read(reference.name, &kind, ctx));
                last = reference.end;
            }
        }
    }

    out.push_str(&text[last..]);
    out
}

fn write<S>(
    strategy: &S,
    scope: &mut Scope<'_>,
    name: &str,
    kind: &StateKind,
    op: WriteOp,
    value: &str,
    ctx: ExprContext,
) -> String
where
    S: CodeGenStrategy + ?Sized,
{
    match kind {
        StateKind::Computed => {
            scope.error(
                TransformErrorKind::AssignToComputed {
                    name: name.to_string(),
                },
                None,
            );
            // keep the expression well-formed; the write itself is dropped
            match op {
                WriteOp::Increment | WriteOp::Decrement => strategy.read(name, kind, ctx),
                WriteOp::Assign | WriteOp::Compound(_) => format!("({value})"),
            }
        }
        StateKind::Signal { key } => {
            let current = strategy.read(name, kind, ctx);
            format!(
                "signal.set({}, {})",
                js_string(key),
                op.next_value(&current, value)
            )
        }
        StateKind::Reactive => strategy.write(name, op, value, ctx),
        StateKind::Plain | StateKind::Function => {
            op.apply_to(&strategy.read(name, kind, ctx), value)
        }
    }
}

/// Classifies the reference as a write, if it is one.
fn write_site(text: &str, floor: usize, reference: &Reference<'_>) -> Option<WriteSite> {
    let before = &text[floor..reference.start];
    let trimmed = before.trim_end();
    for (prefix, op) in [("++", WriteOp::Increment), ("--", WriteOp::Decrement)] {
        if let Some(head) = trimmed.strip_suffix(prefix) {
            if !head.ends_with(|c: char| is_ident_char(c) || c == ')' || c == ']') {
                return Some(WriteSite {
                    start: floor + head.len(),
                    end: reference.end,
                    op,
                    value: (reference.end, reference.end),
                });
            }
        }
    }

    let rest = &text[reference.end..];
    let after = rest.trim_start();
    let op_start = reference.end + (rest.len() - after.len());

    for (postfix, op) in [("++", WriteOp::Increment), ("--", WriteOp::Decrement)] {
        if after.starts_with(postfix) {
            return Some(WriteSite {
                start: reference.start,
                end: op_start + 2,
                op,
                value: (op_start + 2, op_start + 2),
            });
        }
    }

    let (op, op_len) = assignment_operator(after)?;
    let value_start = op_start + op_len;
    let value_end = expression_end(text, value_start);
    let trimmed_end = value_start + text[value_start..value_end].trim_end().len();
    Some(WriteSite {
        start: reference.start,
        end: trimmed_end,
        op,
        value: (value_start, trimmed_end),
    })
}

/// Recognizes `=` and compound assignment operators, but not `==`, `=>` or comparisons.
fn assignment_operator(text: &str) -> Option<(WriteOp, usize)> {
    for &op in COMPOUND_OPERATORS {
        if let Some(rest) = text.strip_prefix(op) {
            if rest.starts_with('=') && !rest[1..].starts_with('=') {
                return Some((WriteOp::Compound(op), op.len() + 1));
            }
        }
    }
    let rest = text.strip_prefix('=')?;
    if rest.starts_with('=') || rest.starts_with('>') {
        return None;
    }
    Some((WriteOp::Assign, 1))
}

/// Finds where an assigned expression starting at `start` ends.
fn expression_end(text: &str, start: usize) -> usize {
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(text, start) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            ';' | ',' | '\n' if depth == 0 => return i,
            _ => {}
        }
    }
    text.len()
}

/// Returns true if `code` is a function expression rather than a statement.
pub fn is_function_expression(code: &str) -> bool {
    let code = code.trim();
    let code = code
        .strip_prefix("async")
        .filter(|rest| rest.starts_with(|c: char| c.is_whitespace() || c == '('))
        .map(str::trim_start)
        .unwrap_or(code);
    if code.starts_with("function") {
        return true;
    }

    // `x => ...` or `(a, b) => ...` with the arrow at depth zero
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(code, 0) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 && code[i + 1..].starts_with('>') => {
                let head = code[..i].trim();
                return head.starts_with('(') || is_identifier(head);
            }
            _ => {}
        }
    }
    false
}
