//! Recursive descent parser for the `<template>` region.
//!
//! The parser walks raw source between the template tags and keeps an
//! explicit stack of open elements and blocks. A closer is consumed only
//! when it matches the innermost open construct; a closer that belongs to an
//! outer construct makes the inner ones report themselves unclosed and
//! return without consuming it, so an inner block can never close an outer
//! one.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::scan::{
    dollar_ident, find_assignment, find_closing, find_keyword, find_top_level_char,
    is_identifier, split_top_level,
};
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

/// HTML void elements that never have closing tags.
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// DOM events recognized as bare attribute names (`click={...}`).
const DOM_EVENTS: &[&str] = &[
    "click",
    "dblclick",
    "contextmenu",
    "mousedown",
    "mouseup",
    "mousemove",
    "mouseenter",
    "mouseleave",
    "mouseover",
    "mouseout",
    "pointerdown",
    "pointerup",
    "pointermove",
    "wheel",
    "touchstart",
    "touchend",
    "touchmove",
    "keydown",
    "keyup",
    "keypress",
    "input",
    "change",
    "submit",
    "reset",
    "focus",
    "blur",
    "focusin",
    "focusout",
    "scroll",
    "resize",
    "load",
    "drag",
    "dragstart",
    "dragend",
    "dragover",
    "drop",
    "copy",
    "cut",
    "paste",
    "animationend",
    "transitionend",
];

fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':')
}

/// Returns the DOM event an attribute name wires, if any.
///
/// Accepts `click`, `on:click`, `onclick` and `@click`.
pub fn event_name(attribute: &str) -> Option<&str> {
    if let Some(rest) = attribute
        .strip_prefix("on:")
        .or_else(|| attribute.strip_prefix('@'))
    {
        let event = rest.split('|').next().unwrap_or(rest);
        return (!event.is_empty()).then_some(event);
    }
    if DOM_EVENTS.contains(&attribute) {
        return Some(attribute);
    }
    attribute
        .strip_prefix("on")
        .filter(|rest| DOM_EVENTS.contains(rest))
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

/// A construct waiting for its closer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Open {
    Element(SmolStr),
    Block(SmolStr),
}

/// Why a run of nodes ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stop {
    /// The region ran out.
    Eof,
    /// A closer for an outer construct. Not consumed.
    Outer,
    /// The innermost element's closing tag. Consumed.
    CloseTag,
    /// The innermost block's `{/kind}`. Consumed.
    Close,
    /// `{:else}` of the innermost if block. Consumed.
    Else,
    /// `{:else if condition}` of the innermost if block. Consumed.
    ElseIf(String),
}

/// How a closer relates to the stack of open constructs.
enum Closer {
    Innermost,
    Outer,
    Stray,
}

/// Parses the markup between `start` and `end` of `source`.
pub(crate) struct TemplateParser<'src> {
    source: &'src str,
    pos: usize,
    end: usize,
    open: Vec<Open>,
    max_depth: usize,
    aborted: bool,
    errors: Vec<ParseError>,
}

impl<'src> TemplateParser<'src> {
    /// Creates a parser for the region `start..end`.
    pub(crate) fn new(source: &'src str, start: usize, end: usize, max_depth: usize) -> Self {
        let end = end.min(source.len());
        Self {
            source,
            pos: start.min(end),
            end,
            open: Vec::new(),
            max_depth,
            aborted: false,
            errors: Vec::new(),
        }
    }

    /// Parses the whole region.
    pub(crate) fn parse(mut self) -> (Fragment, Vec<ParseError>) {
        let start = self.pos;
        // Nothing is open at the top level, so every closer is stray and parse_nodes only stops at the end.
        let (nodes, _, end) = self.parse_nodes();
        let fragment = Fragment {
            nodes,
            span: range(start, end),
        };
        (fragment, self.errors)
    }

    // === Source helpers ===

    fn bounded(&self) -> &'src str {
        &self.source[..self.end]
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..self.end]
    }

    fn at(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn bump(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
        }
    }

    fn read_while(&mut self, f: impl Fn(char) -> bool) -> &'src str {
        let start = self.pos;
        let rest = self.rest();
        let len = rest.find(|c: char| !f(c)).unwrap_or(rest.len());
        self.pos += len;
        &self.source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    /// Returns true at `<tag`, `</tag` or `<!--`.
    fn at_markup(&self) -> bool {
        let mut chars = self.rest().chars();
        if chars.next() != Some('<') {
            return false;
        }
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => true,
            Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
            Some('!') => self.at("<!--"),
            _ => false,
        }
    }

    /// Reads a `{x...}` marker, returning its trimmed inner text and the offset past `}`.
    fn read_marker(&self) -> Option<(&'src str, usize)> {
        let close = find_closing(self.bounded(), self.pos + 1, '}')?;
        Some((self.source[self.pos + 2..close].trim(), close + 1))
    }

    // === Error helpers ===

    fn error(&mut self, kind: ParseErrorKind, start: usize, end: usize) {
        self.errors.push(ParseError::new(kind, range(start, end)));
    }

    fn error_with(&mut self, kind: ParseErrorKind, start: usize, end: usize, suggestion: String) {
        self.errors
            .push(ParseError::new(kind, range(start, end)).with_suggestion(suggestion));
    }

    fn unclosed_block(&mut self, kind: &str, start: usize) {
        if self.aborted {
            return;
        }
        self.error_with(
            ParseErrorKind::UnclosedBlock {
                block_type: kind.to_string(),
            },
            start,
            start + kind.len() + 2,
            format!("add {{/{kind}}} to close the block"),
        );
    }

    fn unclosed_tag(&mut self, name: &str, start: usize) {
        if self.aborted {
            return;
        }
        self.error_with(
            ParseErrorKind::UnclosedTag {
                tag_name: name.to_string(),
            },
            start,
            start + name.len() + 1,
            format!("add </{name}> or write <{name} />"),
        );
    }

    fn invalid_block(&mut self, message: impl Into<String>, start: usize, end: usize) {
        self.error(
            ParseErrorKind::InvalidBlockSyntax {
                message: message.into(),
            },
            start,
            end,
        );
    }

    // === Open construct stack ===

    fn enter(&mut self, open: Open, start: usize) -> bool {
        if self.open.len() >= self.max_depth {
            self.error(
                ParseErrorKind::NestingTooDeep {
                    max_depth: self.max_depth,
                },
                start,
                start,
            );
            self.aborted = true;
            self.pos = self.end;
            return false;
        }
        self.open.push(open);
        true
    }

    fn leave(&mut self) {
        self.open.pop();
    }

    fn resolve(&self, target: &Open) -> Closer {
        match self.open.last() {
            Some(top) if top == target => Closer::Innermost,
            _ if self.open.contains(target) => Closer::Outer,
            _ => Closer::Stray,
        }
    }

    // === Nodes ===

    /// Parses nodes until a closer, returning them with the stop reason and the content end.
    fn parse_nodes(&mut self) -> (Vec<TemplateNode>, Stop, usize) {
        let mut nodes = Vec::new();

        while !self.aborted && self.pos < self.end {
            let here = self.pos;

            if self.at("{/") {
                if let Some((name, after)) = self.read_marker().filter(|(n, _)| is_identifier(n)) {
                    match self.resolve(&Open::Block(SmolStr::new(name))) {
                        Closer::Innermost => {
                            self.pos = after;
                            return (nodes, Stop::Close, here);
                        }
                        Closer::Outer => return (nodes, Stop::Outer, here),
                        Closer::Stray => {
                            self.invalid_block(
                                format!("unexpected {{/{name}}} without a matching {{#{name}}}"),
                                here,
                                after,
                            );
                            self.pos = after;
                            continue;
                        }
                    }
                }
            }

            if self.at("{:") {
                let Some((inner, after)) = self.read_marker() else {
                    self.invalid_block("unterminated block marker", here, self.end);
                    self.pos = self.end;
                    break;
                };
                let Some(stop) = continuation(inner) else {
                    self.invalid_block(
                        format!("'{inner}' is not a valid block continuation, expected {{:else}} or {{:else if}}"),
                        here,
                        after,
                    );
                    self.pos = after;
                    continue;
                };
                match self.resolve(&Open::Block(SmolStr::new("if"))) {
                    Closer::Innermost => {
                        self.pos = after;
                        return (nodes, stop, here);
                    }
                    Closer::Outer => return (nodes, Stop::Outer, here),
                    Closer::Stray => {
                        self.invalid_block("{:else} outside of an {#if} block", here, after);
                        self.pos = after;
                        continue;
                    }
                }
            }

            if self.at("</") && self.at_markup() {
                let (name, after) = self.closing_tag();
                match self.resolve(&Open::Element(name.clone())) {
                    Closer::Innermost => {
                        self.pos = after;
                        return (nodes, Stop::CloseTag, here);
                    }
                    Closer::Outer => return (nodes, Stop::Outer, here),
                    Closer::Stray => {
                        let kind = match self.innermost_element() {
                            Some(expected) => ParseErrorKind::MismatchedClosingTag {
                                expected: expected.to_string(),
                                found: name.to_string(),
                            },
                            None => ParseErrorKind::UnexpectedClosingTag {
                                tag_name: name.to_string(),
                            },
                        };
                        self.error(kind, here, after);
                        self.pos = after;
                        continue;
                    }
                }
            }

            let node = if self.at("{#") {
                self.parse_block()
            } else if self.at("{") {
                self.parse_interpolation()
            } else if self.at("<!--") {
                Some(self.parse_comment())
            } else if self.at_markup() {
                self.parse_element()
            } else {
                Some(self.parse_text())
            };
            nodes.extend(node);
        }

        let end = self.pos.min(self.end);
        (nodes, Stop::Eof, end)
    }

    fn innermost_element(&self) -> Option<&SmolStr> {
        self.open.iter().rev().find_map(|open| match open {
            Open::Element(name) => Some(name),
            Open::Block(_) => None,
        })
    }

    /// Reads `</name ...>`, returning the name and the offset past `>`.
    fn closing_tag(&self) -> (SmolStr, usize) {
        let name_start = self.pos + 2;
        let rest = &self.source[name_start..self.end];
        let name_len = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        let after = rest
            .find('>')
            .map(|i| name_start + i + 1)
            .unwrap_or(self.end);
        (SmolStr::new(&rest[..name_len]), after)
    }

    fn parse_text(&mut self) -> TemplateNode {
        let start = self.pos;
        self.bump();
        while self.pos < self.end && !self.at("{") && !self.at_markup() {
            self.bump();
        }
        TemplateNode::Text(Text {
            data: self.source[start..self.pos].to_string(),
            span: range(start, self.pos),
        })
    }

    fn parse_comment(&mut self) -> TemplateNode {
        let start = self.pos;
        let content_start = start + 4;
        let rest = &self.source[content_start..self.end];
        let (data, end) = match rest.find("-->") {
            Some(i) => (&rest[..i], content_start + i + 3),
            None => (rest, self.end),
        };
        self.pos = end;
        TemplateNode::Comment(Comment {
            data: data.to_string(),
            span: range(start, end),
        })
    }

    fn parse_interpolation(&mut self) -> Option<TemplateNode> {
        let start = self.pos;
        let Some(close) = find_closing(self.bounded(), start + 1, '}') else {
            self.error_with(
                ParseErrorKind::UnterminatedExpression,
                start,
                start + 1,
                "add a closing '}'".to_string(),
            );
            self.pos = start + 1;
            return None;
        };
        let expression = self.source[start + 1..close].trim();
        self.pos = close + 1;
        if expression.is_empty() {
            return None;
        }
        Some(TemplateNode::Interpolation(Interpolation {
            expression: expression.to_string(),
            span: range(start, self.pos),
        }))
    }

    // === Elements ===

    fn parse_element(&mut self) -> Option<TemplateNode> {
        let start = self.pos;
        self.bump();
        let name = SmolStr::new(self.read_while(is_name_char));

        let mut attributes = Vec::new();
        let mut explicit_self_closing = false;
        loop {
            self.skip_whitespace();
            if self.pos >= self.end {
                self.unclosed_tag(&name, start);
                return Some(TemplateNode::Element(Element {
                    name,
                    attributes,
                    children: Vec::new(),
                    self_closing: false,
                    span: range(start, self.pos),
                }));
            }
            if self.at("/>") {
                self.pos += 2;
                explicit_self_closing = true;
                break;
            }
            if self.at(">") {
                self.pos += 1;
                break;
            }
            if let Some(attribute) = self.parse_attribute() {
                attributes.push(attribute);
            }
        }

        if explicit_self_closing || is_void_element(&name) {
            return Some(TemplateNode::Element(Element {
                name,
                attributes,
                children: Vec::new(),
                self_closing: true,
                span: range(start, self.pos),
            }));
        }

        if RAW_TEXT_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
            let children = self.parse_raw_text(&name, start);
            return Some(TemplateNode::Element(Element {
                name,
                attributes,
                children,
                self_closing: false,
                span: range(start, self.pos),
            }));
        }

        if !self.enter(Open::Element(name.clone()), start) {
            return None;
        }
        let (children, stop, _) = self.parse_nodes();
        self.leave();
        if stop != Stop::CloseTag {
            self.unclosed_tag(&name, start);
        }

        Some(TemplateNode::Element(Element {
            name,
            attributes,
            children,
            self_closing: false,
            span: range(start, self.pos),
        }))
    }

    fn parse_raw_text(&mut self, name: &str, start: usize) -> Vec<TemplateNode> {
        let close = format!("</{name}");
        let content_start = self.pos;
        let Some(i) = self.rest().find(&close) else {
            self.pos = self.end;
            self.unclosed_tag(name, start);
            return vec![TemplateNode::Text(Text {
                data: self.source[content_start..self.end].to_string(),
                span: range(content_start, self.end),
            })];
        };
        let content_end = content_start + i;
        self.pos = content_end;
        let (_, after) = self.closing_tag();
        self.pos = after;
        if content_start == content_end {
            return Vec::new();
        }
        vec![TemplateNode::Text(Text {
            data: self.source[content_start..content_end].to_string(),
            span: range(content_start, content_end),
        })]
    }

    /// Parses one attribute. Always advances.
    fn parse_attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;

        if self.at("{") {
            let Some(close) = find_closing(self.bounded(), start + 1, '}') else {
                self.error(ParseErrorKind::UnterminatedExpression, start, start + 1);
                self.pos = self.end;
                return None;
            };
            let expression = self.source[start + 1..close].trim();
            self.pos = close + 1;
            let name = dollar_ident(expression).unwrap_or(expression);
            return Some(Attribute::Expression {
                name: SmolStr::new(name),
                expression: expression.to_string(),
            });
        }

        let name = self.read_while(|c| {
            !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '{')
        });
        if name.is_empty() {
            self.bump();
            return None;
        }

        let after_name = self.pos;
        self.skip_whitespace();
        if !self.at("=") {
            self.pos = after_name;
            return Some(Attribute::Static {
                name: SmolStr::new(name),
                value: None,
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = self.parse_attribute_value()?;
        let span = range(start, self.pos);

        if let Some(event) = event_name(name) {
            let handler = match value {
                AttributeValue::Text(text) | AttributeValue::Expression(text) => text,
            };
            return Some(Attribute::Event {
                event_type: SmolStr::new(event),
                handler,
                span,
            });
        }

        Some(match value {
            AttributeValue::Text(text) => Attribute::Static {
                name: SmolStr::new(name),
                value: Some(text),
            },
            AttributeValue::Expression(expression) => Attribute::Expression {
                name: SmolStr::new(name),
                expression,
            },
        })
    }

    fn parse_attribute_value(&mut self) -> Option<AttributeValue> {
        let start = self.pos;
        let quote = self.rest().chars().next().filter(|&c| c == '"' || c == '\'');

        if let Some(quote) = quote {
            let content_start = start + 1;
            let Some(i) = self.source[content_start..self.end].find(quote) else {
                self.error(ParseErrorKind::UnterminatedString, start, self.end);
                self.pos = self.end;
                return None;
            };
            let content = &self.source[content_start..content_start + i];
            self.pos = content_start + i + 1;
            let trimmed = content.trim();
            if trimmed.starts_with('{')
                && find_closing(trimmed, 1, '}') == Some(trimmed.len() - 1)
            {
                return Some(AttributeValue::Expression(
                    trimmed[1..trimmed.len() - 1].trim().to_string(),
                ));
            }
            return Some(AttributeValue::Text(content.to_string()));
        }

        if self.at("{") {
            let Some(close) = find_closing(self.bounded(), start + 1, '}') else {
                self.error_with(
                    ParseErrorKind::UnterminatedExpression,
                    start,
                    start + 1,
                    "add a closing '}'".to_string(),
                );
                self.pos = self.end;
                return None;
            };
            self.pos = close + 1;
            return Some(AttributeValue::Expression(
                self.source[start + 1..close].trim().to_string(),
            ));
        }

        let mut value = self.read_while(|c| !c.is_whitespace() && c != '>');
        if value.ends_with('/') && self.at(">") {
            value = &value[..value.len() - 1];
            self.pos -= 1;
        }
        Some(AttributeValue::Text(value.to_string()))
    }

    // === Blocks ===

    fn parse_block(&mut self) -> Option<TemplateNode> {
        let start = self.pos;
        let Some((header, after)) = self.read_marker() else {
            self.invalid_block("unterminated block marker", start, self.end);
            self.pos = self.end;
            return None;
        };
        self.pos = after;

        let kind_len = header
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(header.len());
        let (kind, args) = (&header[..kind_len], header[kind_len..].trim());

        match kind {
            "if" => {
                if args.is_empty() {
                    self.invalid_block("{#if} requires a condition", start, after);
                }
                if !self.enter(Open::Block(SmolStr::new("if")), start) {
                    return None;
                }
                let block = self.parse_if_chain(start, args.to_string());
                self.leave();
                Some(TemplateNode::IfBlock(block))
            }
            "each" => {
                let header = match parse_each_header(args) {
                    Some(header) => header,
                    None => {
                        self.invalid_block(
                            "expected {#each iterable as item[, index] [(key)]}",
                            start,
                            after,
                        );
                        EachHeader::default()
                    }
                };
                let body = self.parse_block_body("each", start)?;
                Some(TemplateNode::EachBlock(EachBlock {
                    iterable: header.iterable,
                    item: header.item,
                    index: header.index,
                    key: header.key,
                    body,
                    span: range(start, self.pos),
                }))
            }
            "for" => {
                let (variable, from, to) = match parse_for_header(args) {
                    Some(header) => header,
                    None => {
                        self.invalid_block(
                            "expected {#for name = start to end} with integer bounds",
                            start,
                            after,
                        );
                        (SmolStr::default(), 0, -1)
                    }
                };
                let body = self.parse_block_body("for", start)?;
                Some(TemplateNode::ForBlock(ForBlock {
                    variable,
                    start: from,
                    end: to,
                    body,
                    span: range(start, self.pos),
                }))
            }
            "while" => {
                if args.is_empty() {
                    self.invalid_block("{#while} requires a condition", start, after);
                }
                let body = self.parse_block_body("while", start)?;
                Some(TemplateNode::WhileBlock(WhileBlock {
                    condition: args.to_string(),
                    body,
                    span: range(start, self.pos),
                }))
            }
            _ => {
                self.invalid_block(format!("unknown block type: {{#{kind}}}"), start, after);
                None
            }
        }
    }

    /// Parses the body of a non-if block up to its `{/kind}`.
    fn parse_block_body(&mut self, kind: &str, start: usize) -> Option<Fragment> {
        if !self.enter(Open::Block(SmolStr::new(kind)), start) {
            return None;
        }
        let body_start = self.pos;
        let (nodes, stop, content_end) = self.parse_nodes();
        self.leave();
        if stop != Stop::Close {
            self.unclosed_block(kind, start);
        }
        Some(Fragment {
            nodes,
            span: range(body_start, content_end),
        })
    }

    /// Parses one link of an if chain. The `if` entry is already on the stack.
    fn parse_if_chain(&mut self, start: usize, condition: String) -> IfBlock {
        let body_start = self.pos;
        let (nodes, stop, content_end) = self.parse_nodes();
        let consequent = Fragment {
            nodes,
            span: range(body_start, content_end),
        };

        let alternate = match stop {
            Stop::Close => None,
            Stop::ElseIf(next) => {
                if next.is_empty() {
                    self.invalid_block("{:else if} requires a condition", content_end, self.pos);
                }
                Some(ElseBranch::ElseIf(Box::new(
                    self.parse_if_chain(content_end, next),
                )))
            }
            Stop::Else => Some(ElseBranch::Else(self.parse_else_body(start))),
            Stop::Eof | Stop::Outer | Stop::CloseTag => {
                self.unclosed_block("if", start);
                None
            }
        };

        IfBlock {
            condition,
            consequent,
            alternate,
            span: range(start, self.pos),
        }
    }

    fn parse_else_body(&mut self, start: usize) -> Fragment {
        let body_start = self.pos;
        let mut nodes = Vec::new();
        loop {
            let (chunk, stop, content_end) = self.parse_nodes();
            nodes.extend(chunk);
            match stop {
                Stop::Else | Stop::ElseIf(_) => {
                    self.invalid_block(
                        "{:else} after the final {:else} branch",
                        content_end,
                        self.pos,
                    );
                }
                Stop::Close => {
                    return Fragment {
                        nodes,
                        span: range(body_start, content_end),
                    }
                }
                Stop::Eof | Stop::Outer | Stop::CloseTag => {
                    self.unclosed_block("if", start);
                    return Fragment {
                        nodes,
                        span: range(body_start, content_end),
                    };
                }
            }
        }
    }
}

enum AttributeValue {
    Text(String),
    Expression(String),
}

/// Classifies the inner text of a `{:...}` marker.
fn continuation(inner: &str) -> Option<Stop> {
    let rest = inner.strip_prefix("else")?;
    if rest.is_empty() {
        return Some(Stop::Else);
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let condition = rest.strip_prefix("if")?;
    if condition.is_empty() || condition.starts_with(char::is_whitespace) {
        Some(Stop::ElseIf(condition.trim().to_string()))
    } else {
        None
    }
}

#[derive(Debug, Default)]
struct EachHeader {
    iterable: String,
    item: SmolStr,
    index: Option<SmolStr>,
    key: Option<String>,
}

/// Parses `iterable as item[, index] [(key)]`.
fn parse_each_header(args: &str) -> Option<EachHeader> {
    let as_pos = *find_keyword(args, "as").last()?;
    let iterable = args[..as_pos].trim();
    let mut pattern = args[as_pos + 2..].trim();

    let mut key = None;
    if pattern.ends_with(')') {
        if let Some(open) = find_top_level_char(pattern, '(') {
            key = Some(pattern[open + 1..pattern.len() - 1].trim().to_string());
            pattern = pattern[..open].trim();
        }
    }

    let parts = split_top_level(pattern, ',');
    let item = parts.first().map(|s| s.trim()).unwrap_or_default();
    let index = match parts.get(1).map(|s| s.trim()) {
        Some(index) if is_identifier(index) => Some(SmolStr::new(index)),
        Some(_) => return None,
        None => None,
    };

    if iterable.is_empty() || item.is_empty() || parts.len() > 2 || key.as_deref() == Some("") {
        return None;
    }

    Some(EachHeader {
        iterable: iterable.to_string(),
        item: SmolStr::new(item),
        index,
        key,
    })
}

/// Parses `name = start to end` with integer bounds.
fn parse_for_header(args: &str) -> Option<(SmolStr, i64, i64)> {
    let eq = find_assignment(args)?;
    let variable = args[..eq].trim();
    let bounds = &args[eq + 1..];
    let to = *find_keyword(bounds, "to").first()?;
    let from = bounds[..to].trim().parse::<i64>().ok()?;
    let until = bounds[to + 2..].trim().parse::<i64>().ok()?;
    is_identifier(variable).then(|| (SmolStr::new(variable), from, until))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(markup: &str) -> (Fragment, Vec<ParseError>) {
        TemplateParser::new(markup, 0, markup.len(), 256).parse()
    }

    fn kinds(errors: &[ParseError]) -> Vec<ParseErrorKind> {
        errors.iter().map(|e| e.kind.clone()).collect()
    }

    #[test]
    fn test_element_with_attributes() {
        let (fragment, errors) = parse(r#"<input type="text" value={$name} disabled />"#);
        assert!(errors.is_empty());
        let TemplateNode::Element(element) = &fragment.nodes[0] else {
            panic!("expected element");
        };
        assert!(element.self_closing);
        assert_eq!(
            element.attributes,
            vec![
                Attribute::Static {
                    name: "type".into(),
                    value: Some("text".to_string()),
                },
                Attribute::Expression {
                    name: "value".into(),
                    expression: "$name".to_string(),
                },
                Attribute::Static {
                    name: "disabled".into(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn test_event_attribute_forms() {
        assert_eq!(event_name("click"), Some("click"));
        assert_eq!(event_name("on:click"), Some("click"));
        assert_eq!(event_name("onclick"), Some("click"));
        assert_eq!(event_name("@submit"), Some("submit"));
        assert_eq!(event_name("class"), None);
        assert_eq!(event_name("once"), None);
    }

    #[test]
    fn test_if_else_chain() {
        let (fragment, errors) = parse("{#if $a}A{:else if $b}B{:else}C{/if}");
        assert!(errors.is_empty(), "{errors:?}");
        let TemplateNode::IfBlock(block) = &fragment.nodes[0] else {
            panic!("expected if block");
        };
        assert_eq!(block.condition, "$a");
        let Some(ElseBranch::ElseIf(next)) = &block.alternate else {
            panic!("expected else if");
        };
        assert_eq!(next.condition, "$b");
        assert!(matches!(next.alternate, Some(ElseBranch::Else(_))));
    }

    #[test]
    fn test_nested_same_kind_blocks() {
        let (fragment, errors) = parse("{#if $a}{#if $b}x{/if}y{/if}");
        assert!(errors.is_empty(), "{errors:?}");
        let TemplateNode::IfBlock(outer) = &fragment.nodes[0] else {
            panic!("expected if block");
        };
        assert_eq!(outer.consequent.nodes.len(), 2);
        assert!(matches!(outer.consequent.nodes[0], TemplateNode::IfBlock(_)));
    }

    #[test]
    fn test_inner_block_cannot_close_outer() {
        let (_, errors) = parse("{#if $a}{#each $xs as x}{/if}");
        assert_eq!(
            kinds(&errors),
            vec![ParseErrorKind::UnclosedBlock {
                block_type: "each".to_string()
            }]
        );
    }

    #[test]
    fn test_each_header() {
        let (fragment, errors) = parse("{#each $items as item, i (item.id)}<li>{item}</li>{/each}");
        assert!(errors.is_empty(), "{errors:?}");
        let TemplateNode::EachBlock(block) = &fragment.nodes[0] else {
            panic!("expected each block");
        };
        assert_eq!(block.iterable, "$items");
        assert_eq!(block.item, "item");
        assert_eq!(block.index.as_deref(), Some("i"));
        assert_eq!(block.key.as_deref(), Some("item.id"));
    }

    #[test]
    fn test_for_header() {
        assert_eq!(
            parse_for_header("i = 1 to 3"),
            Some((SmolStr::new("i"), 1, 3))
        );
        assert_eq!(
            parse_for_header("n = -2 to 2"),
            Some((SmolStr::new("n"), -2, 2))
        );
        assert_eq!(parse_for_header("i = 1 until 3"), None);
        assert_eq!(parse_for_header("i = a to 3"), None);
    }

    #[test]
    fn test_unclosed_if() {
        let (_, errors) = parse("<div>{#if $x}<p>Y</p></div>");
        assert_eq!(
            kinds(&errors),
            vec![ParseErrorKind::UnclosedBlock {
                block_type: "if".to_string()
            }]
        );
        assert!(errors[0].is_blocking());
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let (_, errors) = parse("<div><span></p></span></div>");
        assert_eq!(
            kinds(&errors),
            vec![ParseErrorKind::MismatchedClosingTag {
                expected: "span".to_string(),
                found: "p".to_string(),
            }]
        );
    }

    #[test]
    fn test_unterminated_interpolation() {
        let (_, errors) = parse("<p>{$count</p>");
        assert_eq!(kinds(&errors), vec![ParseErrorKind::UnterminatedExpression]);
    }

    #[test]
    fn test_text_with_less_than() {
        let (fragment, errors) = parse("a < b");
        assert!(errors.is_empty());
        assert_eq!(fragment.nodes.len(), 1);
    }

    #[test]
    fn test_nesting_limit() {
        let markup = "<div>".repeat(10);
        let (_, errors) = TemplateParser::new(&markup, 0, markup.len(), 4).parse();
        assert_eq!(
            kinds(&errors),
            vec![ParseErrorKind::NestingTooDeep { max_depth: 4 }]
        );
    }
}
