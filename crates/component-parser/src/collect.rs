//! Derives bindings, events and control-flow records from the template tree.

use crate::ast::*;
use crate::scan::dollar_ident;
use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextRange;

/// The flat views of a template tree.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub bindings: Vec<Binding>,
    pub events: Vec<Event>,
    pub control_flow: Vec<ControlFlowNode>,
}

/// Walks `fragment` in document order.
pub(crate) fn collect(
    fragment: &Fragment,
    source: &str,
    functions: &IndexMap<SmolStr, Function>,
) -> Collected {
    let mut collector = Collector {
        source,
        functions,
        out: Collected::default(),
    };
    collector.visit_nodes(&fragment.nodes);
    collector.out
}

struct Collector<'a> {
    source: &'a str,
    functions: &'a IndexMap<SmolStr, Function>,
    out: Collected,
}

impl Collector<'_> {
    fn slice(&self, span: TextRange) -> String {
        self.source
            .get(usize::from(span.start())..usize::from(span.end()))
            .unwrap_or_default()
            .to_string()
    }

    fn visit_nodes(&mut self, nodes: &[TemplateNode]) {
        for node in nodes {
            self.visit_node(node);
        }
    }

    fn visit_node(&mut self, node: &TemplateNode) {
        match node {
            TemplateNode::Element(element) => {
                for attribute in &element.attributes {
                    if let Attribute::Event {
                        event_type,
                        handler,
                        span,
                    } = attribute
                    {
                        let event = self.event(event_type, handler, *span);
                        self.out.events.push(event);
                    }
                }
                self.visit_nodes(&element.children);
            }
            TemplateNode::Interpolation(interpolation) => {
                let variable_name = dollar_ident(&interpolation.expression).map(SmolStr::new);
                self.out.bindings.push(Binding {
                    expression: interpolation.expression.clone(),
                    kind: BindingKind::Data,
                    is_variable: variable_name.is_some(),
                    variable_name,
                    span: interpolation.span,
                });
            }
            TemplateNode::IfBlock(block) => {
                let conditional = self.conditional(block);
                self.out
                    .control_flow
                    .push(ControlFlowNode::Conditional(conditional));
                self.visit_if_branches(block);
            }
            TemplateNode::EachBlock(block) => {
                let content = self.slice(block.body.span);
                self.out.control_flow.push(ControlFlowNode::Loop {
                    iterable: block.iterable.clone(),
                    item_name: block.item.clone(),
                    index_name: block.index.clone(),
                    key: block.key.clone(),
                    content,
                });
                self.visit_nodes(&block.body.nodes);
            }
            TemplateNode::ForBlock(block) => {
                let content = self.slice(block.body.span);
                self.out.control_flow.push(ControlFlowNode::For {
                    variable: block.variable.clone(),
                    start: block.start,
                    end: block.end,
                    content,
                });
                self.visit_nodes(&block.body.nodes);
            }
            TemplateNode::WhileBlock(block) => {
                let content = self.slice(block.body.span);
                self.out.control_flow.push(ControlFlowNode::While {
                    condition: block.condition.clone(),
                    content,
                });
                self.visit_nodes(&block.body.nodes);
            }
            TemplateNode::Text(_) | TemplateNode::Comment(_) => {}
        }
    }

    /// Visits every branch of an if chain. `else if` links are not listed separately.
    fn visit_if_branches(&mut self, block: &IfBlock) {
        self.visit_nodes(&block.consequent.nodes);
        match &block.alternate {
            Some(ElseBranch::ElseIf(next)) => self.visit_if_branches(next),
            Some(ElseBranch::Else(fragment)) => self.visit_nodes(&fragment.nodes),
            None => {}
        }
    }

    fn conditional(&self, block: &IfBlock) -> Conditional {
        let (else_content, else_if) = match &block.alternate {
            Some(ElseBranch::Else(fragment)) => (Some(self.slice(fragment.span)), None),
            Some(ElseBranch::ElseIf(next)) => (None, Some(Box::new(self.conditional(next)))),
            None => (None, None),
        };
        Conditional {
            condition: block.condition.clone(),
            if_content: self.slice(block.consequent.span),
            else_content,
            else_if,
        }
    }

    fn event(&self, event_type: &SmolStr, handler: &str, span: TextRange) -> Event {
        let function_name = dollar_ident(handler)
            .filter(|name| self.functions.contains_key(*name))
            .map(SmolStr::new);
        Event {
            event_type: event_type.clone(),
            handler: handler.to_string(),
            is_function: function_name.is_some(),
            is_inline: function_name.is_none(),
            function_name,
            span,
        }
    }
}
