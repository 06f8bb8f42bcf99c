//! Parser behavior on complete component sources.

use component_parser::*;
use pretty_assertions::assert_eq;
use smol_str::SmolStr;
use std::collections::BTreeSet;

fn error_kinds(result: &ParseResult) -> Vec<ParseErrorKind> {
    result.errors.iter().map(|e| e.kind.clone()).collect()
}

#[test]
fn test_reactive_literal_declaration() {
    let result = parse("$count! = 0");
    assert!(result.errors.is_empty());
    let count = &result.variables["count"];
    assert!(count.reactive);
    assert!(!count.computed);
    assert_eq!(count.value, ValueLiteral::Number(0.0));
    assert!(count.dependencies.is_empty());
}

#[test]
fn test_reactive_literals_keep_their_kind() {
    let source = r#"
$name! = "Ada"
$ratio! = 0.5
$on! = false
$nothing! = ~
$items! = [1, 2, 3]
$user! = { id: 1 }
"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let kinds: Vec<_> = result
        .variables
        .values()
        .map(|v| (v.name.as_str(), v.reactive, v.value.kind_name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("name", true, "string"),
            ("ratio", true, "number"),
            ("on", true, "boolean"),
            ("nothing", true, "null"),
            ("items", true, "array"),
            ("user", true, "object"),
        ]
    );
}

#[test]
fn test_computed_from_reactive() {
    let result = parse("$count! = 0\n$double = $count * 2");
    assert!(result.errors.is_empty());
    assert!(result.variables["count"].reactive);
    let double = &result.variables["double"];
    assert!(double.computed);
    assert!(!double.reactive);
    assert_eq!(double.dependencies, vec![SmolStr::new("count")]);
    assert_eq!(
        double.value,
        ValueLiteral::Expression("$count * 2".to_string())
    );
}

#[test]
fn test_computed_resolution_is_order_independent() {
    let result = parse("$double! = $count * 2\n$count! = 0");
    let double = &result.variables["double"];
    assert!(double.computed);
    assert!(!double.reactive);
}

#[test]
fn test_computed_dependencies_are_deduplicated_and_ordered() {
    let result = parse("$a = 1\n$b = 2\n$sum = $b + $a + $b + $unknown");
    assert_eq!(
        result.variables["sum"].dependencies,
        vec![SmolStr::new("b"), SmolStr::new("a")]
    );
}

#[test]
fn test_type_annotation_with_marker_before_or_after() {
    let result = parse("$a: string! = \"x\"\n$b!: number = 1\n$c: Array<number> = []");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let a = &result.variables["a"];
    assert!(a.reactive && a.has_type_annotation);
    assert_eq!(a.type_name.as_deref(), Some("string"));
    let b = &result.variables["b"];
    assert!(b.reactive && b.has_type_annotation);
    let c = &result.variables["c"];
    assert!(!c.reactive);
    assert_eq!(c.type_name.as_deref(), Some("Array<number>"));
}

#[test]
fn test_signal_declaration() {
    let result = parse("$theme! = signal(\"theme\", \"light\")\n$label = $theme");
    let theme = &result.variables["theme"];
    assert_eq!(
        theme.value,
        ValueLiteral::Signal {
            key: "theme".to_string(),
            initial: Box::new(ValueLiteral::String("light".to_string())),
        }
    );
    assert!(!theme.computed);
    assert!(result.variables["label"].computed);
}

#[test]
fn test_function_forms() {
    let source = r#"
$increment = () => { $count++ }
$add = async (a: number, b = 2) => a + b
$reset = function () {
  $count = 0
}
$double = x => x * 2
"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.variables.is_empty());
    let names: Vec<_> = result.functions.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["increment", "add", "reset", "double"]);

    let add = &result.functions["add"];
    assert!(add.is_async && add.is_arrow);
    assert_eq!(add.params[1].default.as_deref(), Some("2"));

    let reset = &result.functions["reset"];
    assert!(!reset.is_arrow);
    assert!(reset.block_body);
    assert_eq!(reset.body, "$count = 0");
}

#[test]
fn test_conditional_with_else() {
    let result = parse("<template><div>{#if $x}<p>Y</p>{:else}<p>N</p>{/if}</div></template>");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.control_flow.len(), 1);
    let ControlFlowNode::Conditional(conditional) = &result.control_flow[0] else {
        panic!("expected conditional");
    };
    assert_eq!(conditional.condition, "$x");
    assert_eq!(conditional.if_content, "<p>Y</p>");
    assert_eq!(conditional.else_content.as_deref(), Some("<p>N</p>"));
}

#[test]
fn test_else_if_chain_is_nested() {
    let result = parse("<template>{#if $a}A{:else if $b}B{:else}C{/if}</template>");
    assert_eq!(result.control_flow.len(), 1);
    let ControlFlowNode::Conditional(conditional) = &result.control_flow[0] else {
        panic!("expected conditional");
    };
    assert!(conditional.else_content.is_none());
    let next = conditional.else_if.as_ref().unwrap();
    assert_eq!(next.condition, "$b");
    assert_eq!(next.if_content, "B");
    assert_eq!(next.else_content.as_deref(), Some("C"));
}

#[test]
fn test_control_flow_is_pre_order() {
    let source = r#"<template>
{#each $rows as row, i (row.id)}
  {#if row.visible}
    {#for n = 1 to 3}<span>{n}</span>{/for}
  {/if}
{/each}
{#while $busy}<p>...</p>{/while}
</template>"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let kinds: Vec<_> = result.control_flow.iter().map(|n| n.kind_name()).collect();
    assert_eq!(kinds, vec!["loop", "conditional", "for", "while"]);

    let ControlFlowNode::Loop {
        iterable,
        item_name,
        index_name,
        key,
        ..
    } = &result.control_flow[0]
    else {
        panic!("expected loop");
    };
    assert_eq!(iterable, "$rows");
    assert_eq!(item_name, "row");
    assert_eq!(index_name.as_deref(), Some("i"));
    assert_eq!(key.as_deref(), Some("row.id"));

    let ControlFlowNode::For {
        variable,
        start,
        end,
        content,
    } = &result.control_flow[2]
    else {
        panic!("expected for");
    };
    assert_eq!((variable.as_str(), *start, *end), ("n", 1, 3));
    assert_eq!(content, "<span>{n}</span>");
}

#[test]
fn test_nested_same_kind_blocks_close_correctly() {
    let result = parse(
        "<template>{#each $a as x}{#each x.items as y}{y}{/each}{/each}<p>after</p></template>",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.control_flow.len(), 2);
    let ControlFlowNode::Loop { content, .. } = &result.control_flow[0] else {
        panic!("expected loop");
    };
    assert_eq!(content, "{#each x.items as y}{y}{/each}");
    assert_eq!(result.fragment.nodes.len(), 2);
}

#[test]
fn test_bindings_and_events() {
    let source = r#"
$count! = 0
$increment = () => { $count++ }
<template>
  <button click={$increment} on:mouseenter={() => $count = 0}>{$count}</button>
  <input value={$count} />
  <p>{$count * 2}</p>
</template>
"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);

    let bindings: Vec<_> = result
        .bindings
        .iter()
        .map(|b| (b.expression.as_str(), b.is_variable))
        .collect();
    assert_eq!(bindings, vec![("$count", true), ("$count * 2", false)]);
    assert_eq!(result.bindings[0].variable_name.as_deref(), Some("count"));

    assert_eq!(result.events.len(), 2);
    let click = &result.events[0];
    assert_eq!(click.event_type, "click");
    assert!(click.is_function && !click.is_inline);
    assert_eq!(click.function_name.as_deref(), Some("increment"));
    let enter = &result.events[1];
    assert_eq!(enter.event_type, "mouseenter");
    assert!(enter.is_inline && !enter.is_function);
}

#[test]
fn test_handler_naming_undeclared_function_is_inline() {
    let result = parse("<template><button click={$missing}>x</button></template>");
    assert!(result.events[0].is_inline);
    assert!(result.events[0].function_name.is_none());
}

#[test]
fn test_imports_round_trip() {
    let source = r#"
import Button from './Button'
import { format, clamp as limit } from "./utils"
import * as api from './api'
import './styles.css'
import Dialog, { open } from './dialog'
"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.imports.len(), 6);

    let printed: Vec<String> = result.imports.iter().map(|i| i.to_string()).collect();
    let reparsed = parse(&printed.join("\n"));
    assert!(reparsed.errors.is_empty(), "{:?}", reparsed.errors);

    let summary = |imports: &[ImportRecord]| -> Vec<(ImportKind, String, BTreeSet<(String, String)>)> {
        imports
            .iter()
            .map(|i| {
                let names = i
                    .names
                    .iter()
                    .map(|n| (n.imported.to_string(), n.local.to_string()))
                    .collect();
                (i.kind, i.source.clone(), names)
            })
            .collect()
    };
    assert_eq!(summary(&result.imports), summary(&reparsed.imports));
}

#[test]
fn test_default_and_named_import_share_source() {
    let result = parse("import Dialog, { open as show } from './dialog'");
    let kinds: Vec<_> = result.imports.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![ImportKind::Default, ImportKind::Named]);
    assert!(result.imports.iter().all(|i| i.source == "./dialog"));
    assert_eq!(
        result.imports[1].names,
        vec![ImportName {
            imported: "open".into(),
            local: "show".into(),
        }]
    );
}

#[test]
fn test_type_only_import() {
    let result = parse("import type { Props } from './types'");
    assert!(result.imports[0].type_only);
    assert_eq!(
        result.imports[0].to_string(),
        "import type { Props } from './types';"
    );
}

#[test]
fn test_exports_round_trip() {
    let source = r#"
export const VERSION = "1.0"
export const format = (n) => n.toFixed(2)
export function helper(a) {
  return a
}
export { helper as util } from './helpers'
export default Counter
"#;
    let result = parse(source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.exports.len(), 5);

    assert_eq!(result.default_export().and_then(|e| e.default_name()), Some("Counter"));
    let functions: Vec<_> = result.exports.iter().map(|e| e.is_function).collect();
    assert_eq!(functions, vec![false, true, true, false, false]);
    assert_eq!(result.exports[3].source.as_deref(), Some("./helpers"));

    let printed: Vec<String> = result.exports.iter().map(|e| e.to_string()).collect();
    let reparsed = parse(&printed.join("\n"));
    assert!(reparsed.errors.is_empty(), "{:?}", reparsed.errors);
    let names = |r: &ParseResult| -> BTreeSet<String> {
        r.exports
            .iter()
            .flat_map(|e| e.names.iter().map(|n| n.local.to_string()))
            .collect()
    };
    assert_eq!(names(&result), names(&reparsed));
    let sources = |r: &ParseResult| -> Vec<Option<String>> {
        r.exports.iter().map(|e| e.source.clone()).collect()
    };
    assert_eq!(sources(&result), sources(&reparsed));
}

#[test]
fn test_parse_is_idempotent() {
    let source = r#"
import { clamp } from './utils'
$count! = 0
$double = $count * 2
$increment = () => { $count = clamp($count + 1) }
<template>
  {#if $count > 1}<b>{$double}</b>{/if}
  {#each [1, 2] as n}{n}{/each}
  {#if $open}
</template>
"#;
    assert_eq!(parse(source), parse(source));
}

#[test]
fn test_empty_and_whitespace_sources() {
    for source in ["", "   ", "\n\n\t  \n", "// only a comment\n"] {
        let result = parse(source);
        assert!(result.variables.is_empty());
        assert!(result.functions.is_empty());
        assert!(result.control_flow.is_empty());
        assert!(result.errors.is_empty(), "{source:?}: {:?}", result.errors);
    }
}

#[test]
fn test_duplicate_declaration() {
    let result = parse("$count! = 0\n$count = 1");
    assert_eq!(
        error_kinds(&result),
        vec![ParseErrorKind::DuplicateDeclaration {
            name: "count".to_string()
        }]
    );
    let error = &result.errors[0];
    assert_eq!(error.line, Some(2));
    assert_eq!(
        error.suggestion.as_deref(),
        Some("rename one of the declarations")
    );
    assert_eq!(result.variables["count"].value, ValueLiteral::Number(0.0));
}

#[test]
fn test_recovery_after_bad_statements() {
    let source = "let x = 1\n$a = [1, 2\n$b = 3\n$c =\n$d! = 4";
    let result = parse(source);
    let names: Vec<_> = result.variables.keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["b", "d"]);
    assert_eq!(
        error_kinds(&result),
        vec![
            ParseErrorKind::UnexpectedToken {
                expected: "a declaration, import, export or <template>".to_string(),
                found: "'let'".to_string(),
            },
            ParseErrorKind::UnbalancedDelimiter { delimiter: '[' },
            ParseErrorKind::InvalidValue {
                name: "c".to_string(),
                message: "missing value after '='".to_string(),
            },
        ]
    );
    let lines: Vec<_> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![Some(1), Some(2), Some(4)]);
    assert!(!result.has_blocking_errors());
}

#[test]
fn test_unterminated_if_block() {
    let result = parse("$x! = true\n<template>\n{#if $x}\n<p>Y</p>\n</template>");
    assert!(result.has_blocking_errors());
    let error = &result.errors[0];
    assert_eq!(
        error.kind,
        ParseErrorKind::UnclosedBlock {
            block_type: "if".to_string()
        }
    );
    assert_eq!(error.line, Some(3));
    assert_eq!(error.suggestion.as_deref(), Some("add {/if} to close the block"));
}

#[test]
fn test_unclosed_template_still_parses_markup() {
    let result = parse("<template>\n<p>{$x}</p>");
    assert_eq!(error_kinds(&result), vec![ParseErrorKind::UnclosedTemplate]);
    assert_eq!(result.bindings.len(), 1);
}

#[test]
fn test_duplicate_template() {
    let result = parse("<template><p>a</p></template>\n<template><p>b</p></template>");
    assert_eq!(error_kinds(&result), vec![ParseErrorKind::DuplicateTemplate]);
    assert_eq!(result.template, "<p>a</p>");
}

#[test]
fn test_error_messages() {
    let result = parse("$a = (1, 2\n<template><div><span></div></template>");
    let messages: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
    insta::assert_snapshot!(messages.join("\n"), @r"
    unbalanced (
    unclosed tag: <span>
    ");
}

#[test]
fn test_deep_nesting_is_rejected_without_panicking() {
    let markup = "<div>".repeat(400);
    let source = format!("<template>{markup}</template>");
    let result = parse(&source);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e.kind, ParseErrorKind::NestingTooDeep { max_depth: 256 })));

    let result = parse_with_options(&source, ParseOptions::default().with_max_depth(1000));
    assert!(result
        .errors
        .iter()
        .all(|e| matches!(e.kind, ParseErrorKind::UnclosedTag { .. })));
}

#[cfg(feature = "serde")]
#[test]
fn test_serialize_result() {
    let result = parse("$count! = 0");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["variables"]["count"]["reactive"], serde_json::json!(true));
    assert_eq!(
        json["variables"]["count"]["value"],
        serde_json::json!({ "type": "number", "value": 0.0 })
    );
}
