//! End-to-end generation tests for every target.

use component_parser::{parse, DiagnosticKind};
use component_transformer::{
    transform, transform_named, transform_parsed, Target, TransformOptions,
};
use pretty_assertions::assert_eq;

const COUNTER: &str = r#"
$count! = 0
$double = $count * 2
$increment = () => { $count++ }

<template>
<button click={$increment}>{$count} / {$double}</button>
</template>
"#;

fn options() -> TransformOptions {
    TransformOptions::default().with_filename("counter.component")
}

#[test]
fn test_react_binding_uses_state() {
    let source = "$count! = 0\n<template><p>{$count}</p></template>";
    let result = transform(source, Target::React, TransformOptions::default());
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(result.code.contains("useState"));
    assert!(result.code.contains("{count}"));
}

#[test]
fn test_vue_binding_uses_ref() {
    let source = "$count! = 0\n<template><p>{$count}</p></template>";
    let result = transform(source, Target::Vue, TransformOptions::default());
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(result.code.contains("ref("));
    assert!(result.code.contains("{{ count }}"));
}

#[test]
fn test_unterminated_block_still_produces_code() {
    let source = "$x! = true\n<template>\n{#if $x}\n<p>Y</p>\n</template>";
    for target in Target::ALL {
        let options = TransformOptions::default().with_filename("broken.component");
        let result = transform(source, target, options);
        assert_eq!(result.target, target);
        assert_eq!(result.errors[0].kind, DiagnosticKind::ParseError);
        assert_eq!(
            result.errors.last().map(|e| e.kind),
            Some(DiagnosticKind::TransformError)
        );
        assert!(!result.code.is_empty());
        assert!(result.code.contains("unclosed block: {#if}"), "{}", result.code);
        assert!(result.code.contains("broken.component"), "{}", result.code);
    }
}

#[test]
fn test_valid_component_has_no_errors_for_any_target() {
    for target in Target::ALL {
        let result = transform(COUNTER, target, options());
        assert!(result.is_ok(), "{target}: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "{target}: {:?}", result.warnings);
        assert_eq!(result.component_name, "Counter");
    }
}

#[test]
fn test_react_counter() {
    let result = transform(COUNTER, Target::React, options());
    insta::assert_snapshot!(result.code.trim_end(), @r###"
    import { useCallback, useMemo, useState } from "react";

    export default function Counter() {
      const [count, setCount] = useState(0);
      const double = useMemo(() => count * 2, [count]);

      const increment = useCallback(() => { setCount(prev => prev + 1) }, [count]);

      return (
        <>
          <button onClick={increment}>{count} / {double}</button>
        </>
      );
    }
    "###);
}

#[test]
fn test_vue_counter() {
    let result = transform(COUNTER, Target::Vue, options());
    insta::assert_snapshot!(result.code.trim_end(), @r###"
    <script setup>
    import { computed, ref } from "vue";

    defineOptions({ name: "Counter" });

    const count = ref(0);
    const double = computed(() => count.value * 2);

    const increment = () => { count.value++ };
    </script>

    <template>
      <button @click="increment">{{ count }} / {{ double }}</button>
    </template>
    "###);
}

#[test]
fn test_svelte_counter() {
    let result = transform(COUNTER, Target::Svelte, options());
    insta::assert_snapshot!(result.code.trim_end(), @r###"
    <script>
      let count = 0;
      $: double = count * 2;

      function increment() { count++ }
    </script>

    <button on:click={increment}>{count} / {double}</button>
    "###);
}

#[test]
fn test_vanilla_counter() {
    let result = transform(COUNTER, Target::Vanilla, options());
    let code = &result.code;
    assert!(code.contains("export default function Counter(target) {"));
    assert!(code.contains("function setCount(value) {\n    count = value;\n    __compute_double();\n    __update();\n  }"));
    assert!(code.contains("function __compute_double() {\n    double = count * 2;\n  }"));
    assert!(code.contains("function increment() { setCount(count + 1) }"));
    assert!(code.contains(
        "__el(\"button\", {}, { \"click\": increment }, [__text(count), document.createTextNode(\" / \"), __text(double)])"
    ));
    assert!(code.contains("function __el(tag, attributes, events, children) {"));
    assert!(code.contains("element.addEventListener(type, handler);"));
}

#[test]
fn test_conditionals() {
    let source = "$x! = true\n<template><div>{#if $x}<p>Y</p>{:else}<p>N</p>{/if}</div></template>";
    let react = transform(source, Target::React, TransformOptions::default());
    assert!(react
        .code
        .contains("<div>{x ? (<><p>Y</p></>) : (<><p>N</p></>)}</div>"));

    let vue = transform(source, Target::Vue, TransformOptions::default());
    assert!(vue.code.contains(
        "<div><template v-if=\"x\"><p>Y</p></template><template v-else><p>N</p></template></div>"
    ));

    let svelte = transform(source, Target::Svelte, TransformOptions::default());
    assert!(svelte
        .code
        .contains("<div>{#if x}<p>Y</p>{:else}<p>N</p>{/if}</div>"));

    let vanilla = transform(source, Target::Vanilla, TransformOptions::default());
    assert!(vanilla.code.contains("if (x) {"));
    assert!(vanilla.code.contains("return [__el(\"p\", {}, {}, [document.createTextNode(\"N\")])];"));
}

#[test]
fn test_loops_and_ranges() {
    let source = "$rows! = []\n<template><ul>{#each $rows as row, i (row.id)}<li>{row.name}</li>{/each}</ul>{#for n = 1 to 3}<span>{n}</span>{/for}</template>";

    let react = transform(source, Target::React, TransformOptions::default());
    assert!(react.is_ok(), "{:?}", react.errors);
    assert!(react.code.contains(
        "{rows.map((row, i) => (<Fragment key={row.id}><li>{row.name}</li></Fragment>))}"
    ));
    assert!(react.code.contains(
        "{Array.from({ length: 3 }, (_, __i) => 1 + __i).map((n) => (<Fragment key={n}><span>{n}</span></Fragment>))}"
    ));
    assert!(react
        .code
        .starts_with("import { Fragment, useState } from \"react\";"));

    let vue = transform(source, Target::Vue, TransformOptions::default());
    assert!(vue.code.contains(
        "<template v-for=\"(row, i) in rows\" :key=\"row.id\"><li>{{ row.name }}</li></template>"
    ));

    let svelte = transform(source, Target::Svelte, TransformOptions::default());
    assert!(svelte
        .code
        .contains("{#each rows as row, i (row.id)}<li>{row.name}</li>{/each}"));
    assert!(svelte.code.contains(
        "{#each Array.from({ length: 3 }, (_, __i) => 1 + __i) as n (n)}<span>{n}</span>{/each}"
    ));

    let vanilla = transform(source, Target::Vanilla, TransformOptions::default());
    assert!(vanilla.code.contains("(rows).forEach((row, i) => "));
    assert!(vanilla.code.contains("for (let n = 1; n <= 3; n++)"));
}

#[test]
fn test_signals_subscribe_and_publish() {
    let source = r#"
$theme! = signal("theme", "light")
$toggle = () => { $theme = $theme === "light" ? "dark" : "light" }
<template><button click={$toggle}>{$theme}</button></template>
"#;
    let options = TransformOptions::default().with_signal_module("./store");

    let react = transform(source, Target::React, options.clone());
    assert!(react.is_ok(), "{:?}", react.errors);
    assert!(react.code.contains("import { signal } from \"./store\";"));
    assert!(react
        .code
        .contains("const [theme, setTheme] = useState(() => signal.use(\"theme\", \"light\"));"));
    assert!(react
        .code
        .contains("useEffect(() => signal.on(\"theme\", setTheme), []);"));
    assert!(react
        .code
        .contains("signal.set(\"theme\", theme === \"light\" ? \"dark\" : \"light\")"));

    let vue = transform(source, Target::Vue, options.clone());
    assert!(vue.code.contains("import { onUnmounted, ref } from \"vue\";"));
    assert!(vue
        .code
        .contains("const theme = ref(signal.use(\"theme\", \"light\"));"));
    assert!(vue.code.contains("onUnmounted(__unsubscribe_theme);"));
    assert!(vue
        .code
        .contains("signal.set(\"theme\", theme.value === \"light\" ? \"dark\" : \"light\")"));

    let svelte = transform(source, Target::Svelte, options.clone());
    assert!(svelte.code.contains("import { onDestroy } from \"svelte\";"));
    assert!(svelte.code.contains("onDestroy(__unsubscribe_theme);"));

    let vanilla = transform(source, Target::Vanilla, options);
    assert!(vanilla
        .code
        .contains("__cleanup.push(signal.on(\"theme\", setTheme));"));
}

#[test]
fn test_imports_and_exports() {
    let source = r#"
import Button from './Button'
import type { Props } from './types'
export const VERSION = "1.0"
export default Card
<template><Button label="go" /></template>
"#;
    for target in Target::ALL {
        let result = transform(source, target, TransformOptions::default());
        assert!(result.is_ok(), "{target}: {:?}", result.errors);
        assert_eq!(result.component_name, "Card");
        assert!(result.code.contains("import Button from './Button';"));
        assert!(!result.code.contains("import type"));
        assert!(result.code.contains("export const VERSION = \"1.0\""));
        assert!(!result.code.contains("export default Card"));
    }

    let react = transform(source, Target::React, TransformOptions::default());
    assert!(react.code.contains("export default function Card() {"));
    assert!(react.code.contains("<Button label=\"go\" />"));

    let vue = transform(source, Target::Vue, TransformOptions::default());
    assert!(vue
        .code
        .starts_with("<script>\nexport const VERSION = \"1.0\"\n</script>"));
    assert!(vue.code.contains("defineOptions({ name: \"Card\" });"));

    let svelte = transform(source, Target::Svelte, TransformOptions::default());
    assert!(svelte.code.starts_with("<script context=\"module\">"));
}

fn offset(code: &str, needle: &str) -> usize {
    code.find(needle)
        .unwrap_or_else(|| panic!("missing {needle:?} in:\n{code}"))
}

const CALLS_FUNCTIONS: &str = r#"
$items! = [1, 2]
$sum = (xs) => xs.length
$total = $sum($items)
$seed! = $make()
$make = () => 5
<template><p>{$total} {$seed}</p></template>
"#;

#[test]
fn test_react_declares_functions_before_their_callers() {
    let result = transform(CALLS_FUNCTIONS, Target::React, TransformOptions::default());
    assert!(result.is_ok(), "{:?}", result.errors);
    let code = &result.code;
    assert!(code.contains("const sum = useCallback((xs) => xs.length, []);"));
    assert!(code.contains("const total = useMemo(() => sum(items), [sum, items]);"));
    assert!(code.contains("const [seed, setSeed] = useState(make());"));
    assert!(offset(code, "const [items,") < offset(code, "const sum ="));
    assert!(offset(code, "const sum =") < offset(code, "const total ="));
    assert!(offset(code, "const make =") < offset(code, "const [seed,"));
}

#[test]
fn test_vue_declares_functions_before_their_callers() {
    let result = transform(CALLS_FUNCTIONS, Target::Vue, TransformOptions::default());
    assert!(result.is_ok(), "{:?}", result.errors);
    let code = &result.code;
    assert!(code.contains("const total = computed(() => sum(items.value));"));
    assert!(code.contains("const seed = ref(make());"));
    assert!(offset(code, "const sum = (xs) => xs.length;") < offset(code, "const total ="));
    assert!(offset(code, "const make = () => 5;") < offset(code, "const seed ="));
}

#[test]
fn test_react_callbacks_follow_the_callbacks_they_call() {
    let source = "$n! = 1\n$a = () => { return $b() }\n$b = () => { return $n }";
    let result = transform(source, Target::React, TransformOptions::default());
    assert!(result.is_ok(), "{:?}", result.errors);
    let code = &result.code;
    assert!(code.contains("const b = useCallback(() => { return n }, [n]);"));
    assert!(code.contains("const a = useCallback(() => { return b() }, [b]);"));
    assert!(offset(code, "const b =") < offset(code, "const a ="));
}

#[test]
fn test_declaration_cycle_releases_function_first() {
    let source = "$n! = $next()\n$next = () => $n + 1";
    let result = transform(source, Target::React, TransformOptions::default());
    let code = &result.code;
    assert!(code.contains("const next = useCallback(() => n + 1, []);"));
    assert!(offset(code, "const next =") < offset(code, "const [n, setN] = useState(next());"));
}

#[test]
fn test_each_without_key_falls_back_to_index() {
    let source = "$rows! = []\n<template><ul>{#each $rows as row}<li>{row}</li>{/each}</ul></template>";

    let react = transform(source, Target::React, TransformOptions::default());
    assert!(react.is_ok(), "{:?}", react.errors);
    assert!(react.code.contains(
        "{rows.map((row, __index) => (<Fragment key={__index}><li>{row}</li></Fragment>))}"
    ));

    let vue = transform(source, Target::Vue, TransformOptions::default());
    assert!(vue.code.contains(
        "<template v-for=\"(row, __index) in rows\" :key=\"__index\"><li>{{ row }}</li></template>"
    ));

    let svelte = transform(source, Target::Svelte, TransformOptions::default());
    assert!(svelte.code.contains("{#each rows as row}<li>{row}</li>{/each}"));
}

#[test]
fn test_overflowing_number_literal() {
    let source = "$big! = 1e999\n$small! = -1e999";
    let react = transform(source, Target::React, TransformOptions::default());
    assert!(react.code.contains("useState(Infinity)"), "{}", react.code);
    assert!(react.code.contains("useState(-Infinity)"), "{}", react.code);

    let vanilla = transform(source, Target::Vanilla, TransformOptions::default());
    assert!(vanilla.code.contains("let big = Infinity;"), "{}", vanilla.code);
}

#[test]
fn test_react_static_style_and_braces() {
    let source = "<template><p style=\"color: red\">a } b</p></template>";
    let result = transform(source, Target::React, TransformOptions::default());
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(result
        .code
        .contains("<p style={{ color: \"red\" }}>a {'}'} b</p>"));
}

#[test]
fn test_assigning_computed_is_reported() {
    let source = "$count! = 0\n$double = $count * 2\n$reset = () => { $double = 0 }";
    let result = transform(source, Target::React, TransformOptions::default());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, DiagnosticKind::TransformError);
    assert_eq!(
        result.errors[0].message,
        "cannot assign to computed variable $double"
    );
    assert!(result.code.contains("useCallback(() => { (0) }"));
}

#[test]
fn test_unknown_target_falls_back_to_vanilla() {
    let result = transform_named(COUNTER, "angular", options());
    assert_eq!(result.target, Target::Vanilla);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.starts_with("unknown target 'angular'"));
    assert!(result.code.contains("export default function Counter(target) {"));
    assert!(result.code.contains("counter.component"));

    let named = transform_named(COUNTER, "Svelte", options());
    assert_eq!(named.target, Target::Svelte);
    assert!(named.is_ok());
}

#[test]
fn test_transform_parsed() {
    let parsed = parse(COUNTER);
    let options = TransformOptions::default().with_component_name("Clicker");
    let result = transform_parsed(parsed, Target::Vue, &options);
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(result.code.contains("defineOptions({ name: \"Clicker\" });"));
}

#[test]
fn test_unknown_references_warn_once() {
    let source = "<template><p>{$ghost} {$ghost}</p></template>";
    let result = transform(source, Target::Svelte, TransformOptions::default());
    assert!(result.is_ok());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, DiagnosticKind::SemanticWarning);
    assert!(result.code.contains("<p>{ghost} {ghost}</p>"));
}

#[cfg(feature = "serde")]
#[test]
fn test_serialize_result() {
    let result = transform(COUNTER, Target::Svelte, options());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["target"], "svelte");
    assert_eq!(value["component_name"], "Counter");
}
