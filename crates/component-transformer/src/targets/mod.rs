//! One code generation strategy per target framework.

mod react;
mod svelte;
mod vanilla;
mod vue;

pub use react::React;
pub use svelte::Svelte;
pub use vanilla::Vanilla;
pub use vue::Vue;

use crate::code::block;
use crate::strategy::{CodeGenStrategy, FunctionCode, Handler};
use crate::target::Target;

/// Returns the strategy generating `target`.
pub fn strategy_for(target: Target) -> &'static dyn CodeGenStrategy {
    match target {
        Target::React => &React,
        Target::Vue => &Vue,
        Target::Svelte => &Svelte,
        Target::Vanilla => &Vanilla,
    }
}

/// HTML elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// `async (a, b) => body` for a declared function.
pub(crate) fn arrow_function(function: &FunctionCode<'_>) -> String {
    let prefix = if function.is_async { "async " } else { "" };
    let body = if function.block_body {
        block(&function.body)
    } else {
        function.body.trim().to_string()
    };
    format!("{prefix}({}) => {body}", function.params)
}

/// `async function name(a, b) { ... }` for a declared function.
pub(crate) fn function_declaration(function: &FunctionCode<'_>) -> String {
    let prefix = if function.is_async { "async " } else { "" };
    let body = if function.block_body {
        block(&function.body)
    } else {
        block(&format!("return {};", function.body.trim()))
    };
    format!(
        "{prefix}function {}({}) {body}",
        function.name, function.params
    )
}

/// The handler as a JavaScript function value.
pub(crate) fn handler_function(handler: &Handler) -> String {
    match handler {
        Handler::Function(name) => name.to_string(),
        Handler::Inline {
            code,
            is_function: true,
        } => code.trim().to_string(),
        Handler::Inline { code, .. } => format!("() => {}", block(code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smol_str::SmolStr;

    fn function<'a>(body: &str, block_body: bool) -> FunctionCode<'a> {
        FunctionCode {
            name: "save",
            is_async: true,
            params: "item, force = false".to_string(),
            body: body.to_string(),
            block_body,
            references: Vec::new(),
        }
    }

    #[test]
    fn test_function_forms() {
        assert_eq!(
            arrow_function(&function("store(item)", false)),
            "async (item, force = false) => store(item)"
        );
        assert_eq!(
            function_declaration(&function("store(item)", false)),
            "async function save(item, force = false) { return store(item); }"
        );
        assert_eq!(
            function_declaration(&function("await store(item);", true)),
            "async function save(item, force = false) { await store(item); }"
        );
    }

    #[test]
    fn test_handler_function() {
        assert_eq!(handler_function(&Handler::Function(SmolStr::new("save"))), "save");
        let inline = Handler::Inline {
            code: "count++".to_string(),
            is_function: false,
        };
        assert_eq!(handler_function(&inline), "() => { count++ }");
        let arrow = Handler::Inline {
            code: "(e) => save(e)".to_string(),
            is_function: true,
        };
        assert_eq!(handler_function(&arrow), "(e) => save(e)");
    }

    #[test]
    fn test_strategy_for() {
        for target in Target::ALL {
            assert_eq!(strategy_for(target).target(), target);
        }
    }
}
