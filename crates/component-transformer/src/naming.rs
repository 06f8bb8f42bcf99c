//! Identifier derivation for generated code.

use crate::TransformOptions;
use component_parser::scan::is_identifier;
use component_parser::ParseResult;

/// Name used when nothing else identifies the component.
pub const FALLBACK_COMPONENT_NAME: &str = "Component";

/// Resolves the generated component's name.
///
/// Explicit option first, then an identifier `export default`, then the file stem.
pub fn component_name(options: &TransformOptions, parsed: Option<&ParseResult>) -> String {
    if let Some(name) = options.component_name.as_deref().filter(|n| is_identifier(n)) {
        return name.to_string();
    }
    if let Some(name) = parsed
        .and_then(ParseResult::default_export)
        .and_then(|export| export.default_name())
        .filter(|n| is_identifier(n))
    {
        return name.to_string();
    }
    options
        .filename
        .as_deref()
        .map(file_stem)
        .map(pascal_case)
        .filter(|name| is_identifier(name))
        .unwrap_or_else(|| FALLBACK_COMPONENT_NAME.to_string())
}

/// Returns the final path segment without its extensions.
fn file_stem(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    base.split('.').next().unwrap_or(base)
}

/// Converts `user-card`, `user_card` or `userCard` into `UserCard`.
pub fn pascal_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Upper-cases the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// `count` becomes `setCount`.
pub fn setter_name(name: &str) -> String {
    format!("set{}", capitalize(name))
}

/// The function that recomputes a derived value in plain DOM output.
pub fn compute_name(name: &str) -> String {
    format!("__compute_{name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_parser::parse;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("user-card"), "UserCard");
        assert_eq!(pascal_case("user_card"), "UserCard");
        assert_eq!(pascal_case("counter"), "Counter");
        assert_eq!(pascal_case("404"), "_404");
    }

    #[test]
    fn test_setter_name() {
        assert_eq!(setter_name("count"), "setCount");
        assert_eq!(setter_name("isOpen"), "setIsOpen");
    }

    #[test]
    fn test_component_name_precedence() {
        let parsed = parse("export default Counter");
        let options = TransformOptions::default().with_filename("src/pages/user-card.component");
        assert_eq!(component_name(&options, Some(&parsed)), "Counter");
        assert_eq!(component_name(&options, None), "UserCard");

        let options = options.with_component_name("Explicit");
        assert_eq!(component_name(&options, Some(&parsed)), "Explicit");

        assert_eq!(
            component_name(&TransformOptions::default(), None),
            FALLBACK_COMPONENT_NAME
        );
    }
}
