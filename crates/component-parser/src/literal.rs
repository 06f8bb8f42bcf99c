//! Classification of declaration right-hand sides into [`ValueLiteral`]s.

use crate::ast::ValueLiteral;
use crate::scan::{find_closing, split_top_level};

/// Why a right-hand side could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LiteralError {
    /// Nothing after `=`.
    Missing,
    /// A quoted string never closes.
    UnterminatedString,
    /// An array or object literal never closes.
    Unbalanced(char),
    /// A structurally invalid literal, with a message.
    Invalid(String),
}

/// Classifies a trimmed right-hand side.
///
/// Tried in order: quoted string, number, boolean, null, array, object,
/// `signal(key, initial)`. Anything else is an opaque expression.
pub(crate) fn classify(text: &str) -> Result<ValueLiteral, LiteralError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LiteralError::Missing);
    }

    if let Some(literal) = string_literal(text)? {
        return Ok(literal);
    }
    if let Some(n) = number_literal(text) {
        return Ok(ValueLiteral::Number(n));
    }
    match text {
        "true" => return Ok(ValueLiteral::Boolean(true)),
        "false" => return Ok(ValueLiteral::Boolean(false)),
        "null" | "~" => return Ok(ValueLiteral::Null),
        _ => {}
    }
    if let Some(literal) = bracketed(text, '[', ']', ValueLiteral::Array)? {
        return Ok(literal);
    }
    if let Some(literal) = bracketed(text, '{', '}', ValueLiteral::Object)? {
        return Ok(literal);
    }
    if let Some(literal) = signal_call(text)? {
        return Ok(literal);
    }

    Ok(ValueLiteral::Expression(text.to_string()))
}

/// A whole-text `"..."` or `'...'` string. Strings followed by more code are expressions.
fn string_literal(text: &str) -> Result<Option<ValueLiteral>, LiteralError> {
    let Some(quote) = text.chars().next().filter(|&c| c == '"' || c == '\'') else {
        return Ok(None);
    };

    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '\n' => return Err(LiteralError::UnterminatedString),
            c if c == quote => {
                return Ok(if i + c.len_utf8() == text.len() {
                    Some(ValueLiteral::String(text[1..i].to_string()))
                } else {
                    None
                });
            }
            _ => {}
        }
    }
    Err(LiteralError::UnterminatedString)
}

/// A decimal number with optional sign, fraction, exponent and `_` separators.
fn number_literal(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let first = unsigned.chars().next()?;
    if !(first.is_ascii_digit() || (first == '.' && unsigned.len() > 1)) {
        return None;
    }
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '_' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    text.replace('_', "").parse::<f64>().ok()
}

/// A whole-text bracketed literal. `[1, 2].map(f)` is an expression, not an array.
fn bracketed(
    text: &str,
    open: char,
    close: char,
    make: fn(String) -> ValueLiteral,
) -> Result<Option<ValueLiteral>, LiteralError> {
    if !text.starts_with(open) {
        return Ok(None);
    }
    match find_closing(text, open.len_utf8(), close) {
        Some(end) if end + close.len_utf8() == text.len() => Ok(Some(make(text.to_string()))),
        Some(_) => Ok(None),
        None => Err(LiteralError::Unbalanced(open)),
    }
}

/// `signal("key", initial)`, with a string key and a nested literal.
fn signal_call(text: &str) -> Result<Option<ValueLiteral>, LiteralError> {
    let Some(rest) = text.strip_prefix("signal") else {
        return Ok(None);
    };
    let rest = rest.trim_start();
    if !rest.starts_with('(') {
        return Ok(None);
    }
    let open = text.len() - rest.len();
    let close = match find_closing(text, open + 1, ')') {
        Some(close) if close + 1 == text.len() => close,
        Some(_) => return Ok(None),
        None => return Err(LiteralError::Unbalanced('(')),
    };

    let args: Vec<&str> = split_top_level(&text[open + 1..close], ',')
        .into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .collect();
    let (key, initial) = match args.as_slice() {
        [key] => (*key, ValueLiteral::Null),
        [key, initial] => (*key, classify(initial)?),
        _ => {
            return Err(LiteralError::Invalid(format!(
                "signal() takes a key and an initial value, found {} arguments",
                args.len()
            )))
        }
    };

    let key = match string_literal(key)? {
        Some(ValueLiteral::String(key)) => key,
        _ => {
            return Err(LiteralError::Invalid(
                "signal key must be a string literal".to_string(),
            ))
        }
    };
    if matches!(initial, ValueLiteral::Signal { .. }) {
        return Err(LiteralError::Invalid(
            "signal initial value cannot be another signal".to_string(),
        ));
    }

    Ok(Some(ValueLiteral::Signal {
        key,
        initial: Box::new(initial),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars() {
        assert_eq!(classify("0"), Ok(ValueLiteral::Number(0.0)));
        assert_eq!(classify("-1.5e3"), Ok(ValueLiteral::Number(-1500.0)));
        assert_eq!(classify("1_000"), Ok(ValueLiteral::Number(1000.0)));
        assert_eq!(classify("1e999"), Ok(ValueLiteral::Number(f64::INFINITY)));
        assert_eq!(classify("true"), Ok(ValueLiteral::Boolean(true)));
        assert_eq!(classify("~"), Ok(ValueLiteral::Null));
        assert_eq!(
            classify("'it\\'s'"),
            Ok(ValueLiteral::String("it\\'s".to_string()))
        );
    }

    #[test]
    fn test_string_followed_by_code_is_expression() {
        assert_eq!(
            classify("\"a\" + b"),
            Ok(ValueLiteral::Expression("\"a\" + b".to_string()))
        );
    }

    #[test]
    fn test_collections() {
        assert_eq!(
            classify("[1, [2], 3]"),
            Ok(ValueLiteral::Array("[1, [2], 3]".to_string()))
        );
        assert_eq!(
            classify("{ a: 1 }"),
            Ok(ValueLiteral::Object("{ a: 1 }".to_string()))
        );
        assert_eq!(
            classify("[1, 2].map(f)"),
            Ok(ValueLiteral::Expression("[1, 2].map(f)".to_string()))
        );
        assert_eq!(classify("[1, 2"), Err(LiteralError::Unbalanced('[')));
    }

    #[test]
    fn test_signal() {
        assert_eq!(
            classify("signal(\"theme\", 'light')"),
            Ok(ValueLiteral::Signal {
                key: "theme".to_string(),
                initial: Box::new(ValueLiteral::String("light".to_string())),
            })
        );
        assert!(matches!(
            classify("signal(theme, 1)"),
            Err(LiteralError::Invalid(_))
        ));
        assert_eq!(
            classify("signals.get()"),
            Ok(ValueLiteral::Expression("signals.get()".to_string()))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(classify("   "), Err(LiteralError::Missing));
        assert_eq!(classify("\"open"), Err(LiteralError::UnterminatedString));
    }

    #[test]
    fn test_non_numbers() {
        assert_eq!(
            classify("Infinity"),
            Ok(ValueLiteral::Expression("Infinity".to_string()))
        );
        assert_eq!(
            classify("1 + 2"),
            Ok(ValueLiteral::Expression("1 + 2".to_string()))
        );
    }
}
