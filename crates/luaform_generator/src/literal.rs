//! Text of number and string literals.

use luaform_ast::{NumberValue, StringLiteral, StringStyle};

/// Tokens that spell a number value.
///
/// Lua has no negative or non-finite literals, so those are written as
/// parenthesized expressions.
pub(crate) fn number_tokens(value: NumberValue) -> Vec<String> {
    match value {
        NumberValue::Integer(i64::MIN) => to_tokens(&["(", "-", "9223372036854775807", "-", "1", ")"]),
        NumberValue::Integer(value) if value < 0 => {
            vec!["(".into(), "-".into(), value.unsigned_abs().to_string(), ")".into()]
        }
        NumberValue::Integer(value) => vec![value.to_string()],
        NumberValue::Float(value) if value.is_nan() => to_tokens(&["(", "0", "/", "0", ")"]),
        NumberValue::Float(value) if value == f64::INFINITY => to_tokens(&["(", "1", "/", "0", ")"]),
        NumberValue::Float(value) if value == f64::NEG_INFINITY => {
            to_tokens(&["(", "-", "1", "/", "0", ")"])
        }
        NumberValue::Float(value) if value.is_sign_negative() => {
            vec!["(".into(), "-".into(), format_float(-value), ")".into()]
        }
        NumberValue::Float(value) => vec![format_float(value)],
    }
}

fn to_tokens(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Shortest text that reads back as the same float, always float-typed.
pub(crate) fn format_float(value: f64) -> String {
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// Source text of a string literal.
pub(crate) fn string_text(literal: &StringLiteral) -> String {
    if literal.style == StringStyle::Escaped {
        return escaped(&literal.value);
    }
    if let Some(raw) = &literal.raw {
        return raw.clone();
    }
    let has_double = literal.value.contains(&b'"');
    let has_single = literal.value.contains(&b'\'');
    match literal.style {
        StringStyle::Long { level } => long_bracket(&literal.value, level)
            .unwrap_or_else(|| quoted(&literal.value, b'"')),
        StringStyle::Single if has_single && !has_double => quoted(&literal.value, b'"'),
        StringStyle::Single => quoted(&literal.value, b'\''),
        _ if has_double && !has_single => quoted(&literal.value, b'\''),
        _ => quoted(&literal.value, b'"'),
    }
}

fn quoted(value: &[u8], quote: u8) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(char::from(quote));
    for chunk in value.utf8_chunks() {
        for c in chunk.valid().chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_ascii_control() => push_decimal_escape(&mut out, c as u8),
                c if c == char::from(quote) => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        for &byte in chunk.invalid() {
            push_decimal_escape(&mut out, byte);
        }
    }
    out.push(char::from(quote));
    out
}

/// Three digits, so a following digit is never read as part of the escape.
fn push_decimal_escape(out: &mut String, byte: u8) {
    out.push_str(&format!("\\{byte:03}"));
}

fn escaped(value: &[u8]) -> String {
    let mut out = String::with_capacity(value.len() * 4 + 2);
    out.push('"');
    for byte in value {
        out.push_str(&format!("\\x{byte:02x}"));
    }
    out.push('"');
    out
}

/// Long bracket form at the lowest level `>= level` that keeps the content
/// intact. Returns `None` when the content cannot be written literally.
fn long_bracket(value: &[u8], level: usize) -> Option<String> {
    let text = std::str::from_utf8(value).ok()?;
    // Carriage returns are normalized by the lexer.
    if text.contains('\r') {
        return None;
    }

    let mut level = level;
    let equals = loop {
        let equals = "=".repeat(level);
        let close = format!("]{equals}]");
        let candidate = format!("{text}{close}");
        if candidate.find(&close) == Some(text.len()) {
            break equals;
        }
        level += 1;
    };
    // The lexer drops a newline right after the opening bracket.
    let newline = if text.starts_with('\n') { "\n" } else { "" };
    Some(format!("[{equals}[{newline}{text}]{equals}]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn literal(value: &[u8], style: StringStyle) -> StringLiteral {
        StringLiteral {
            value: value.to_vec(),
            raw: None,
            style,
        }
    }

    #[rstest]
    #[case::integer(NumberValue::Integer(42), "42")]
    #[case::negative_integer(NumberValue::Integer(-3), "(-3)")]
    #[case::min_integer(NumberValue::Integer(i64::MIN), "(-9223372036854775807-1)")]
    #[case::integral_float(NumberValue::Float(3.0), "3.0")]
    #[case::fraction(NumberValue::Float(0.1), "0.1")]
    #[case::large_float(NumberValue::Float(1e100), "1e100")]
    #[case::negative_float(NumberValue::Float(-2.5), "(-2.5)")]
    #[case::infinity(NumberValue::Float(f64::INFINITY), "(1/0)")]
    #[case::nan(NumberValue::Float(f64::NAN), "(0/0)")]
    fn test_number_tokens(#[case] value: NumberValue, #[case] expected: &str) {
        assert_eq!(number_tokens(value).concat(), expected);
    }

    #[rstest]
    #[case::plain(b"hi", StringStyle::Double, r#""hi""#)]
    #[case::single(b"hi", StringStyle::Single, "'hi'")]
    #[case::avoids_escaping_quote(b"say \"x\"", StringStyle::Double, r#"'say "x"'"#)]
    #[case::both_quotes(b"'\"", StringStyle::Double, r#""'\"""#)]
    #[case::control(b"a\nb\x01", StringStyle::Double, r#""a\nb\001""#)]
    #[case::invalid_utf8(b"\xff1", StringStyle::Double, r#""\2551""#)]
    #[case::unicode("é".as_bytes(), StringStyle::Double, "\"é\"")]
    #[case::escaped(b"AB", StringStyle::Escaped, r#""\x41\x42""#)]
    #[case::long(b"a]]b", StringStyle::Long { level: 0 }, "[=[a]]b]=]")]
    #[case::long_trailing_bracket(b"a]", StringStyle::Long { level: 0 }, "[=[a]]=]")]
    #[case::long_leading_newline(b"\nx", StringStyle::Long { level: 1 }, "[=[\n\nx]=]")]
    #[case::long_with_carriage_return(b"a\rb", StringStyle::Long { level: 0 }, r#""a\rb""#)]
    fn test_string_text(#[case] value: &[u8], #[case] style: StringStyle, #[case] expected: &str) {
        assert_eq!(string_text(&literal(value, style)), expected);
    }

    #[test]
    fn test_raw_text_is_reused() {
        let mut string = literal(b"x", StringStyle::Single);
        string.raw = Some("'\\120'".to_string());
        assert_eq!(string_text(&string), "'\\120'");

        string.style = StringStyle::Escaped;
        assert_eq!(string_text(&string), r#""\x78""#);
    }
}
