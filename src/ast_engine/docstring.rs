//! Docstring detection and evaluation for Python blocks.
//!
//! A docstring is the value of a bare `str` literal that is the first
//! statement of a body. Byte strings and f-strings do not count. The value is
//! the evaluated literal, cleaned like `inspect.cleandoc`.

use tree_sitter::Node;

const TAB_SIZE: usize = 8;

/// Extract the docstring of a `block` node, if it has one.
pub fn from_block(block: Node, source: &str) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }

    let literal = first.named_child(0)?;
    let value = string_value(literal, source)?;
    Some(clean(&value))
}

/// Evaluate a `string` or `concatenated_string` node to its `str` value.
fn string_value(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "string" => parse_literal(&source[node.byte_range()]),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let mut value = String::new();
            for part in node.named_children(&mut cursor) {
                if part.kind() == "comment" {
                    continue;
                }
                if part.kind() != "string" {
                    return None;
                }
                value.push_str(&parse_literal(&source[part.byte_range()])?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Evaluate a single string literal, prefix and quotes included.
///
/// Returns `None` for bytes and f-string literals.
pub fn parse_literal(raw: &str) -> Option<String> {
    let prefix_len = raw
        .find(|c: char| c == '"' || c == '\'')
        .filter(|&n| raw[..n].chars().all(|c| c.is_ascii_alphabetic()))?;
    let prefix = raw[..prefix_len].to_ascii_lowercase();
    if prefix.contains('b') || prefix.contains('f') || prefix.contains('t') {
        return None;
    }

    let quoted = &raw[prefix_len..];
    let quote = if quoted.starts_with("\"\"\"") {
        "\"\"\""
    } else if quoted.starts_with("'''") {
        "'''"
    } else {
        &quoted[..1]
    };

    if quoted.len() < quote.len() * 2 || !quoted.ends_with(quote) {
        return None;
    }
    let body = &quoted[quote.len()..quoted.len() - quote.len()];

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

/// Decode backslash escapes of a non-raw `str` literal.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };

        match escape {
            // line continuation
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0B}'),
            '0'..='7' => {
                let mut code = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(code));
            }
            'x' => push_hex_escape(&mut out, &mut chars, escape, 2),
            'u' => push_hex_escape(&mut out, &mut chars, escape, 4),
            'U' => push_hex_escape(&mut out, &mut chars, escape, 8),
            other => {
                // Unknown escapes (including \N{...}) are kept as written.
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_hex_escape(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    escape: char,
    width: usize,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            }
            _ => break,
        }
    }

    match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
        Some(decoded) if digits.len() == width => out.push(decoded),
        _ => {
            out.push('\\');
            out.push(escape);
            out.push_str(&digits);
        }
    }
}

/// Normalize indentation the way `inspect.cleandoc` does.
pub fn clean(doc: &str) -> String {
    let mut lines: Vec<String> = doc.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            (!content.is_empty()).then(|| line.chars().count() - content.chars().count())
        })
        .min();

    if let Some(first) = lines.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(margin) = margin {
        for line in lines.iter_mut().skip(1) {
            *line = line.chars().skip(margin).collect();
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let leading = lines.iter().take_while(|l| l.is_empty()).count();

    lines[leading..].join("\n")
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}
