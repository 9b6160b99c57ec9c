//! Phase 3: Generator
//!
//! Writes a header and body back out as dictionary text. The output is
//! meant to be parsed again, not to reproduce the input layout: comments
//! and whitespace are normalized. A length prefix is only written where
//! the list would otherwise be re-read as something else: three, six or
//! nine numbers (which would become an aggregate) and a list directly
//! after an integer (which would swallow the integer as its count).

use crate::dict::{FoamDict, Key};
use crate::error::{FoamError, Result};
use crate::value::{Aggregate, Directive, Field, Scalar, Value};

/// Lists longer than this are written one item per line.
const INLINE_LIMIT: usize = 10;

const INDENT: &str = "    ";

/// Banner written above whole files.
pub const FILE_BANNER: &str = "// -*- C++ -*-\n// File generated by libfoam\n\n";

/// Encode an optional header and a body.
pub fn encode(header: Option<&FoamDict>, body: &Value) -> Result<String> {
    let mut out = String::new();
    encode_header(header, &mut out)?;
    match body {
        Value::Dict(dict) => encode_entries(dict, 0, &mut out)?,
        other => {
            out.push_str(&encode_value(other, 0)?);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Encode an optional header and a list body that always carries `count`
/// as its length prefix, as mesh boundary files do.
pub(crate) fn encode_counted(header: Option<&FoamDict>, items: &[Value], count: usize) -> Result<String> {
    let mut out = String::new();
    encode_header(header, &mut out)?;
    out.push_str(&encode_list(items, 0, Some(count))?);
    out.push('\n');
    Ok(out)
}

/// Encode a single value as it would appear after a key.
pub fn encode_value(value: &Value, indent: usize) -> Result<String> {
    Ok(match value {
        Value::Scalar(s) => s.to_string(),
        Value::Word(w) => w.clone(),
        Value::String(s) => format!("\"{}\"", s),
        Value::Aggregate(a) => encode_aggregate(a),
        Value::Dimension(d) => {
            let parts: Vec<String> = d.exponents().iter().map(|e| e.to_string()).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Field(f) => encode_field(f, indent)?,
        Value::List(items) => encode_list(items, indent, promotion_prefix(items))?,
        Value::UnparsedList(u) => format!("{}({})", u.length, u.data),
        Value::Unparsed(raw) => raw.clone(),
        Value::Dict(dict) => encode_block(dict, indent)?,
        Value::Tuple(items) => encode_sequence(items, indent)?.join(" "),
        Value::Reaction(text) => text.clone(),
        Value::Directive(d) => d.to_string(),
    })
}

fn pad(indent: usize) -> String {
    INDENT.repeat(indent)
}

fn encode_header(header: Option<&FoamDict>, out: &mut String) -> Result<()> {
    if let Some(header) = header {
        out.push_str("FoamFile\n{\n");
        encode_entries(header, 1, out)?;
        out.push_str("}\n\n");
    }
    Ok(())
}

fn encode_entries(dict: &FoamDict, indent: usize, out: &mut String) -> Result<()> {
    let p = pad(indent);
    for (key, value) in dict.iter() {
        match (key, value) {
            (Key::Index(_), Value::Directive(d)) => {
                if matches!(d, Directive::Include { expanded: true, .. }) {
                    out.push_str(&format!("{}// {}\n", p, d));
                } else {
                    out.push_str(&format!("{}{}\n", p, d));
                }
            }
            (Key::Index(_), other) => {
                out.push_str(&format!("{}{}\n", p, encode_value(other, indent)?));
            }
            (Key::Name(name), Value::Dict(inner)) => {
                out.push_str(&format!("{}{}\n{}", p, name, p));
                out.push_str(&encode_block(inner, indent)?);
                out.push('\n');
            }
            (Key::Name(name), Value::Tuple(items)) if items.is_empty() => {
                out.push_str(&format!("{}{};\n", p, name));
            }
            (Key::Name(name), other) => {
                let text = encode_value(other, indent)?;
                let sep = if text.starts_with('\n') { "" } else { " " };
                out.push_str(&format!("{}{}{}{};\n", p, name, sep, text));
            }
        }
    }
    Ok(())
}

/// `{ ... }` with the opening brace at the current position and the
/// closing brace at `indent`.
fn encode_block(dict: &FoamDict, indent: usize) -> Result<String> {
    let mut out = String::from("{\n");
    encode_entries(dict, indent + 1, &mut out)?;
    out.push_str(&pad(indent));
    out.push('}');
    Ok(out)
}

fn encode_aggregate(aggregate: &Aggregate) -> String {
    let parts: Vec<String> = aggregate
        .components()
        .iter()
        .map(|c| c.to_string())
        .collect();
    format!("({})", parts.join(" "))
}

/// Non-uniform values are read without promotion, so a bare list is kept
/// bare.
fn encode_field(field: &Field, indent: usize) -> Result<String> {
    field.validate()?;
    if field.is_uniform() {
        return Ok(format!("uniform {}", encode_value(field.value(), indent)?));
    }
    let name = field
        .name()
        .ok_or_else(|| FoamError::ShapeInvariant("non-uniform field without a name".into()))?;
    let values = match field.value() {
        Value::List(items) => encode_list(items, indent, None)?,
        other => encode_value(other, indent)?,
    };
    Ok(format!("nonuniform {} {}", name, values))
}

/// Three, six or nine numbers in a bare list would be promoted.
fn promotion_prefix(items: &[Value]) -> Option<usize> {
    let promotes = matches!(items.len(), 3 | 6 | 9) && items.iter().all(Value::is_numeric);
    promotes.then_some(items.len())
}

/// Items of a list or tuple. A list right after an integer gets its own
/// count so the integer is not read as that list's length prefix.
fn encode_sequence(items: &[Value], indent: usize) -> Result<Vec<String>> {
    let mut parts = Vec::with_capacity(items.len());
    let mut after_int = false;
    for item in items {
        let text = match item {
            Value::List(list) if after_int => encode_list(list, indent, Some(list.len()))?,
            other => encode_value(other, indent)?,
        };
        after_int = matches!(item, Value::Scalar(Scalar::Int(_)));
        parts.push(text);
    }
    Ok(parts)
}

fn needs_own_line(value: &Value) -> bool {
    matches!(
        value,
        Value::Dict(_)
            | Value::List(_)
            | Value::UnparsedList(_)
            | Value::Reaction(_)
            | Value::Tuple(_)
            | Value::Field(_)
    )
}

fn encode_list(items: &[Value], indent: usize, prefix: Option<usize>) -> Result<String> {
    let prefix = prefix.map(|n| n.to_string()).unwrap_or_default();

    if items.len() <= INLINE_LIMIT && !items.iter().any(needs_own_line) {
        let parts = encode_sequence(items, indent)?;
        return Ok(format!("{}({})", prefix, parts.join(" ")));
    }

    let inner = pad(indent + 1);
    let mut out = format!("{}\n{}(\n", prefix, pad(indent));
    for text in encode_sequence(items, indent + 1)? {
        if !text.starts_with('\n') {
            out.push_str(&inner);
        }
        out.push_str(&text);
        out.push('\n');
    }
    out.push_str(&pad(indent));
    out.push(')');
    Ok(out)
}
