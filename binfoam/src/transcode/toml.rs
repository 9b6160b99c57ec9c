//! TOML transcoding: render a dictionary tree as TOML text.
//!
//! Mapping from dictionary values to TOML:
//!   - FoamFile header       -> `[FoamFile]` table
//!   - Value::Dict           -> TOML table (inline table inside arrays)
//!   - positional keys       -> keys spelled as their index
//!   - Value::Scalar         -> TOML integer or float
//!   - Value::Word           -> TOML string
//!   - Value::String         -> TOML string (quotes dropped)
//!   - Value::Aggregate      -> TOML array of numbers
//!   - Value::Dimension      -> TOML array of seven exponents
//!   - Value::Field          -> `{uniform = v}` or `{nonuniform = name, values = v}`
//!   - Value::List / Tuple   -> TOML array
//!   - Value::UnparsedList   -> `{length = n, data = text}`
//!   - Value::Unparsed       -> TOML string (raw text)
//!   - Value::Reaction       -> TOML string
//!   - Value::Directive      -> TOML string (directive text)
//!
//! TOML requires a table at the top level, so only dictionary bodies
//! can be encoded.

use libfoam::{FoamDict, Scalar, Value};
use toml_edit::{Array, DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode an optional header and a dictionary body as a TOML string.
pub fn encode(header: Option<&FoamDict>, body: &Value) -> Result<String, String> {
    let dict = body
        .as_dict()
        .ok_or_else(|| "TOML requires the top-level value to be a table".to_string())?;
    let mut doc = DocumentMut::new();
    if let Some(header) = header {
        doc["FoamFile"] = Item::Table(dict_to_table(header)?);
    }
    for (key, value) in dict.iter() {
        doc[&key.to_string()] = value_to_item(value)?;
    }
    Ok(doc.to_string())
}

fn dict_to_table(dict: &FoamDict) -> Result<Table, String> {
    let mut table = Table::new();
    for (key, value) in dict.iter() {
        table.insert(&key.to_string(), value_to_item(value)?);
    }
    Ok(table)
}

fn value_to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::Dict(dict) => Ok(Item::Table(dict_to_table(dict)?)),
        other => Ok(Item::Value(value_to_toml(other)?)),
    }
}

fn scalar_to_toml(s: &Scalar) -> toml_edit::Value {
    match s {
        Scalar::Int(i) => toml_edit::Value::Integer(Formatted::new(*i)),
        Scalar::Float(f) => toml_edit::Value::Float(Formatted::new(*f)),
    }
}

fn scalars_to_toml(scalars: &[Scalar]) -> toml_edit::Value {
    let mut arr = Array::new();
    for s in scalars {
        arr.push(scalar_to_toml(s));
    }
    toml_edit::Value::Array(arr)
}

fn string(s: &str) -> toml_edit::Value {
    toml_edit::Value::String(Formatted::new(s.to_string()))
}

/// Values nested inside arrays or inline tables cannot be standard
/// tables, so dictionaries become inline tables here.
fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    Ok(match value {
        Value::Scalar(s) => scalar_to_toml(s),
        Value::Word(w) => string(w),
        Value::String(s) => string(s),
        Value::Aggregate(a) => scalars_to_toml(a.components()),
        Value::Dimension(d) => scalars_to_toml(d.exponents()),
        Value::Field(f) => {
            let mut inline = InlineTable::new();
            if f.is_uniform() {
                inline.insert("uniform", value_to_toml(f.value())?);
            } else {
                inline.insert("nonuniform", string(f.name().unwrap_or_default()));
                inline.insert("values", value_to_toml(f.value())?);
            }
            toml_edit::Value::InlineTable(inline)
        }
        Value::List(items) | Value::Tuple(items) => {
            let mut arr = Array::new();
            for item in items {
                arr.push(value_to_toml(item)?);
            }
            toml_edit::Value::Array(arr)
        }
        Value::UnparsedList(u) => {
            let length = i64::try_from(u.length)
                .map_err(|_| format!("List length {} too large for TOML (i64)", u.length))?;
            let mut inline = InlineTable::new();
            inline.insert("length", toml_edit::Value::Integer(Formatted::new(length)));
            inline.insert("data", string(&u.data));
            toml_edit::Value::InlineTable(inline)
        }
        Value::Unparsed(raw) => string(raw),
        Value::Dict(dict) => {
            let mut inline = InlineTable::new();
            for (key, v) in dict.iter() {
                inline.insert(&key.to_string(), value_to_toml(v)?);
            }
            toml_edit::Value::InlineTable(inline)
        }
        Value::Reaction(text) => string(text),
        Value::Directive(d) => string(&d.to_string()),
    })
}
