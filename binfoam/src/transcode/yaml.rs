//! YAML transcoding: render a dictionary tree as YAML text.
//!
//! Mapping from dictionary values to YAML:
//!   - FoamFile header       -> mapping under the `FoamFile` key
//!   - Value::Dict           -> YAML mapping, in entry order
//!   - positional keys       -> integer mapping keys
//!   - Value::Scalar         -> YAML integer or float
//!   - Value::Word           -> YAML string
//!   - Value::String         -> YAML string (quotes dropped)
//!   - Value::Aggregate      -> YAML sequence of numbers
//!   - Value::Dimension      -> YAML sequence of seven exponents
//!   - Value::Field          -> `{uniform: v}` or `{nonuniform: name, values: v}`
//!   - Value::List / Tuple   -> YAML sequence
//!   - Value::UnparsedList   -> `{length: n, data: text}`
//!   - Value::Unparsed       -> YAML string (raw text)
//!   - Value::Reaction       -> YAML string
//!   - Value::Directive      -> YAML string (directive text)

use libfoam::{Dimension, FoamDict, Key, Scalar, Value};
use serde_yaml::{Mapping, Number};

/// Encode an optional header and a body as a YAML string.
pub fn encode(header: Option<&FoamDict>, body: &Value) -> Result<String, String> {
    let yaml_value = match (header, body) {
        (None, body) => value_to_yaml(body),
        (Some(header), Value::Dict(dict)) => {
            let mut map = Mapping::new();
            map.insert(string("FoamFile"), dict_to_yaml(header));
            if let serde_yaml::Value::Mapping(entries) = dict_to_yaml(dict) {
                map.extend(entries);
            }
            serde_yaml::Value::Mapping(map)
        }
        (Some(header), body) => {
            let mut map = Mapping::new();
            map.insert(string("FoamFile"), dict_to_yaml(header));
            map.insert(string("body"), value_to_yaml(body));
            serde_yaml::Value::Mapping(map)
        }
    };
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn string(s: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(s.to_string())
}

fn scalar_to_yaml(s: &Scalar) -> serde_yaml::Value {
    match s {
        Scalar::Int(i) => serde_yaml::Value::Number(Number::from(*i)),
        Scalar::Float(f) => serde_yaml::Value::Number(Number::from(*f)),
    }
}

fn scalars_to_yaml(scalars: &[Scalar]) -> serde_yaml::Value {
    serde_yaml::Value::Sequence(scalars.iter().map(scalar_to_yaml).collect())
}

fn dimension_to_yaml(d: &Dimension) -> serde_yaml::Value {
    scalars_to_yaml(d.exponents())
}

fn dict_to_yaml(dict: &FoamDict) -> serde_yaml::Value {
    let mut map = Mapping::new();
    for (key, value) in dict.iter() {
        let key = match key {
            Key::Name(name) => string(name),
            Key::Index(i) => serde_yaml::Value::Number(Number::from(*i as u64)),
        };
        map.insert(key, value_to_yaml(value));
    }
    serde_yaml::Value::Mapping(map)
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Scalar(s) => scalar_to_yaml(s),
        Value::Word(w) => string(w),
        Value::String(s) => string(s),
        Value::Aggregate(a) => scalars_to_yaml(a.components()),
        Value::Dimension(d) => dimension_to_yaml(d),
        Value::Field(f) => {
            let mut map = Mapping::new();
            if f.is_uniform() {
                map.insert(string("uniform"), value_to_yaml(f.value()));
            } else {
                map.insert(string("nonuniform"), string(f.name().unwrap_or_default()));
                map.insert(string("values"), value_to_yaml(f.value()));
            }
            serde_yaml::Value::Mapping(map)
        }
        Value::List(items) | Value::Tuple(items) => {
            serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect())
        }
        Value::UnparsedList(u) => {
            let mut map = Mapping::new();
            map.insert(string("length"), serde_yaml::Value::Number(Number::from(u.length as u64)));
            map.insert(string("data"), string(&u.data));
            serde_yaml::Value::Mapping(map)
        }
        Value::Unparsed(raw) => string(raw),
        Value::Dict(dict) => dict_to_yaml(dict),
        Value::Reaction(text) => string(text),
        Value::Directive(d) => string(&d.to_string()),
    }
}
