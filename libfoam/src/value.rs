//! Dictionary value representation.

use crate::dict::FoamDict;
use crate::error::{FoamError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Index, IndexMut};

/// A number: label or floating point.
///
/// Scalars compare numerically, so `Int(1) == Float(1.0)`.
#[derive(Clone, Copy, Debug)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    /// Numeric value as a float.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Scalar::Int(i) => i as f64,
            Scalar::Float(f) => f,
        }
    }

    /// Integer value, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Scalar::Int(i) => Some(i),
            Scalar::Float(_) => None,
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// Floats always print with a `.` or an exponent so they re-read as floats.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

/// Fixed-arity numeric aggregate.
#[derive(Clone, Debug, PartialEq)]
pub enum Aggregate {
    Vector([Scalar; 3]),
    Tensor([Scalar; 9]),
    SymmTensor([Scalar; 6]),
}

impl Aggregate {
    /// Build the aggregate whose arity matches `components` (3, 9 or 6).
    pub fn from_components(components: &[Scalar]) -> Option<Self> {
        match components.len() {
            3 => components.try_into().ok().map(Aggregate::Vector),
            9 => components.try_into().ok().map(Aggregate::Tensor),
            6 => components.try_into().ok().map(Aggregate::SymmTensor),
            _ => None,
        }
    }

    pub fn components(&self) -> &[Scalar] {
        match self {
            Aggregate::Vector(c) => c,
            Aggregate::Tensor(c) => c,
            Aggregate::SymmTensor(c) => c,
        }
    }

    pub fn components_mut(&mut self) -> &mut [Scalar] {
        match self {
            Aggregate::Vector(c) => c,
            Aggregate::Tensor(c) => c,
            Aggregate::SymmTensor(c) => c,
        }
    }

    /// OpenFOAM type name of the aggregate.
    pub fn type_name(&self) -> &'static str {
        match self {
            Aggregate::Vector(_) => "vector",
            Aggregate::Tensor(_) => "tensor",
            Aggregate::SymmTensor(_) => "symmTensor",
        }
    }
}

impl Index<usize> for Aggregate {
    type Output = Scalar;

    fn index(&self, i: usize) -> &Scalar {
        &self.components()[i]
    }
}

impl IndexMut<usize> for Aggregate {
    fn index_mut(&mut self, i: usize) -> &mut Scalar {
        &mut self.components_mut()[i]
    }
}

/// Physical dimension exponents: mass, length, time, temperature,
/// quantity, current, luminous intensity.
#[derive(Clone, Debug, PartialEq)]
pub struct Dimension([Scalar; 7]);

impl Dimension {
    /// Build from exactly seven exponents.
    pub fn new(exponents: &[Scalar]) -> Result<Self> {
        let dims: [Scalar; 7] =
            exponents
                .try_into()
                .map_err(|_| FoamError::MalformedDimension {
                    count: exponents.len(),
                    line: 0,
                    file: None,
                })?;
        Ok(Dimension(dims))
    }

    /// Dimensionless set.
    pub fn dimensionless() -> Self {
        Dimension([Scalar::Int(0); 7])
    }

    pub fn exponents(&self) -> &[Scalar; 7] {
        &self.0
    }
}

impl Index<usize> for Dimension {
    type Output = Scalar;

    fn index(&self, i: usize) -> &Scalar {
        &self.0[i]
    }
}

impl IndexMut<usize> for Dimension {
    fn index_mut(&mut self, i: usize) -> &mut Scalar {
        &mut self.0[i]
    }
}

/// Field value: one constant (`uniform`) or a per-element list
/// (`nonuniform`) tagged with its list type name.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    uniform: bool,
    name: Option<String>,
    value: Box<Value>,
}

impl Field {
    /// `uniform <value>`.
    pub fn uniform(value: Value) -> Self {
        Self {
            uniform: true,
            name: None,
            value: Box::new(value),
        }
    }

    /// `nonuniform <name> <list>`.
    pub fn nonuniform(name: impl Into<String>, value: Value) -> Self {
        Self {
            uniform: false,
            name: Some(name.into()),
            value: Box::new(value),
        }
    }

    /// Build a field from its parts, enforcing that only non-uniform
    /// fields carry a type name.
    pub fn new(value: Value, uniform: bool, name: Option<String>) -> Result<Self> {
        match (uniform, &name) {
            (true, Some(n)) => Err(FoamError::ShapeInvariant(format!(
                "uniform field cannot carry type name '{}'",
                n
            ))),
            (false, None) => Err(FoamError::ShapeInvariant(
                "nonuniform field requires a type name".to_string(),
            )),
            _ => Ok(Self {
                uniform,
                name,
                value: Box::new(value),
            }),
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// List type name after `nonuniform` (`None` when uniform).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        *self.value
    }

    /// Turn into a uniform field holding `value`; clears the type name.
    pub fn set_uniform(&mut self, value: Value) {
        self.uniform = true;
        self.name = None;
        self.value = Box::new(value);
    }

    /// Element `i` of a non-uniform field's parsed list.
    pub fn get(&self, i: usize) -> Option<&Value> {
        if self.uniform {
            return None;
        }
        self.value.as_list()?.get(i)
    }

    /// Mutable element `i` of a non-uniform field's parsed list.
    pub fn get_mut(&mut self, i: usize) -> Option<&mut Value> {
        if self.uniform {
            return None;
        }
        self.value.as_list_mut()?.get_mut(i)
    }

    /// Check the uniform/name pairing and the shape of the wrapped value.
    pub fn validate(&self) -> Result<()> {
        match (self.uniform, &self.name) {
            (true, Some(_)) | (false, None) => {
                return Err(FoamError::ShapeInvariant(
                    "field type name must be present exactly when nonuniform".to_string(),
                ))
            }
            _ => {}
        }
        let ok = if self.uniform {
            matches!(*self.value, Value::Scalar(_) | Value::Aggregate(_))
        } else {
            matches!(*self.value, Value::List(_) | Value::UnparsedList(_))
        };
        if ok {
            Ok(())
        } else {
            Err(FoamError::ShapeInvariant(format!(
                "{} field cannot hold a {}",
                if self.uniform { "uniform" } else { "nonuniform" },
                self.value.kind_name()
            )))
        }
    }
}

/// A length-prefixed list kept as raw text instead of parsed elements.
#[derive(Clone, Debug)]
pub struct UnparsedList {
    pub length: usize,
    /// Text between the outer parentheses, byte-for-byte.
    pub data: String,
}

impl UnparsedList {
    pub fn new(length: usize, data: impl Into<String>) -> Self {
        Self {
            length,
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Compares the raw spans only.
impl PartialEq for UnparsedList {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

/// `#inputMode` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Error,
    Default,
    Merge,
    Overwrite,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Error => "error",
            InputMode::Default => "default",
            InputMode::Merge => "merge",
            InputMode::Overwrite => "overwrite",
        }
    }
}

/// A `#`-prefixed control line.
#[derive(Clone, Debug, PartialEq)]
pub enum Directive {
    /// `#include "path"`; `expanded` is set once its bindings were merged.
    Include { path: String, expanded: bool },
    /// `#inputMode <mode>`.
    InputMode(InputMode),
    /// `#remove word` or `#remove ( words )`.
    Remove { words: Vec<String>, listed: bool },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Include { path, .. } => write!(f, "#include \"{}\"", path),
            Directive::InputMode(mode) => write!(f, "#inputMode {}", mode.as_str()),
            Directive::Remove { words, listed } => {
                if *listed {
                    write!(f, "#remove ( ")?;
                    for w in words {
                        write!(f, "{} ", w)?;
                    }
                    write!(f, ")")
                } else {
                    write!(f, "#remove {}", words.join(" "))
                }
            }
        }
    }
}

/// A dictionary value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Integer or floating-point number.
    Scalar(Scalar),
    /// Bare word, including `$name` references left unexpanded.
    Word(String),
    /// Double-quoted string; holds the text between the quotes verbatim.
    String(String),
    /// Vector, tensor or symmetric tensor.
    Aggregate(Aggregate),
    /// `[ ... ]` dimension set.
    Dimension(Dimension),
    /// `uniform` / `nonuniform` field value.
    Field(Field),
    /// Parsed list of arbitrary values.
    List(Vec<Value>),
    /// Length-prefixed list kept as raw text.
    UnparsedList(UnparsedList),
    /// Raw captured text without a declared length.
    Unparsed(String),
    /// Nested dictionary.
    Dict(FoamDict),
    /// Several juxtaposed items before one `;`.
    Tuple(Vec<Value>),
    /// A list line of the form `lhs = rhs ...`, kept verbatim.
    Reaction(String),
    /// A directive line stored under a positional key.
    Directive(Directive),
}

impl Value {
    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Word(_) => "word",
            Value::String(_) => "string",
            Value::Aggregate(a) => a.type_name(),
            Value::Dimension(_) => "dimension",
            Value::Field(_) => "field",
            Value::List(_) => "list",
            Value::UnparsedList(_) => "unparsed list",
            Value::Unparsed(_) => "unparsed",
            Value::Dict(_) => "dictionary",
            Value::Tuple(_) => "tuple",
            Value::Reaction(_) => "reaction",
            Value::Directive(_) => "directive",
        }
    }

    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar()?.as_i64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().map(|s| s.as_f64())
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Value::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Text of a word or the content of a quoted string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Word(s) | Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            Value::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dimension(&self) -> Option<&Dimension> {
        match self {
            Value::Dimension(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Value::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            Value::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&FoamDict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut FoamDict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Returns `true` for numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Child value addressed by one path segment: a key for dictionaries,
    /// a numeric index for lists, tuples and non-uniform fields.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Dict(d) => d.get_segment(segment),
            Value::List(items) | Value::Tuple(items) => items.get(segment.parse::<usize>().ok()?),
            Value::Field(f) => f.get(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    /// Mutable variant of [`Value::child`].
    pub fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        match self {
            Value::Dict(d) => d.get_segment_mut(segment),
            Value::List(items) | Value::Tuple(items) => {
                items.get_mut(segment.parse::<usize>().ok()?)
            }
            Value::Field(f) => f.get_mut(segment.parse::<usize>().ok()?),
            _ => None,
        }
    }

    /// Descend by path segments; an empty path addresses `self`.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        path.iter().try_fold(self, |v, seg| v.child(seg))
    }

    /// Mutable variant of [`Value::get_path`].
    pub fn get_path_mut(&mut self, path: &[&str]) -> Option<&mut Value> {
        let mut current = self;
        for seg in path {
            current = current.child_mut(seg)?;
        }
        Some(current)
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Scalar(Scalar::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

/// Strings become bare words; use `Value::String` for quoted text.
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Word(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Word(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<FoamDict> for Value {
    fn from(d: FoamDict) -> Self {
        Value::Dict(d)
    }
}

impl From<Aggregate> for Value {
    fn from(a: Aggregate) -> Self {
        Value::Aggregate(a)
    }
}

impl From<Dimension> for Value {
    fn from(d: Dimension) -> Self {
        Value::Dimension(d)
    }
}

impl From<Field> for Value {
    fn from(f: Field) -> Self {
        Value::Field(f)
    }
}
