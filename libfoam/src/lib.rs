//! Reader and writer for OpenFOAM-style dictionary files.
//!
//! A dictionary file is an optional `FoamFile { ... }` header followed by a
//! body of `key value;` entries, nested `{ }` dictionaries, lists, dimension
//! sets, `uniform` / `nonuniform` fields and `#` directives. This crate
//! parses such files into a [`Value`] tree and writes trees back out so
//! that parsing the output yields an equal tree.
//!
//! # Parsing Pipeline
//!
//! The parser operates in three phases:
//!
//! 1. **Tokenizer**: Converts source text into tokens on demand; long
//!    length-prefixed lists can be captured as one raw span.
//!
//! 2. **Parser**: Recursive descent over the token stream, building ordered
//!    dictionaries and expanding `#include` / `$name` when asked to.
//!
//! 3. **Generator**: Writes the tree back as dictionary text.
//!
//! [`ParameterFile`] ties the phases to a file on disk.

mod dict;
mod encode;
mod error;
mod file;
mod lexer;
mod options;
mod parser;
mod value;

pub use dict::{FoamDict, Key};
pub use encode::{encode, encode_value, FILE_BANNER};
pub use error::{FoamError, ParseContext, Result, SourceContext};
pub use file::{BoundaryFile, HeaderFile, ParameterFile, ParameterFileBuilder, WriteParameterFile};
pub use lexer::{Lexer, Token, TokenKind};
pub use options::{ParseOptions, StartMode, DEFAULT_MAX_INCLUDE_DEPTH};
pub use parser::Parsed;
pub use value::{
    Aggregate, Dimension, Directive, Field, InputMode, Scalar, UnparsedList, Value,
};

use std::path::{Path, PathBuf};

/// Parse a dictionary document from a string.
///
/// # Example
///
/// ```
/// use libfoam::{parse, ParseOptions, Value};
///
/// let parsed = parse("a 1; b (1 2 3);", &ParseOptions::default()).unwrap();
/// let body = parsed.body.as_dict().unwrap();
/// assert_eq!(body.get("a"), Some(&Value::from(1)));
/// ```
pub fn parse(input: &str, options: &ParseOptions) -> Result<Parsed> {
    parse_with_filename(input, None, options)
}

/// Parse a dictionary document with a filename for error messages.
/// Relative `#include` paths resolve against the file's directory.
pub fn parse_with_filename(
    input: &str,
    filename: Option<&str>,
    options: &ParseOptions,
) -> Result<Parsed> {
    let ctx = ParseContext::new(filename);
    let base_dir = filename
        .and_then(|f| Path::new(f).parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    parser::parse_document(input, options, &ctx, &base_dir, 0).map_err(|e| e.with_context(&ctx))
}

/// Parse a headerless dictionary body.
pub fn parse_str(input: &str) -> Result<FoamDict> {
    let parsed = parse(input, &ParseOptions::default().with_no_header())?;
    Ok(parsed.into_dict().unwrap_or_default())
}

/// Parse the text of a single entry value, e.g. `uniform (1 0 0)`.
pub fn parse_value(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let source = if trimmed.starts_with('{') {
        format!("value {}", trimmed)
    } else {
        format!("value {};", trimmed)
    };
    let mut dict = parse_str(&source)?;
    Ok(dict.remove("value").unwrap_or(Value::Tuple(Vec::new())))
}

/// Encode a whole file: banner, optional header and body.
pub fn encode_file(header: Option<&FoamDict>, body: &Value) -> Result<String> {
    Ok(format!("{}{}", FILE_BANNER, encode(header, body)?))
}
