//! Error types for dictionary parsing, generation and file access.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for dictionary operations.
pub type Result<T> = std::result::Result<T, FoamError>;

/// Number of characters shown on each side of an error position.
const CONTEXT_WIDTH: usize = 100;

/// Parse context carrying the filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }
}

/// Format a location suffix for error messages.
fn location(line: &usize, offset: &usize, file: &Option<String>) -> String {
    match file {
        Some(name) => format!(" at line {}, offset {} of <{}>", line, offset, name),
        None => format!(" at line {}, offset {}", line, offset),
    }
}

fn line_suffix(line: &usize, file: &Option<String>) -> String {
    match file {
        Some(name) => format!(" on line {} of <{}>", line, name),
        None if *line > 0 => format!(" on line {}", line),
        None => String::new(),
    }
}

/// Source text surrounding the position of a syntax error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceContext {
    /// Up to 100 characters before the offending character.
    pub before: String,
    /// The offending character (empty at end of input).
    pub at: String,
    /// Up to 100 characters after the offending character.
    pub after: String,
}

impl SourceContext {
    /// Cut the context window around byte `offset` of `source`.
    pub fn capture(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset.min(source.len()));
        let head = &source[..offset];
        let tail = &source[offset..];

        let before_start = head
            .char_indices()
            .rev()
            .nth(CONTEXT_WIDTH - 1)
            .map_or(0, |(i, _)| i);
        let mut tail_chars = tail.chars();
        let at = tail_chars.next().map(String::from).unwrap_or_default();
        let after: String = tail_chars.take(CONTEXT_WIDTH).collect();

        Self {
            before: head[before_start..].to_string(),
            at,
            after,
        }
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------")?;
        writeln!(f, "{}", self.before)?;
        writeln!(f, "------")?;
        writeln!(f, ">{}<", self.at)?;
        writeln!(f, "------")?;
        writeln!(f, "{}", self.after)?;
        write!(f, "------")
    }
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Error type for the dictionary core.
#[derive(Error, Debug)]
pub enum FoamError {
    /// A character that starts no token.
    #[error("Illegal character {ch:?}{}", location(.line, .offset, .file))]
    Lexical {
        ch: char,
        line: usize,
        offset: usize,
        file: Option<String>,
    },

    /// A string literal or block comment that never ends.
    #[error("Unterminated {what}{}", location(.line, .offset, .file))]
    Unterminated {
        what: &'static str,
        line: usize,
        offset: usize,
        file: Option<String>,
    },

    /// A token that no production accepts.
    #[error("Syntax error at token {found:?} (Type: {kind}){}", location(.line, .offset, .file))]
    Syntax {
        found: String,
        kind: &'static str,
        line: usize,
        offset: usize,
        file: Option<String>,
        context: SourceContext,
    },

    /// A dimension set with neither 7 nor 5 exponents.
    #[error("Dimension needs 7 exponents (or the legacy 5), got {count}{}", line_suffix(.line, .file))]
    MalformedDimension {
        count: usize,
        line: usize,
        file: Option<String>,
    },

    /// A `$name` reference with no binding in scope (strict policy only).
    #[error("Symbol '{name}' not found{}", line_suffix(.line, .file))]
    UnresolvedSubstitution {
        name: String,
        line: usize,
        file: Option<String>,
    },

    /// An `#include` target that cannot be read.
    #[error("Cannot read included file {}: {source}", .path.display())]
    IncludeResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Includes nested deeper than the configured limit.
    #[error("Include depth exceeds {limit} at {}", .path.display())]
    RecursionLimit { limit: usize, path: PathBuf },

    /// More than one start mode selected in the parse options.
    #[error("Only one start symbol can be specified, {0} are specified")]
    ConflictingStartModes(usize),

    /// A value whose shape breaks a model invariant.
    #[error("Shape invariant violated: {0}")]
    ShapeInvariant(String),

    /// Dictionary-style write on a body that is not a dictionary.
    #[error("Body is not a dictionary")]
    NotADictionary,

    /// File access failure in the file wrapper.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FoamError {
    /// Line the error was detected on, when it is tied to a position.
    pub fn line(&self) -> Option<usize> {
        match self {
            FoamError::Lexical { line, .. }
            | FoamError::Unterminated { line, .. }
            | FoamError::Syntax { line, .. }
            | FoamError::MalformedDimension { line, .. }
            | FoamError::UnresolvedSubstitution { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Attach the file name of `ctx` to positional errors that lack one.
    pub fn with_context(self, ctx: &ParseContext) -> Self {
        let fill = |file: Option<String>| file.or_else(|| ctx.filename.clone());
        match self {
            FoamError::Lexical {
                ch,
                line,
                offset,
                file,
            } => FoamError::Lexical {
                ch,
                line,
                offset,
                file: fill(file),
            },
            FoamError::Unterminated {
                what,
                line,
                offset,
                file,
            } => FoamError::Unterminated {
                what,
                line,
                offset,
                file: fill(file),
            },
            FoamError::Syntax {
                found,
                kind,
                line,
                offset,
                file,
                context,
            } => FoamError::Syntax {
                found,
                kind,
                line,
                offset,
                file: fill(file),
                context,
            },
            FoamError::MalformedDimension { count, line, file } => {
                FoamError::MalformedDimension {
                    count,
                    line,
                    file: fill(file),
                }
            }
            FoamError::UnresolvedSubstitution { name, line, file } => {
                FoamError::UnresolvedSubstitution {
                    name,
                    line,
                    file: fill(file),
                }
            }
            other => other,
        }
    }
}
