//! Tokenizer
//!
//! Converts source text into tokens on demand. Besides the normal mode it
//! has a raw-capture mode, switched on by the parser after the opening
//! parenthesis of a long length-prefixed list: everything up to the
//! matching close parenthesis is returned as one `UnparsedChunk` token
//! instead of one token per number.
//!
//! A newline followed by a line containing `=` (outside comments and quoted
//! strings) turns that whole line into a single `Reaction` token.

use crate::error::{FoamError, Result};

/// Token type produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(String),
    Int(i64),
    Float(f64),
    /// Quoted string; text between the quotes, escapes untouched.
    Str(String),
    /// `$name`; holds the name without the sigil.
    Substitution(String),
    FoamFile,
    Uniform,
    NonUniform,
    Include,
    Remove,
    InputMode,
    Merge,
    Overwrite,
    Error,
    Default,
    Hash,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Reaction(String),
    UnparsedChunk(String),
    Eof,
}

impl TokenKind {
    /// Token class name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKind::Name(_) => "NAME",
            TokenKind::Int(_) => "ICONST",
            TokenKind::Float(_) => "FCONST",
            TokenKind::Str(_) => "SCONST",
            TokenKind::Substitution(_) => "SUBSTITUTION",
            TokenKind::FoamFile => "FOAMFILE",
            TokenKind::Uniform => "UNIFORM",
            TokenKind::NonUniform => "NONUNIFORM",
            TokenKind::Include => "INCLUDE",
            TokenKind::Remove => "REMOVE",
            TokenKind::InputMode => "INPUTMODE",
            TokenKind::Merge => "MERGE",
            TokenKind::Overwrite => "OVERWRITE",
            TokenKind::Error => "ERROR",
            TokenKind::Default => "DEFAULT",
            TokenKind::Hash => "KANALGITTER",
            TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::Semicolon => "LITERAL",
            TokenKind::Reaction(_) => "REACTION",
            TokenKind::UnparsedChunk(_) => "UNPARSEDCHUNK",
            TokenKind::Eof => "EOF",
        }
    }

    /// Text of a reserved word token.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            TokenKind::FoamFile => Some("FoamFile"),
            TokenKind::Uniform => Some("uniform"),
            TokenKind::NonUniform => Some("nonuniform"),
            TokenKind::Include => Some("include"),
            TokenKind::Remove => Some("remove"),
            TokenKind::InputMode => Some("inputMode"),
            TokenKind::Merge => Some("merge"),
            TokenKind::Overwrite => Some("overwrite"),
            TokenKind::Error => Some("error"),
            TokenKind::Default => Some("default"),
            _ => None,
        }
    }

    /// Text of a token that can stand as a plain word.
    pub fn word(&self) -> Option<&str> {
        match self {
            TokenKind::Name(s) => Some(s),
            other => other.keyword(),
        }
    }

    /// Source-like rendering for error messages.
    pub fn text(&self) -> String {
        match self {
            TokenKind::Name(s) | TokenKind::Reaction(s) | TokenKind::UnparsedChunk(s) => {
                s.clone()
            }
            TokenKind::Int(i) => i.to_string(),
            TokenKind::Float(f) => format!("{:?}", f),
            TokenKind::Str(s) => format!("\"{}\"", s),
            TokenKind::Substitution(s) => format!("${}", s),
            TokenKind::Hash => "#".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::LBrace => "{".to_string(),
            TokenKind::RBrace => "}".to_string(),
            TokenKind::LBracket => "[".to_string(),
            TokenKind::RBracket => "]".to_string(),
            TokenKind::Semicolon => ";".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => other.keyword().unwrap_or_default().to_string(),
        }
    }
}

fn reserved(word: &str) -> Option<TokenKind> {
    match word {
        "FoamFile" => Some(TokenKind::FoamFile),
        "uniform" => Some(TokenKind::Uniform),
        "nonuniform" => Some(TokenKind::NonUniform),
        "include" => Some(TokenKind::Include),
        "remove" => Some(TokenKind::Remove),
        "inputMode" => Some(TokenKind::InputMode),
        "merge" => Some(TokenKind::Merge),
        "overwrite" => Some(TokenKind::Overwrite),
        "error" => Some(TokenKind::Error),
        "default" => Some(TokenKind::Default),
        _ => None,
    }
}

/// A token with its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// One-based line number.
    pub line: usize,
    /// Byte offset of the first character.
    pub offset: usize,
}

/// Tokenizer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    Normal,
    /// Swallowing a list body; `depth` counts nested open parentheses and
    /// `start` is the byte offset just past the outer `(`.
    RawCapture { depth: usize, start: usize },
}

/// Characters raw capture passes over without complaint.
fn is_raw_alphabet(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'.' | b'-' | b'+' | b'e') || c.is_ascii_digit()
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'_' | b'+' | b'-' | b'<' | b'>' | b'(' | b')' | b',' | b'.' | b'*' | b'|' | b'&'
                | b'%' | b':'
        )
}

/// On-demand tokenizer over a source buffer.
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    mode: LexMode,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            mode: LexMode::Normal,
        }
    }

    /// The buffer being tokenized.
    pub fn source(&self) -> &'a str {
        self.src
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current line number.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Switch to raw capture. Must be called right after the opening
    /// parenthesis of the list body was returned.
    pub fn begin_raw_capture(&mut self) {
        tracing::debug!(line = self.line, offset = self.pos, "entering raw capture");
        self.mode = LexMode::RawCapture {
            depth: 0,
            start: self.pos,
        };
    }

    /// Returns `true` while raw capture is active.
    pub fn in_raw_capture(&self) -> bool {
        matches!(self.mode, LexMode::RawCapture { .. })
    }

    /// Jump to the end of input; used once only the header is wanted.
    pub fn skip_to_end(&mut self) {
        self.pos = self.src.len();
        self.mode = LexMode::Normal;
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn byte_at(&self, i: usize) -> Option<u8> {
        self.src.as_bytes().get(i).copied()
    }

    fn token(&self, kind: TokenKind, offset: usize, line: usize) -> Token {
        Token { kind, line, offset }
    }

    fn illegal(&self, at: usize) -> FoamError {
        let ch = self.src[at..].chars().next().unwrap_or('\0');
        FoamError::Lexical {
            ch,
            line: self.line,
            offset: at,
            file: None,
        }
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        if let LexMode::RawCapture { .. } = self.mode {
            return self.raw_chunk();
        }

        loop {
            let start = self.pos;
            let Some(c) = self.peek_byte() else {
                return Ok(self.token(TokenKind::Eof, start, self.line));
            };

            match c {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    if let Some(reaction) = self.newlines() {
                        return Ok(reaction);
                    }
                }
                b'/' if self.byte_at(start + 1) == Some(b'/') => self.line_comment(),
                b'/' if self.byte_at(start + 1) == Some(b'*') => self.block_comment()?,
                b'"' => return self.string(),
                b'#' => {
                    self.pos += 1;
                    return Ok(self.token(TokenKind::Hash, start, self.line));
                }
                b'$' if self.byte_at(start + 1).map_or(false, is_name_start) => {
                    self.pos += 1;
                    let name = self.name_text();
                    return Ok(self.token(TokenKind::Substitution(name), start, self.line));
                }
                b'(' | b')' | b'{' | b'}' | b'[' | b']' | b';' => {
                    self.pos += 1;
                    let kind = match c {
                        b'(' => TokenKind::LParen,
                        b')' => TokenKind::RParen,
                        b'{' => TokenKind::LBrace,
                        b'}' => TokenKind::RBrace,
                        b'[' => TokenKind::LBracket,
                        b']' => TokenKind::RBracket,
                        _ => TokenKind::Semicolon,
                    };
                    return Ok(self.token(kind, start, self.line));
                }
                b'-' if self.byte_at(start + 1).map_or(false, |b| b.is_ascii_digit()) => {
                    return Ok(self.number());
                }
                c if c.is_ascii_digit() => return Ok(self.number()),
                c if is_name_start(c) => {
                    let text = self.name_text();
                    let kind = reserved(&text).unwrap_or(TokenKind::Name(text));
                    return Ok(self.token(kind, start, self.line));
                }
                _ => return Err(self.illegal(start)),
            }
        }
    }

    /// Consume a run of newlines, then check whether the following line is
    /// a reaction line.
    fn newlines(&mut self) -> Option<Token> {
        while self.peek_byte() == Some(b'\n') {
            self.pos += 1;
            self.line += 1;
        }

        let src = self.src;
        let rest = &src[self.pos..];
        let end = rest.find('\n')?;
        let line = &rest[..end];
        if !is_reaction_line(line) {
            return None;
        }

        let start = self.pos;
        self.pos += end;
        Some(self.token(
            TokenKind::Reaction(line.trim().to_string()),
            start,
            self.line,
        ))
    }

    fn line_comment(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.find('\n').unwrap_or(rest.len());
    }

    fn block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        let rest = &self.src[start + 2..];
        match rest.find("*/") {
            Some(end) => {
                let body = &rest[..end];
                self.line += body.matches('\n').count();
                self.pos = start + 2 + end + 2;
                Ok(())
            }
            None => Err(FoamError::Unterminated {
                what: "comment",
                line: self.line,
                offset: start,
                file: None,
            }),
        }
    }

    fn string(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            match self.byte_at(i) {
                Some(b'"') => break,
                Some(b'\\') if self.byte_at(i + 1).map_or(false, |b| b != b'\n') => i += 2,
                Some(b'\n') | Some(b'\\') | None => {
                    return Err(FoamError::Unterminated {
                        what: "string",
                        line: self.line,
                        offset: start,
                        file: None,
                    })
                }
                Some(_) => i += 1,
            }
        }
        let text = self.src[start + 1..i].to_string();
        self.pos = i + 1;
        Ok(self.token(TokenKind::Str(text), start, self.line))
    }

    /// Greedy name match; hands back trailing `)` characters that have no
    /// matching `(` inside the name.
    fn name_text(&mut self) -> String {
        let src = self.src;
        let start = self.pos;
        let mut end = start;
        while self.byte_at(end).map_or(false, is_name_char) {
            end += 1;
        }
        let mut text = &src[start..end];
        while text.ends_with(')') && text.matches(')').count() > text.matches('(').count() {
            text = &text[..text.len() - 1];
        }
        self.pos = start + text.len();
        text.to_string()
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Length of an exponent part (`e`, optional sign, digits) at the
    /// current position, or 0 if there is none.
    fn exponent_len(&self) -> usize {
        if !matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            return 0;
        }
        let mut i = self.pos + 1;
        if matches!(self.byte_at(i), Some(b'+') | Some(b'-')) {
            i += 1;
        }
        let digits_start = i;
        while self.byte_at(i).map_or(false, |b| b.is_ascii_digit()) {
            i += 1;
        }
        if i == digits_start {
            0
        } else {
            i - self.pos
        }
    }

    fn number(&mut self) -> Token {
        let start = self.pos;
        if self.peek_byte() == Some(b'-') {
            self.pos += 1;
        }
        self.digits();

        let mut is_float = false;
        if self.peek_byte() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.digits();
        }
        let exp = self.exponent_len();
        if exp > 0 {
            is_float = true;
            self.pos += exp;
        }
        let src = self.src;
        let text = &src[start..self.pos];

        let kind = if is_float {
            if matches!(self.peek_byte(), Some(b'l' | b'L' | b'f' | b'F')) {
                self.pos += 1;
            }
            TokenKind::Float(text.parse().unwrap_or(f64::NAN))
        } else {
            self.integer_suffix();
            match text.parse::<i64>() {
                Ok(i) => TokenKind::Int(i),
                Err(_) => TokenKind::Float(text.parse().unwrap_or(f64::NAN)),
            }
        };
        self.token(kind, start, self.line)
    }

    fn integer_suffix(&mut self) {
        match self.peek_byte() {
            Some(b'u' | b'U') => {
                self.pos += 1;
                if matches!(self.peek_byte(), Some(b'l' | b'L')) {
                    self.pos += 1;
                }
            }
            Some(b'l' | b'L') => {
                self.pos += 1;
                if matches!(self.peek_byte(), Some(b'u' | b'U')) {
                    self.pos += 1;
                }
            }
            _ => {}
        }
    }

    fn raw_chunk(&mut self) -> Result<Token> {
        let LexMode::RawCapture { mut depth, start } = self.mode else {
            return self.next_token();
        };
        let src = self.src;
        let start_line = self.line;
        let mut complained = false;

        while let Some(c) = self.peek_byte() {
            match c {
                b'(' => depth += 1,
                b')' if depth == 0 => {
                    let data = &src[start..self.pos];
                    self.line += data.matches('\n').count();
                    self.mode = LexMode::Normal;
                    tracing::debug!(bytes = data.len(), "leaving raw capture");
                    return Ok(self.token(
                        TokenKind::UnparsedChunk(data.to_string()),
                        start,
                        start_line,
                    ));
                }
                b')' => depth -= 1,
                c if !is_raw_alphabet(c) && !complained => {
                    complained = true;
                    tracing::warn!(
                        offset = self.pos,
                        "raw capture passing over non-numeric character"
                    );
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err(FoamError::Unterminated {
            what: "list",
            line: start_line,
            offset: start,
            file: None,
        })
    }
}

/// A line holding `=` before any comment start and outside quotes.
fn is_reaction_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'/' if !in_string && matches!(bytes.get(i + 1), Some(b'/' | b'*')) => {
                return false
            }
            b'=' if !in_string => return true,
            _ => {}
        }
    }
    false
}
