//! Phase 2: Recursive-Descent Parser
//!
//! Pulls tokens from the [`Lexer`] one at a time (with a single token of
//! lookahead) and builds the value tree:
//! - Header: the optional `FoamFile { ... }` block
//! - Dictionary lines: `key value ... ;`, `key { ... }` and `#` directives
//! - Values: numbers, words, strings, lists, length-prefixed lists,
//!   dimensions, `uniform` / `nonuniform` fields and nested dictionaries
//! - Macros: `#include` and `$name`, when expansion is enabled
//!
//! Long length-prefixed lists are handed to the lexer's raw-capture mode
//! once the configured threshold is reached.

use crate::dict::{FoamDict, Key};
use crate::error::{FoamError, ParseContext, Result, SourceContext};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::options::{ParseOptions, StartMode};
use crate::value::{Aggregate, Dimension, Directive, Field, InputMode, Scalar, UnparsedList, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a parse: the header, if present, and the body.
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed {
    pub header: Option<FoamDict>,
    pub body: Value,
}

impl Parsed {
    /// Body as a dictionary; list bodies yield `None`.
    pub fn into_dict(self) -> Option<FoamDict> {
        match self.body {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

/// Parse a complete document.
///
/// `base_dir` anchors relative `#include` paths; `depth` counts the
/// includes already being expanded around this document.
pub fn parse_document(
    input: &str,
    options: &ParseOptions,
    ctx: &ParseContext,
    base_dir: &Path,
    depth: usize,
) -> Result<Parsed> {
    let mode = options.start_mode()?;
    let mut parser = Parser {
        lexer: Lexer::new(input),
        peeked: None,
        options,
        ctx,
        base_dir: base_dir.to_path_buf(),
        positional: 0,
        scopes: Vec::new(),
        include_depth: depth,
    };
    parser.parse_root(mode)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    options: &'a ParseOptions,
    ctx: &'a ParseContext,
    base_dir: PathBuf,
    /// Next positional key for value-only entries.
    positional: usize,
    /// Dictionaries under construction, innermost last.
    scopes: Vec<FoamDict>,
    include_depth: usize,
}

impl<'a> Parser<'a> {
    // ========================================================================
    // Token access
    // ========================================================================

    fn fetch(&mut self) -> Result<Token> {
        let tok = self
            .lexer
            .next_token()
            .map_err(|e| e.with_context(self.ctx))?;
        if self.options.debug {
            match &tok.kind {
                TokenKind::UnparsedChunk(data) => {
                    tracing::debug!(kind = tok.kind.type_name(), line = tok.line, len = data.len(), "token")
                }
                kind => tracing::debug!(kind = kind.type_name(), line = tok.line, text = %kind.text(), "token"),
            }
        }
        Ok(tok)
    }

    fn peek(&mut self) -> Result<&TokenKind> {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.fetch()?,
        };
        Ok(&self.peeked.insert(tok).kind)
    }

    fn advance(&mut self) -> Result<Token> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.fetch(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.advance()?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(self.syntax_error(&tok))
        }
    }

    fn syntax_error(&self, tok: &Token) -> FoamError {
        FoamError::Syntax {
            found: tok.kind.text(),
            kind: tok.kind.type_name(),
            line: tok.line,
            offset: tok.offset,
            file: self.ctx.filename.clone(),
            context: SourceContext::capture(self.lexer.source(), tok.offset),
        }
    }

    // ========================================================================
    // Document structure
    // ========================================================================

    fn parse_root(&mut self, mode: StartMode) -> Result<Parsed> {
        let parsed = match mode {
            StartMode::Full => {
                let header = self.parse_optional_header()?;
                let body = self.parse_dict_body()?;
                Parsed {
                    header,
                    body: Value::Dict(body),
                }
            }
            StartMode::NoHeader => Parsed {
                header: None,
                body: Value::Dict(self.parse_dict_body()?),
            },
            StartMode::NoBody => {
                let header = self.parse_header()?;
                self.lexer.skip_to_end();
                Parsed {
                    header: Some(header),
                    body: Value::Dict(FoamDict::new()),
                }
            }
            StartMode::List => Parsed {
                header: None,
                body: self.parse_top_list()?,
            },
            StartMode::ListWithHeader => {
                let header = self.parse_optional_header()?;
                let body = self.parse_top_list()?;
                Parsed { header, body }
            }
        };
        self.expect(TokenKind::Eof)?;
        Ok(parsed)
    }

    fn parse_optional_header(&mut self) -> Result<Option<FoamDict>> {
        if *self.peek()? == TokenKind::FoamFile {
            Ok(Some(self.parse_header()?))
        } else {
            Ok(None)
        }
    }

    fn parse_header(&mut self) -> Result<FoamDict> {
        self.expect(TokenKind::FoamFile)?;
        self.expect(TokenKind::LBrace)?;
        let header = self.parse_dict_body()?;
        self.expect(TokenKind::RBrace)?;
        Ok(header)
    }

    /// A list (bare or length-prefixed) as the whole document body.
    fn parse_top_list(&mut self) -> Result<Value> {
        let tok = self.advance()?;
        match tok.kind {
            TokenKind::LParen => self.parse_list_body(true),
            TokenKind::Int(n) if n >= 0 && *self.peek()? == TokenKind::LParen => {
                self.parse_prelist(n as usize)
            }
            _ => Err(self.syntax_error(&tok)),
        }
    }

    /// Dictionary lines up to a closing brace or end of input. The
    /// terminator is left for the caller.
    fn parse_dict_body(&mut self) -> Result<FoamDict> {
        self.scopes.push(FoamDict::new());
        loop {
            match self.peek()? {
                TokenKind::RBrace | TokenKind::Eof => break,
                TokenKind::Hash => self.parse_directive()?,
                _ => self.parse_dict_line()?,
            }
        }
        Ok(self.scopes.pop().unwrap_or_default())
    }

    fn bind(&mut self, key: Key, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(key, value);
        }
    }

    fn next_positional(&mut self) -> Key {
        let key = Key::Index(self.positional);
        self.positional += 1;
        key
    }

    fn parse_dict_line(&mut self) -> Result<()> {
        let tok = self.advance()?;
        let key = match (&tok.kind, tok.kind.word()) {
            (_, Some(word)) => word.to_string(),
            (TokenKind::Str(s), None) => format!("\"{}\"", s),
            _ => return Err(self.syntax_error(&tok)),
        };

        if *self.peek()? == TokenKind::LBrace {
            self.advance()?;
            let dict = self.parse_dict_body()?;
            self.expect(TokenKind::RBrace)?;
            self.bind(Key::Name(key), Value::Dict(dict));
            return Ok(());
        }

        let value = self.parse_entry_value()?;
        self.expect(TokenKind::Semicolon)?;
        self.bind(Key::Name(key), value);
        Ok(())
    }

    // ========================================================================
    // Directives
    // ========================================================================

    fn parse_directive(&mut self) -> Result<()> {
        self.expect(TokenKind::Hash)?;
        let tok = self.advance()?;
        match tok.kind {
            TokenKind::Include => {
                let path_tok = self.advance()?;
                let path = match path_tok.kind {
                    TokenKind::Str(ref p) => p.clone(),
                    _ => return Err(self.syntax_error(&path_tok)),
                };
                let key = self.next_positional();
                let expanded = self.options.do_macro_expansion;
                self.bind(
                    key,
                    Value::Directive(Directive::Include {
                        path: path.clone(),
                        expanded,
                    }),
                );
                if expanded {
                    self.expand_include(&path)?;
                }
            }
            TokenKind::InputMode => {
                let mode_tok = self.advance()?;
                let mode = match mode_tok.kind {
                    TokenKind::Error => InputMode::Error,
                    TokenKind::Default => InputMode::Default,
                    TokenKind::Merge => InputMode::Merge,
                    TokenKind::Overwrite => InputMode::Overwrite,
                    _ => return Err(self.syntax_error(&mode_tok)),
                };
                let key = self.next_positional();
                self.bind(key, Value::Directive(Directive::InputMode(mode)));
            }
            TokenKind::Remove => {
                let (words, listed) = self.parse_remove_words()?;
                let key = self.next_positional();
                self.bind(key, Value::Directive(Directive::Remove { words, listed }));
            }
            _ => return Err(self.syntax_error(&tok)),
        }
        Ok(())
    }

    fn parse_remove_words(&mut self) -> Result<(Vec<String>, bool)> {
        let tok = self.advance()?;
        if let Some(word) = tok.kind.word() {
            return Ok((vec![word.to_string()], false));
        }
        if tok.kind != TokenKind::LParen {
            return Err(self.syntax_error(&tok));
        }
        let mut words = Vec::new();
        loop {
            let tok = self.advance()?;
            match (&tok.kind, tok.kind.word()) {
                (TokenKind::RParen, _) => break,
                (_, Some(word)) => words.push(word.to_string()),
                _ => return Err(self.syntax_error(&tok)),
            }
        }
        Ok((words, true))
    }

    /// Parse an included file and merge its top-level entries into the
    /// current scope.
    fn expand_include(&mut self, path: &str) -> Result<()> {
        let full = self.base_dir.join(path);
        if self.include_depth >= self.options.max_include_depth {
            return Err(FoamError::RecursionLimit {
                limit: self.options.max_include_depth,
                path: full,
            });
        }
        let text = fs::read_to_string(&full).map_err(|source| FoamError::IncludeResolution {
            path: full.clone(),
            source,
        })?;
        tracing::debug!(path = %full.display(), depth = self.include_depth + 1, "expanding include");

        let name = full.display().to_string();
        let ctx = ParseContext::new(Some(name.as_str()));
        let base = full
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let nested = self.options.for_include();
        let parsed = parse_document(&text, &nested, &ctx, &base, self.include_depth + 1)?;

        if let Value::Dict(dict) = parsed.body {
            for (key, value) in dict {
                let key = match key {
                    Key::Name(name) => Key::Name(name),
                    Key::Index(_) => self.next_positional(),
                };
                self.bind(key, value);
            }
        }
        Ok(())
    }

    fn substitute(&mut self, name: &str, tok: &Token) -> Result<Value> {
        if !self.options.do_macro_expansion {
            return Ok(Value::Word(format!("${}", name)));
        }
        if let Some(value) = self.scopes.iter().rev().find_map(|scope| scope.get(name)) {
            return Ok(value.clone());
        }
        if self.options.strict_substitution {
            return Err(FoamError::UnresolvedSubstitution {
                name: name.to_string(),
                line: tok.line,
                file: self.ctx.filename.clone(),
            });
        }
        tracing::warn!(name, line = tok.line, "substitution not found");
        Ok(Value::String(format!("<Symbol '{}' not found>", name)))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Everything between a key and its `;`.
    fn parse_entry_value(&mut self) -> Result<Value> {
        let mut items = Vec::new();

        match self.peek()? {
            TokenKind::Uniform => {
                let tok = self.advance()?;
                match self.peek()? {
                    TokenKind::Int(_)
                    | TokenKind::Float(_)
                    | TokenKind::LParen
                    | TokenKind::Substitution(_) => match self.parse_uniform(&tok)? {
                        Value::Tuple(words) => items = words,
                        field => return Ok(field),
                    },
                    _ => items.push(Value::Word("uniform".to_string())),
                }
            }
            TokenKind::NonUniform => {
                self.advance()?;
                if self.peek()?.word().is_some() {
                    match self.parse_nonuniform()? {
                        Value::Tuple(words) => items = words,
                        field => return Ok(field),
                    }
                } else {
                    items.push(Value::Word("nonuniform".to_string()));
                }
            }
            _ => {}
        }

        while *self.peek()? != TokenKind::Semicolon {
            items.push(self.parse_item(false)?);
        }

        Ok(match items.len() {
            1 => items.pop().unwrap_or(Value::Tuple(Vec::new())),
            _ => {
                strip_length_prefixes(&mut items);
                Value::Tuple(items)
            }
        })
    }

    /// The value after `uniform`. A `$name` that stays textual (unexpanded,
    /// or not found) yields a tuple that the caller continues as plain
    /// words.
    fn parse_uniform(&mut self, uniform_tok: &Token) -> Result<Value> {
        let tok = self.advance()?;
        let value = match tok.kind {
            TokenKind::Int(i) => Value::Scalar(Scalar::Int(i)),
            TokenKind::Float(f) => Value::Scalar(Scalar::Float(f)),
            TokenKind::LParen => match self.parse_list_body(true)? {
                aggregate @ Value::Aggregate(_) => aggregate,
                _ => return Err(self.syntax_error(uniform_tok)),
            },
            TokenKind::Substitution(ref name) => {
                let name = name.clone();
                match self.substitute(&name, &tok)? {
                    value @ (Value::Scalar(_) | Value::Aggregate(_)) => value,
                    value @ (Value::Word(_) | Value::String(_)) => {
                        return Ok(Value::Tuple(vec![Value::Word("uniform".to_string()), value]));
                    }
                    _ => return Err(self.syntax_error(&tok)),
                }
            }
            _ => return Err(self.syntax_error(&tok)),
        };
        Ok(Value::Field(Field::uniform(value)))
    }

    fn parse_nonuniform(&mut self) -> Result<Value> {
        let name_tok = self.advance()?;
        let name = name_tok.kind.word().unwrap_or_default().to_string();
        let tok = self.advance()?;
        let value = match tok.kind {
            TokenKind::LParen => self.parse_list_body(false)?,
            TokenKind::Int(n) if n >= 0 && *self.peek()? == TokenKind::LParen => {
                self.parse_prelist(n as usize)?
            }
            TokenKind::Substitution(ref var) => {
                let var = var.clone();
                match self.substitute(&var, &tok)? {
                    value @ (Value::List(_) | Value::UnparsedList(_)) => value,
                    Value::Aggregate(a) => {
                        Value::List(a.components().iter().copied().map(Value::Scalar).collect())
                    }
                    value @ (Value::Word(_) | Value::String(_)) => {
                        return Ok(Value::Tuple(vec![
                            Value::Word("nonuniform".to_string()),
                            Value::Word(name),
                            value,
                        ]));
                    }
                    _ => return Err(self.syntax_error(&tok)),
                }
            }
            _ => return Err(self.syntax_error(&tok)),
        };
        Ok(Value::Field(Field::nonuniform(name, value)))
    }

    /// One item of an entry value or list body.
    fn parse_item(&mut self, in_list: bool) -> Result<Value> {
        let tok = self.advance()?;
        match tok.kind {
            TokenKind::Int(n) => {
                if n >= 0 && *self.peek()? == TokenKind::LParen {
                    self.parse_prelist(n as usize)
                } else {
                    Ok(Value::Scalar(Scalar::Int(n)))
                }
            }
            TokenKind::Float(f) => Ok(Value::Scalar(Scalar::Float(f))),
            TokenKind::Str(ref s) => Ok(Value::String(s.clone())),
            TokenKind::Substitution(ref name) => {
                let name = name.clone();
                self.substitute(&name, &tok)
            }
            TokenKind::LParen => self.parse_list_body(true),
            TokenKind::LBrace => {
                let dict = self.parse_dict_body()?;
                self.expect(TokenKind::RBrace)?;
                Ok(Value::Dict(dict))
            }
            TokenKind::LBracket => self.parse_dimension(&tok),
            TokenKind::Reaction(ref text) if in_list => Ok(Value::Reaction(text.clone())),
            ref kind => match kind.word() {
                Some(word) => Ok(Value::Word(word.to_string())),
                None => Err(self.syntax_error(&tok)),
            },
        }
    }

    /// Items up to the closing parenthesis, which is consumed. With
    /// `promote`, three, six or nine numbers become an aggregate.
    fn parse_list_body(&mut self, promote: bool) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            match self.peek()? {
                TokenKind::RParen => {
                    self.advance()?;
                    break;
                }
                TokenKind::Eof => {
                    let tok = self.advance()?;
                    return Err(self.syntax_error(&tok));
                }
                _ => items.push(self.parse_item(true)?),
            }
        }
        strip_length_prefixes(&mut items);
        if promote {
            if let Some(aggregate) = promote_aggregate(&items) {
                return Ok(Value::Aggregate(aggregate));
            }
        }
        Ok(Value::List(items))
    }

    /// `N( ... )` with the count already consumed and `(` next. The declared
    /// count is not checked against the element count.
    fn parse_prelist(&mut self, length: usize) -> Result<Value> {
        self.expect(TokenKind::LParen)?;
        match self.options.list_length_unparsed {
            Some(threshold) if length >= threshold => {
                self.lexer.begin_raw_capture();
                let tok = self.advance()?;
                let data = match tok.kind {
                    TokenKind::UnparsedChunk(data) => data,
                    _ => return Err(self.syntax_error(&tok)),
                };
                self.expect(TokenKind::RParen)?;
                Ok(Value::UnparsedList(UnparsedList::new(length, data)))
            }
            _ => self.parse_list_body(false),
        }
    }

    /// `[ ... ]` with the bracket already consumed.
    fn parse_dimension(&mut self, open: &Token) -> Result<Value> {
        let mut exponents = Vec::new();
        loop {
            let tok = self.advance()?;
            match tok.kind {
                TokenKind::Int(i) => exponents.push(Scalar::Int(i)),
                TokenKind::Float(f) => exponents.push(Scalar::Float(f)),
                TokenKind::RBracket => break,
                _ => return Err(self.syntax_error(&tok)),
            }
        }
        if exponents.len() == 5 {
            exponents.extend([Scalar::Int(0), Scalar::Int(0)]);
        }
        Dimension::new(&exponents)
            .map(Value::Dimension)
            .map_err(|_| FoamError::MalformedDimension {
                count: exponents.len(),
                line: open.line,
                file: self.ctx.filename.clone(),
            })
    }
}

/// Drop an integer that directly precedes a list of exactly that length.
fn strip_length_prefixes(items: &mut Vec<Value>) {
    let mut i = 0;
    while i + 1 < items.len() {
        let redundant = match (&items[i], &items[i + 1]) {
            (Value::Scalar(Scalar::Int(n)), Value::List(list)) => {
                usize::try_from(*n).map_or(false, |n| n == list.len())
            }
            _ => false,
        };
        if redundant {
            items.remove(i);
        } else {
            i += 1;
        }
    }
}

fn promote_aggregate(items: &[Value]) -> Option<Aggregate> {
    if !matches!(items.len(), 3 | 6 | 9) {
        return None;
    }
    let components: Option<Vec<Scalar>> = items.iter().map(Value::as_scalar).collect();
    Aggregate::from_components(&components?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with(input: &str, options: &ParseOptions) -> Result<Parsed> {
        parse_document(input, options, &ParseContext::default(), Path::new("."), 0)
    }

    fn body(input: &str) -> FoamDict {
        parse_with(input, &ParseOptions::default())
            .unwrap()
            .into_dict()
            .unwrap()
    }

    #[test]
    fn test_header_and_body() {
        let parsed = parse_with(
            "FoamFile { version 2.0; class dictionary; }\nstartTime 0;",
            &ParseOptions::default(),
        )
        .unwrap();
        let header = parsed.header.unwrap();
        assert_eq!(header.get("class"), Some(&Value::from("dictionary")));
        assert_eq!(header.get("version"), Some(&Value::from(2.0)));
        assert_eq!(parsed.body.as_dict().unwrap().get("startTime"), Some(&Value::from(0)));
    }

    #[test]
    fn test_header_is_optional() {
        let parsed = parse_with("a 1;", &ParseOptions::default()).unwrap();
        assert!(parsed.header.is_none());
    }

    #[test]
    fn test_nested_dict() {
        let dict = body("outer { inner { x 1; } y two; }");
        assert_eq!(dict.get_path(&["outer", "inner", "x"]), Some(&Value::from(1)));
        assert_eq!(dict.get_path(&["outer", "y"]), Some(&Value::from("two")));
    }

    #[test]
    fn test_quoted_key_keeps_quotes() {
        let dict = body("\"(inlet|outlet)\" { type wall; }");
        assert!(dict.contains_key("\"(inlet|outlet)\""));
    }

    #[test]
    fn test_aggregate_promotion() {
        let dict = body("v (1 2 3); t (1 2 3 4 5 6 7 8 9); s (1 2 3 4 5 6); l (1 2 3 4);");
        assert!(matches!(dict.get("v"), Some(Value::Aggregate(Aggregate::Vector(_)))));
        assert!(matches!(dict.get("t"), Some(Value::Aggregate(Aggregate::Tensor(_)))));
        assert!(matches!(dict.get("s"), Some(Value::Aggregate(Aggregate::SymmTensor(_)))));
        assert_eq!(dict.get("l").and_then(Value::as_list).map(Vec::len), Some(4));
    }

    #[test]
    fn test_mixed_triple_stays_list() {
        let dict = body("l (1 a 3);");
        assert_eq!(dict.get("l").and_then(Value::as_list).map(Vec::len), Some(3));
    }

    #[test]
    fn test_prelist_not_promoted() {
        let dict = body("l 3(1 2 3);");
        assert_eq!(
            dict.get("l"),
            Some(&Value::List(vec![
                Value::from(1),
                Value::from(2),
                Value::from(3)
            ]))
        );
    }

    #[test]
    fn test_unparsed_threshold() {
        let opts = ParseOptions::default().with_list_length_unparsed(3);
        let parsed = parse_with("a 3(1 2 3); b 2(4 5);", &opts).unwrap();
        let dict = parsed.into_dict().unwrap();
        match dict.get("a") {
            Some(Value::UnparsedList(list)) => {
                assert_eq!(list.length, 3);
                assert_eq!(list.data, "1 2 3");
            }
            other => panic!("expected unparsed list, got {:?}", other),
        }
        assert!(matches!(dict.get("b"), Some(Value::List(_))));
    }

    #[test]
    fn test_tuple_value() {
        let dict = body("div(phi,U) Gauss linearUpwind grad(U);");
        assert_eq!(
            dict.get("div(phi,U)"),
            Some(&Value::Tuple(vec![
                Value::from("Gauss"),
                Value::from("linearUpwind"),
                Value::from("grad(U)")
            ]))
        );
    }

    #[test]
    fn test_empty_value() {
        let dict = body("flag;");
        assert_eq!(dict.get("flag"), Some(&Value::Tuple(Vec::new())));
    }

    #[test]
    fn test_length_prefix_stripped_in_tuple() {
        let mut items = vec![
            Value::from("x"),
            Value::from(2),
            Value::List(vec![Value::from(1), Value::from(2)]),
        ];
        strip_length_prefixes(&mut items);
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Value::List(_)));
    }

    #[test]
    fn test_dimension_padding() {
        let dict = body("nu [0 2 -1 0 0] 1e-05;");
        let tuple = dict.get("nu").and_then(Value::as_tuple).unwrap();
        let dim = tuple[0].as_dimension().unwrap();
        assert_eq!(dim[1], Scalar::Int(2));
        assert_eq!(dim[6], Scalar::Int(0));
    }

    #[test]
    fn test_dimension_bad_arity() {
        let err = parse_with("nu\n[0 2 -1 0] 1;", &ParseOptions::default()).unwrap_err();
        match err {
            FoamError::MalformedDimension { count, line, .. } => {
                assert_eq!(count, 4);
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_uniform_fields() {
        let dict = body("a uniform 0; b uniform (1 0 0);");
        let a = dict.get("a").and_then(Value::as_field).unwrap();
        assert!(a.is_uniform());
        assert_eq!(a.value(), &Value::from(0));
        let b = dict.get("b").and_then(Value::as_field).unwrap();
        assert!(matches!(b.value(), Value::Aggregate(Aggregate::Vector(_))));
    }

    #[test]
    fn test_nonuniform_field() {
        let dict = body("value nonuniform List<scalar> 3(1 2 3);");
        let field = dict.get("value").and_then(Value::as_field).unwrap();
        assert!(!field.is_uniform());
        assert_eq!(field.name(), Some("List<scalar>"));
        assert_eq!(field.value().as_list().map(Vec::len), Some(3));
        field.validate().unwrap();
    }

    #[test]
    fn test_uniform_as_word() {
        let dict = body("mode uniform;");
        assert_eq!(dict.get("mode"), Some(&Value::from("uniform")));
    }

    #[test]
    fn test_reaction_in_list() {
        let dict = body("reactions\n(\nA + B = C 1.0\n);");
        let list = dict.get("reactions").and_then(Value::as_list).unwrap();
        assert_eq!(list, &vec![Value::Reaction("A + B = C 1.0".to_string())]);
    }

    #[test]
    fn test_directives_positional() {
        let dict = body("#inputMode merge\n#remove (a b)\nx 1;\n#include \"other\"");
        assert_eq!(
            dict.get(0usize),
            Some(&Value::Directive(Directive::InputMode(InputMode::Merge)))
        );
        assert_eq!(
            dict.get(1usize),
            Some(&Value::Directive(Directive::Remove {
                words: vec!["a".to_string(), "b".to_string()],
                listed: true
            }))
        );
        assert_eq!(
            dict.get(2usize),
            Some(&Value::Directive(Directive::Include {
                path: "other".to_string(),
                expanded: false
            }))
        );
    }

    #[test]
    fn test_substitution_expanded() {
        let opts = ParseOptions::default().with_macro_expansion(true);
        let dict = parse_with("foo 42; sub { bar $foo; }", &opts)
            .unwrap()
            .into_dict()
            .unwrap();
        assert_eq!(dict.get_path(&["sub", "bar"]), Some(&Value::from(42)));
    }

    #[test]
    fn test_substitution_kept_as_word() {
        let dict = body("foo 42; bar $foo;");
        assert_eq!(dict.get("bar"), Some(&Value::from("$foo")));
    }

    #[test]
    fn test_substitution_missing() {
        let opts = ParseOptions::default().with_macro_expansion(true);
        let dict = parse_with("bar $nope;", &opts).unwrap().into_dict().unwrap();
        assert_eq!(
            dict.get("bar"),
            Some(&Value::String("<Symbol 'nope' not found>".to_string()))
        );

        let strict = opts.with_strict_substitution(true);
        assert!(matches!(
            parse_with("bar $nope;", &strict),
            Err(FoamError::UnresolvedSubstitution { .. })
        ));
    }

    #[test]
    fn test_uniform_substitution() {
        let opts = ParseOptions::default().with_macro_expansion(true);
        let dict = parse_with(
            "x 5; flowVelocity (10 0 0);\na uniform $x;\ninternalField uniform $flowVelocity;",
            &opts,
        )
        .unwrap()
        .into_dict()
        .unwrap();
        assert_eq!(dict.get("a"), Some(&Value::Field(Field::uniform(Value::from(5)))));
        let field = dict.get("internalField").and_then(Value::as_field).unwrap();
        assert!(field.is_uniform());
        assert!(matches!(field.value(), Value::Aggregate(Aggregate::Vector(_))));

        // Unexpanded, the entry stays as words.
        let literal = body("a uniform $x;");
        assert_eq!(
            literal.get("a"),
            Some(&Value::Tuple(vec![Value::from("uniform"), Value::from("$x")]))
        );
    }

    #[test]
    fn test_nonuniform_substitution() {
        let opts = ParseOptions::default().with_macro_expansion(true);
        let dict = parse_with(
            "vals 4(1 2 3 4); pts (1 2 3);\n\
             a nonuniform List<scalar> $vals;\n\
             b nonuniform List<scalar> $pts;",
            &opts,
        )
        .unwrap()
        .into_dict()
        .unwrap();
        let a = dict.get("a").and_then(Value::as_field).unwrap();
        assert_eq!(a.name(), Some("List<scalar>"));
        assert_eq!(a.value().as_list().map(Vec::len), Some(4));
        let b = dict.get("b").and_then(Value::as_field).unwrap();
        assert_eq!(b.value().as_list().map(Vec::len), Some(3));

        let literal = body("a nonuniform List<scalar> $vals;");
        assert_eq!(
            literal.get("a"),
            Some(&Value::Tuple(vec![
                Value::from("nonuniform"),
                Value::from("List<scalar>"),
                Value::from("$vals"),
            ]))
        );
    }

    #[test]
    fn test_no_body_mode() {
        let opts = ParseOptions::default().with_no_body();
        let parsed = parse_with("FoamFile { object U; }\n this is not { valid", &opts).unwrap();
        assert_eq!(
            parsed.header.unwrap().get("object"),
            Some(&Value::from("U"))
        );
        assert!(parsed.body.as_dict().unwrap().is_empty());
    }

    #[test]
    fn test_list_modes() {
        let opts = ParseOptions::default().with_list_dict();
        let parsed = parse_with("(a b c d)", &opts).unwrap();
        assert_eq!(parsed.body.as_list().map(Vec::len), Some(4));

        let opts = ParseOptions::default().with_boundary_dict();
        let parsed = parse_with(
            "FoamFile { class polyBoundaryMesh; }\n1\n(\n inlet { type patch; nFaces 5; startFace 10; }\n)",
            &opts,
        )
        .unwrap();
        assert!(parsed.header.is_some());
        let list = parsed.body.as_list().unwrap();
        assert_eq!(list[0], Value::from("inlet"));
        assert!(list[1].as_dict().is_some());
    }

    #[test]
    fn test_syntax_error_details() {
        let err = parse_with("a 1;\nb 2 }", &ParseOptions::default()).unwrap_err();
        match err {
            FoamError::Syntax {
                found,
                kind,
                line,
                context,
                ..
            } => {
                assert_eq!(found, "}");
                assert_eq!(kind, "LITERAL");
                assert_eq!(line, 2);
                assert_eq!(context.at, "}");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_semicolon_at_eof() {
        assert!(matches!(
            parse_with("a 1", &ParseOptions::default()),
            Err(FoamError::Syntax { kind: "EOF", .. })
        ));
    }
}
