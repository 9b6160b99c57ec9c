//! Parser configuration.

use crate::error::{FoamError, Result};

/// Default bound on nested `#include` expansion.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// What the top level of the input holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Optional `FoamFile` header followed by a dictionary body.
    Full,
    /// Dictionary body only.
    NoHeader,
    /// Header only; the rest of the input is ignored.
    NoBody,
    /// A single list, no header.
    List,
    /// Optional header followed by a single list (e.g. mesh boundary files).
    ListWithHeader,
}

/// Options controlling a parse.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Length-prefixed lists at least this long are kept as raw text.
    pub list_length_unparsed: Option<usize>,
    /// Expand `#include` directives and `$name` references.
    pub do_macro_expansion: bool,
    /// Input is a mesh boundary file.
    pub boundary_dict: bool,
    /// Input is a bare list.
    pub list_dict: bool,
    /// Input is a header followed by a list.
    pub list_dict_with_header: bool,
    /// Input has no header.
    pub no_header: bool,
    /// Stop after the header.
    pub no_body: bool,
    /// Fail on unresolved `$name` instead of embedding a sentinel string.
    pub strict_substitution: bool,
    /// Maximum `#include` nesting.
    pub max_include_depth: usize,
    /// Trace every token.
    pub debug: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            list_length_unparsed: None,
            do_macro_expansion: false,
            boundary_dict: false,
            list_dict: false,
            list_dict_with_header: false,
            no_header: false,
            no_body: false,
            strict_substitution: false,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            debug: false,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_length_unparsed(mut self, threshold: usize) -> Self {
        self.list_length_unparsed = Some(threshold);
        self
    }

    pub fn with_macro_expansion(mut self, on: bool) -> Self {
        self.do_macro_expansion = on;
        self
    }

    pub fn with_boundary_dict(mut self) -> Self {
        self.boundary_dict = true;
        self
    }

    pub fn with_list_dict(mut self) -> Self {
        self.list_dict = true;
        self
    }

    pub fn with_list_dict_with_header(mut self) -> Self {
        self.list_dict_with_header = true;
        self
    }

    pub fn with_no_header(mut self) -> Self {
        self.no_header = true;
        self
    }

    pub fn with_no_body(mut self) -> Self {
        self.no_body = true;
        self
    }

    pub fn with_strict_substitution(mut self, on: bool) -> Self {
        self.strict_substitution = on;
        self
    }

    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Fold the start-mode selectors into one mode.
    pub fn start_mode(&self) -> Result<StartMode> {
        let selected = [
            (self.no_body, StartMode::NoBody),
            (self.no_header, StartMode::NoHeader),
            (self.list_dict, StartMode::List),
            (self.list_dict_with_header, StartMode::ListWithHeader),
            (self.boundary_dict, StartMode::ListWithHeader),
        ];
        let mut modes = selected.iter().filter(|(on, _)| *on).map(|(_, m)| *m);
        let count = selected.iter().filter(|(on, _)| *on).count();
        if count > 1 {
            return Err(FoamError::ConflictingStartModes(count));
        }
        Ok(modes.next().unwrap_or(StartMode::Full))
    }

    /// Options for a nested parse of an included file.
    pub(crate) fn for_include(&self) -> Self {
        Self {
            list_length_unparsed: self.list_length_unparsed,
            do_macro_expansion: self.do_macro_expansion,
            strict_substitution: self.strict_substitution,
            max_include_depth: self.max_include_depth,
            debug: self.debug,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_full() {
        assert_eq!(ParseOptions::new().start_mode().unwrap(), StartMode::Full);
    }

    #[test]
    fn test_single_selector() {
        assert_eq!(
            ParseOptions::new().with_no_body().start_mode().unwrap(),
            StartMode::NoBody
        );
        assert_eq!(
            ParseOptions::new().with_boundary_dict().start_mode().unwrap(),
            StartMode::ListWithHeader
        );
    }

    #[test]
    fn test_conflicting_selectors() {
        let opts = ParseOptions::new().with_no_header().with_list_dict();
        assert!(matches!(
            opts.start_mode(),
            Err(FoamError::ConflictingStartModes(2))
        ));
    }

    #[test]
    fn test_include_options_drop_start_mode() {
        let opts = ParseOptions::new()
            .with_no_body()
            .with_macro_expansion(true)
            .with_list_length_unparsed(10);
        let nested = opts.for_include();
        assert_eq!(nested.start_mode().unwrap(), StartMode::Full);
        assert!(nested.do_macro_expansion);
        assert_eq!(nested.list_length_unparsed, Some(10));
    }
}
