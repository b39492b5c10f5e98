//! Source locations carried alongside the semantic graph.

use std::fmt;
use std::sync::Arc;

/// A 1-based line/column pair. Line 0 means "unknown".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// The span of source text a node was produced from.
///
/// Locations are produced by the parser and only ever copied by this
/// runtime; they exist so user-facing errors can point at the failing call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Option<Arc<str>>,
    pub start: Position,
    pub end: Position,
    /// The exact source text of the node, when the parser kept it.
    pub source: Option<Arc<str>>,
}

impl SourceLocation {
    pub fn new(start: Position, end: Position) -> Self {
        SourceLocation {
            file: None,
            start,
            end,
            source: None,
        }
    }

    /// Shorthand for a single-line span.
    pub fn line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self::new(Position::new(line, start_col), Position::new(line, end_col))
    }

    #[must_use]
    pub fn with_file(mut self, file: impl Into<Arc<str>>) -> Self {
        self.file = Some(file.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.start.line > 0
    }
}

impl fmt::Display for SourceLocation {
    /// Renders as `file@l:c-l:c`; the file prefix is omitted when unknown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            f.write_str(file)?;
        }
        write!(
            f,
            "@{}:{}-{}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}
