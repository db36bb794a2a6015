//! Source location tracking

use std::fmt;
use std::sync::Arc;

/// Source position (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(
        line: usize,
        column: usize,
    ) -> Self {
        Self { line, column }
    }

    /// Create a dummy position
    #[inline]
    pub fn dummy() -> Self {
        Self { line: 0, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source span (start position to end position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    #[inline]
    pub fn new(
        start: Position,
        end: Position,
    ) -> Self {
        Self { start, end }
    }

    /// Span covering `len` columns of a single line
    #[inline]
    pub fn on_line(
        line: usize,
        column: usize,
        len: usize,
    ) -> Self {
        Self {
            start: Position::new(line, column),
            end: Position::new(line, column + len),
        }
    }

    /// Create a dummy span
    #[inline]
    pub fn dummy() -> Self {
        Self {
            start: Position::dummy(),
            end: Position::dummy(),
        }
    }

    /// Check if this is a dummy span
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.start.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[{} - {}]", self.start, self.end)
    }
}

/// Where a node came from.
///
/// Opaque to the lowering passes: they only clone it onto whatever they emit so that
/// diagnostics on synthesized code still point at the line that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    file: Arc<str>,
    span: Span,
}

impl Origin {
    /// Create an origin in `file` covering `span`
    pub fn new(
        file: impl Into<Arc<str>>,
        span: Span,
    ) -> Self {
        Self {
            file: file.into(),
            span,
        }
    }

    /// Origin for nodes built in code rather than read from a file
    pub fn synthetic() -> Self {
        Self::new("<synthetic>", Span::dummy())
    }

    /// File name
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Source span
    pub fn span(&self) -> Span {
        self.span
    }

    /// Start line (1-indexed, 0 for synthetic origins)
    pub fn line(&self) -> usize {
        self.span.start.line
    }
}

impl fmt::Display for Origin {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.span.is_dummy() {
            write!(f, "{}", self.file)
        } else {
            write!(f, "{}:{}", self.file, self.span.start)
        }
    }
}

#[cfg(test)]
mod tests;
