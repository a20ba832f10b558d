//! Syntax errors

use thiserror::Error;

/// Furthest point the parser could not get past, with everything it would
/// have accepted there
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Line {line}: expected {}\n{source_line}\n{}^",
    .expected.join(", "),
    " ".repeat(.column.saturating_sub(1))
)]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// Byte offset into the source
    pub offset: usize,
    /// Text of the offending line, without its line break
    pub source_line: String,
    /// Expected token descriptions, sorted and deduplicated
    pub expected: Vec<String>,
}

impl ParseError {
    /// Locate `offset` in `source`
    pub fn new(source: &str, offset: usize, expected: Vec<String>) -> Self {
        let offset = offset.min(source.len());
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);

        Self {
            line: source[..offset].matches('\n').count() + 1,
            column: source[line_start..offset].chars().count() + 1,
            offset,
            source_line: source[line_start..line_end].to_string(),
            expected,
        }
    }
}
