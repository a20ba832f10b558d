//! Parser module for HAProxy configuration text
//!
//! This module provides the terminal matchers, the packrat engine, the
//! grammar and the parse tree.

pub mod engine;
pub mod error;
mod grammar;
pub mod terminal;
pub mod tree;

pub use engine::{ParseStats, Parser, ParserConfig};
pub use error::ParseError;
pub use tree::{Document, Node, NodeKind, Span};

/// Parse configuration text with the default engine settings
pub fn parse(text: &str) -> Result<Document, ParseError> {
    parse_with(text, &ParserConfig::default())
}

/// Parse configuration text.
///
/// `\r\n` line endings are normalized to `\n` first; spans in the returned
/// [`Document`] refer to the normalized text.
pub fn parse_with(text: &str, config: &ParserConfig) -> Result<Document, ParseError> {
    let source = if text.contains("\r\n") {
        text.replace("\r\n", "\n")
    } else {
        text.to_string()
    };

    let root = Parser::with_config(&source, *config).parse()?;
    tracing::trace!("Parse tree has {} node(s)", root.size());
    Ok(Document::new(source, root))
}
