//! hacfg Configuration Parser
//!
//! This crate parses HAProxy configuration text into the model defined in
//! `hacfg-core`, and writes models back out.
//!
//! # Example
//!
//! ```rust
//! use hacfg_config::{load, render};
//!
//! let source = "frontend www *:80\n    default_backend app\n\nbackend app\n    server web1 10.0.0.1:8080 check\n";
//!
//! let config = load(source).unwrap();
//! assert_eq!(config.frontends[0].port, "80");
//! assert!(render(&config).contains("server web1 10.0.0.1:8080 check"));
//! ```

pub mod adapter;
pub mod builder;
pub mod parser;

pub use adapter::{JsonAdapter, TomlAdapter};
pub use builder::{build, BuildError};
pub use hacfg_core::render::{format_address, render};
pub use parser::{parse, parse_with, Document, ParseError, ParseStats, Parser, ParserConfig};

use hacfg_core::config::Configuration;
use std::path::Path;

/// Full pipeline: source -> Configuration
pub fn load(source: &str) -> Result<Configuration, LoadError> {
    load_with(source, &ParserConfig::default())
}

/// Full pipeline with explicit engine settings
pub fn load_with(source: &str, parser_config: &ParserConfig) -> Result<Configuration, LoadError> {
    let document = parse_with(source, parser_config)?;
    let config = build(&document)?;
    Ok(config)
}

/// Read and load a configuration file
pub fn load_file(path: impl AsRef<Path>) -> Result<Configuration, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!("Loading {}", path.display());
    load(&source)
}

/// Render a configuration and write it to `path`
pub fn save_file(config: &Configuration, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let path = path.as_ref();
    std::fs::write(path, render(config)).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Full pipeline error
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),
}
