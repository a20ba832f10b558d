//! hacfg Core Library
//!
//! This crate provides the in-memory model of an HAProxy configuration:
//! sections, typed directive lines, the mutation API and the renderer that
//! turns a model back into configuration text.

pub mod config;
pub mod error;
pub mod render;

pub use config::{
    Acl, Backend, Bind, Config, Configuration, Defaults, Frontend, Global, Group, Line, LineBlock,
    LineKind, Listen, OptionLine, PasswordType, Section, SectionKind, Server, UseBackend, User,
    Userlist,
};
pub use error::{Error, Result};
pub use render::render;

/// hacfg version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
