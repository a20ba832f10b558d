//! Configuration model
//!
//! [`Configuration`] holds the sections of a configuration file; every
//! section owns a [`LineBlock`] of typed directive [`Line`]s.

mod block;
mod lines;
mod types;

pub use block::LineBlock;
pub use lines::{Acl, Bind, Config, Group, Line, LineKind, OptionLine, PasswordType, Server, UseBackend, User};
pub use types::{
    Backend, Configuration, Defaults, Frontend, Global, Listen, Section, SectionKind, Userlist,
};
