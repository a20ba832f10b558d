//! Section and configuration type definitions
//!
//! These types represent a parsed HAProxy configuration file.

use super::block::LineBlock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Section categories, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Global,
    Defaults,
    Userlist,
    Listen,
    Frontend,
    Backend,
}

impl SectionKind {
    /// Keyword that opens a section of this kind
    pub fn keyword(self) -> &'static str {
        match self {
            SectionKind::Global => "global",
            SectionKind::Defaults => "defaults",
            SectionKind::Userlist => "userlist",
            SectionKind::Listen => "listen",
            SectionKind::Frontend => "frontend",
            SectionKind::Backend => "backend",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Behaviour shared by every section
pub trait Section {
    const KIND: SectionKind;

    /// Section name, empty for `global`
    fn name(&self) -> &str;

    fn block(&self) -> &LineBlock;

    fn block_mut(&mut self) -> &mut LineBlock;
}

/// `global` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Global {
    #[serde(default)]
    pub block: LineBlock,
}

impl Global {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `defaults [<name>]` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub block: LineBlock,
}

impl Defaults {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block: LineBlock::new(),
        }
    }
}

/// `userlist <name>` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Userlist {
    pub name: String,
    #[serde(default)]
    pub block: LineBlock,
}

impl Userlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block: LineBlock::new(),
        }
    }
}

/// `listen <name> [<host>:<port>]` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Listen {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub block: LineBlock,
}

impl Listen {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
            block: LineBlock::new(),
        }
    }
}

/// `frontend <name> [<host>:<port>]` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frontend {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub block: LineBlock,
}

impl Frontend {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
            block: LineBlock::new(),
        }
    }
}

/// `backend <name>` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Backend {
    pub name: String,
    #[serde(default)]
    pub block: LineBlock,
}

impl Backend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            block: LineBlock::new(),
        }
    }
}

macro_rules! impl_section {
    ($ty:ident, $kind:ident, |$this:ident| $name:expr) => {
        impl Section for $ty {
            const KIND: SectionKind = SectionKind::$kind;

            fn name(&self) -> &str {
                let $this = self;
                $name
            }

            fn block(&self) -> &LineBlock {
                &self.block
            }

            fn block_mut(&mut self) -> &mut LineBlock {
                &mut self.block
            }
        }
    };
}

impl_section!(Global, Global, |_this| "");
impl_section!(Defaults, Defaults, |this| &this.name);
impl_section!(Userlist, Userlist, |this| &this.name);
impl_section!(Listen, Listen, |this| &this.name);
impl_section!(Frontend, Frontend, |this| &this.name);
impl_section!(Backend, Backend, |this| &this.name);

/// Root of the configuration model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// The single `global` section, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<Global>,

    #[serde(default)]
    pub defaults: Vec<Defaults>,

    #[serde(default)]
    pub userlists: Vec<Userlist>,

    #[serde(default)]
    pub listens: Vec<Listen>,

    #[serde(default)]
    pub frontends: Vec<Frontend>,

    #[serde(default)]
    pub backends: Vec<Backend>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> Option<&Global> {
        self.global.as_ref()
    }

    /// Mutable access to `global`, creating an empty section when missing
    pub fn global_mut(&mut self) -> &mut Global {
        self.global.get_or_insert_with(Global::new)
    }

    /// Replace the `global` section, returning the previous one
    pub fn set_global(&mut self, global: Global) -> Option<Global> {
        self.global.replace(global)
    }

    pub fn defaults_named(&self, name: &str) -> Option<&Defaults> {
        self.defaults.iter().find(|d| d.name == name)
    }

    pub fn userlist(&self, name: &str) -> Option<&Userlist> {
        self.userlists.iter().find(|u| u.name == name)
    }

    pub fn listen(&self, name: &str) -> Option<&Listen> {
        self.listens.iter().find(|l| l.name == name)
    }

    pub fn frontend(&self, name: &str) -> Option<&Frontend> {
        self.frontends.iter().find(|f| f.name == name)
    }

    pub fn backend(&self, name: &str) -> Option<&Backend> {
        self.backends.iter().find(|b| b.name == name)
    }

    pub fn listen_mut(&mut self, name: &str) -> Option<&mut Listen> {
        self.listens.iter_mut().find(|l| l.name == name)
    }

    pub fn frontend_mut(&mut self, name: &str) -> Option<&mut Frontend> {
        self.frontends.iter_mut().find(|f| f.name == name)
    }

    pub fn backend_mut(&mut self, name: &str) -> Option<&mut Backend> {
        self.backends.iter_mut().find(|b| b.name == name)
    }

    pub fn add_defaults(&mut self, defaults: Defaults) {
        self.defaults.push(defaults);
    }

    pub fn add_userlist(&mut self, userlist: Userlist) {
        self.userlists.push(userlist);
    }

    pub fn add_listen(&mut self, listen: Listen) {
        self.listens.push(listen);
    }

    pub fn add_frontend(&mut self, frontend: Frontend) {
        self.frontends.push(frontend);
    }

    pub fn add_backend(&mut self, backend: Backend) {
        self.backends.push(backend);
    }

    pub fn remove_defaults(&mut self, name: &str) -> Vec<Defaults> {
        remove_named(&mut self.defaults, name)
    }

    pub fn remove_userlist(&mut self, name: &str) -> Vec<Userlist> {
        remove_named(&mut self.userlists, name)
    }

    pub fn remove_listen(&mut self, name: &str) -> Vec<Listen> {
        remove_named(&mut self.listens, name)
    }

    pub fn remove_frontend(&mut self, name: &str) -> Vec<Frontend> {
        remove_named(&mut self.frontends, name)
    }

    pub fn remove_backend(&mut self, name: &str) -> Vec<Backend> {
        remove_named(&mut self.backends, name)
    }

    /// Number of sections, `global` included
    pub fn section_count(&self) -> usize {
        usize::from(self.global.is_some())
            + self.defaults.len()
            + self.userlists.len()
            + self.listens.len()
            + self.frontends.len()
            + self.backends.len()
    }

    /// Number of directive lines across all sections
    pub fn line_count(&self) -> usize {
        self.global.as_ref().map_or(0, |g| g.block.len())
            + block_lines(&self.defaults)
            + block_lines(&self.userlists)
            + block_lines(&self.listens)
            + block_lines(&self.frontends)
            + block_lines(&self.backends)
    }

    pub fn is_empty(&self) -> bool {
        self.section_count() == 0
    }
}

fn remove_named<S: Section>(sections: &mut Vec<S>, name: &str) -> Vec<S> {
    let (removed, kept): (Vec<S>, Vec<S>) =
        std::mem::take(sections).into_iter().partition(|s| s.name() == name);
    *sections = kept;
    removed
}

fn block_lines<S: Section>(sections: &[S]) -> usize {
    sections.iter().map(|s| s.block().len()).sum()
}
