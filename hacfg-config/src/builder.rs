//! Builder for the configuration model
//!
//! Walks a parse [`Document`] and produces a [`Configuration`].

use crate::parser::{Document, Node, NodeKind};
use hacfg_core::config::{
    Acl, Backend, Bind, Config, Configuration, Defaults, Frontend, Global, Group, Line, LineBlock,
    Listen, OptionLine, PasswordType, SectionKind, Server, UseBackend, User, Userlist,
};
use thiserror::Error;

/// Builder errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{section} '{name}' has no address: expected one in its header or a bind line")]
    MissingAddress { section: SectionKind, name: String },
}

type BuildResult<T> = Result<T, BuildError>;

/// Build the configuration model from a parsed document
pub fn build(document: &Document) -> BuildResult<Configuration> {
    let builder = Builder { doc: document };
    let mut config = Configuration::new();

    for section in document.sections() {
        builder.section(section, &mut config)?;
    }

    tracing::debug!(
        "Built {} section(s) with {} line(s)",
        config.section_count(),
        config.line_count()
    );
    Ok(config)
}

struct Builder<'a> {
    doc: &'a Document,
}

impl<'a> Builder<'a> {
    fn section(&self, node: &Node, config: &mut Configuration) -> BuildResult<()> {
        let header = node.children.first();
        let name = header.map_or("", |h| self.text_of(h, NodeKind::ProxyName));
        let block = self.block(node);

        tracing::trace!("Building {:?} '{}' ({} line(s))", node.kind, name, block.len());

        match node.kind {
            NodeKind::GlobalSection => match config.global.as_mut() {
                Some(global) => {
                    tracing::trace!("Merging repeated global section");
                    global.block.lines_mut().extend(block.lines().iter().cloned());
                }
                None => {
                    config.set_global(Global { block });
                }
            },
            NodeKind::DefaultsSection => {
                let mut defaults = Defaults::new(name);
                defaults.block = block;
                config.add_defaults(defaults);
            }
            NodeKind::UserlistSection => {
                let mut userlist = Userlist::new(name);
                userlist.block = block;
                config.add_userlist(userlist);
            }
            NodeKind::ListenSection => {
                let (host, port) = self.proxy_address(header, &block, SectionKind::Listen, name)?;
                let mut listen = Listen::new(name, host, port);
                listen.block = block;
                config.add_listen(listen);
            }
            NodeKind::FrontendSection => {
                let (host, port) =
                    self.proxy_address(header, &block, SectionKind::Frontend, name)?;
                let mut frontend = Frontend::new(name, host, port);
                frontend.block = block;
                config.add_frontend(frontend);
            }
            NodeKind::BackendSection => {
                let mut backend = Backend::new(name);
                backend.block = block;
                config.add_backend(backend);
            }
            _ => {}
        }
        Ok(())
    }

    /// Header address when present, otherwise the first bind line
    fn proxy_address(
        &self,
        header: Option<&Node>,
        block: &LineBlock,
        section: SectionKind,
        name: &str,
    ) -> BuildResult<(String, String)> {
        let from_header = header
            .and_then(|h| h.find(NodeKind::ServiceAddress))
            .filter(|address| !address.is_empty())
            .map(|address| self.address(address));
        if let Some(address) = from_header {
            return Ok(address);
        }

        block
            .binds()
            .next()
            .map(|bind| (bind.host.clone(), bind.port.clone()))
            .ok_or_else(|| BuildError::MissingAddress {
                section,
                name: name.to_string(),
            })
    }

    fn block(&self, section: &Node) -> LineBlock {
        section
            .find(NodeKind::ConfigBlock)
            .map(|block| {
                block
                    .named_children()
                    .into_iter()
                    .filter_map(|line| self.line(line))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn line(&self, node: &Node) -> Option<Line> {
        let line: Line = match node.kind {
            NodeKind::ConfigLine => Config::new(
                normalize_keyword(self.text_of(node, NodeKind::Keyword)),
                self.value(node),
            )
            .into(),
            NodeKind::OptionLine => OptionLine::new(
                normalize_keyword(self.text_of(node, NodeKind::Keyword)),
                self.value(node),
            )
            .into(),
            NodeKind::ServerLine => {
                let (host, port) = self.line_address(node);
                Server {
                    name: self.text_of(node, NodeKind::ServerName).to_string(),
                    host,
                    port,
                    attributes: split_attributes(&self.value(node)),
                }
                .into()
            }
            NodeKind::BindLine => {
                let (host, port) = self.line_address(node);
                Bind {
                    host,
                    port,
                    attributes: split_attributes(&self.value(node)),
                }
                .into()
            }
            NodeKind::AclLine => {
                Acl::new(self.text_of(node, NodeKind::AclName), self.value(node)).into()
            }
            NodeKind::BackendLine => {
                let is_default = self.text_of(node, NodeKind::BackendType) == "default_backend";
                UseBackend {
                    backend_name: self.text_of(node, NodeKind::BackendName).to_string(),
                    operator: self.text_of(node, NodeKind::Operator).to_string(),
                    condition: self.text_of(node, NodeKind::BackendCondition).trim().to_string(),
                    is_default,
                }
                .into()
            }
            NodeKind::GroupLine => Group {
                name: self.text_of(node, NodeKind::GroupName).to_string(),
                user_names: split_names(&self.value(node)),
            }
            .into(),
            NodeKind::UserLine => User {
                name: self.text_of(node, NodeKind::UserName).to_string(),
                password: self.text_of(node, NodeKind::Password).to_string(),
                password_type: PasswordType::from_keyword(
                    self.text_of(node, NodeKind::PasswordType),
                )
                .unwrap_or_default(),
                group_names: split_names(&self.value(node)),
            }
            .into(),
            // Comments and blank lines are not part of the model
            _ => return None,
        };
        Some(line)
    }

    fn line_address(&self, line: &Node) -> (String, String) {
        line.find(NodeKind::ServiceAddress)
            .map(|address| self.address(address))
            .unwrap_or_default()
    }

    fn address(&self, address: &Node) -> (String, String) {
        (
            self.text_of(address, NodeKind::Host).to_string(),
            self.text_of(address, NodeKind::Port).to_string(),
        )
    }

    /// Trimmed trailing value of a line
    fn value(&self, node: &Node) -> String {
        self.text_of(node, NodeKind::Value).trim().to_string()
    }

    /// Text of the first `kind` child, empty when absent
    fn text_of(&self, node: &Node, kind: NodeKind) -> &'a str {
        node.find(kind).map_or("", |child| self.doc.node_text(child))
    }
}

/// `timeout   connect` -> `timeout connect`
fn normalize_keyword(keyword: &str) -> String {
    keyword.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_attributes(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Comma separated user or group names
fn split_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
