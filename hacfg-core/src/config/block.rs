//! Ordered block of directive lines

use super::lines::{Acl, Bind, Config, Group, Line, LineKind, OptionLine, Server, UseBackend, User};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered, heterogeneous directive lines of one section.
///
/// Lines keep source order, additions go to the end, and nothing is ever
/// deduplicated: two `server` lines with the same name are both kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineBlock {
    lines: Vec<Line>,
}

impl LineBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<Line> {
        &mut self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append any line
    pub fn push(&mut self, line: impl Into<Line>) {
        self.lines.push(line.into());
    }

    /// Append `line` only if it is of the `expected` kind
    pub fn add_line_as(&mut self, expected: LineKind, line: Line) -> Result<()> {
        let found = line.kind();
        if found != expected {
            return Err(Error::WrongLineKind { expected, found });
        }
        self.lines.push(line);
        Ok(())
    }

    // ========================================
    // Typed views
    // ========================================

    pub fn configs(&self) -> impl Iterator<Item = &Config> {
        self.lines.iter().filter_map(Line::as_config)
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionLine> {
        self.lines.iter().filter_map(Line::as_option)
    }

    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.lines.iter().filter_map(Line::as_server)
    }

    pub fn binds(&self) -> impl Iterator<Item = &Bind> {
        self.lines.iter().filter_map(Line::as_bind)
    }

    pub fn acls(&self) -> impl Iterator<Item = &Acl> {
        self.lines.iter().filter_map(Line::as_acl)
    }

    /// `use_backend` and `default_backend` lines
    pub fn backends(&self) -> impl Iterator<Item = &UseBackend> {
        self.lines.iter().filter_map(Line::as_use_backend)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.lines.iter().filter_map(Line::as_user)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.lines.iter().filter_map(Line::as_group)
    }

    pub fn has_binds(&self) -> bool {
        self.binds().next().is_some()
    }

    // ========================================
    // Lookup (first match)
    // ========================================

    pub fn config(&self, keyword: &str) -> Option<&Config> {
        self.configs().find(|c| c.keyword == keyword)
    }

    pub fn option(&self, keyword: &str) -> Option<&OptionLine> {
        self.options().find(|o| o.keyword == keyword)
    }

    pub fn server(&self, name: &str) -> Option<&Server> {
        self.servers().find(|s| s.name == name)
    }

    pub fn acl(&self, name: &str) -> Option<&Acl> {
        self.acls().find(|a| a.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users().find(|u| u.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups().find(|g| g.name == name)
    }

    /// First conditional `use_backend` line routing to `backend_name`
    pub fn use_backend(&self, backend_name: &str) -> Option<&UseBackend> {
        self.backends()
            .find(|b| !b.is_default && b.backend_name == backend_name)
    }

    pub fn default_backend(&self) -> Option<&UseBackend> {
        self.backends().find(|b| b.is_default)
    }

    // ========================================
    // Typed additions
    // ========================================

    pub fn add_config(&mut self, config: Config) {
        self.push(config);
    }

    pub fn add_option(&mut self, option: OptionLine) {
        self.push(option);
    }

    pub fn add_server(&mut self, server: Server) {
        self.push(server);
    }

    pub fn add_bind(&mut self, bind: Bind) {
        self.push(bind);
    }

    pub fn add_acl(&mut self, acl: Acl) {
        self.push(acl);
    }

    pub fn add_use_backend(&mut self, use_backend: UseBackend) {
        self.push(use_backend);
    }

    pub fn add_user(&mut self, user: User) {
        self.push(user);
    }

    pub fn add_group(&mut self, group: Group) {
        self.push(group);
    }

    // ========================================
    // Removal (all matches, returned in order)
    // ========================================

    pub fn remove_config(&mut self, keyword: &str) -> Vec<Line> {
        self.remove_where(|line| line.as_config().is_some_and(|c| c.keyword == keyword))
    }

    pub fn remove_option(&mut self, keyword: &str) -> Vec<Line> {
        self.remove_where(|line| line.as_option().is_some_and(|o| o.keyword == keyword))
    }

    pub fn remove_server(&mut self, name: &str) -> Vec<Line> {
        self.remove_where(|line| line.as_server().is_some_and(|s| s.name == name))
    }

    pub fn remove_acl(&mut self, name: &str) -> Vec<Line> {
        self.remove_where(|line| line.as_acl().is_some_and(|a| a.name == name))
    }

    pub fn remove_user(&mut self, name: &str) -> Vec<Line> {
        self.remove_where(|line| line.as_user().is_some_and(|u| u.name == name))
    }

    pub fn remove_group(&mut self, name: &str) -> Vec<Line> {
        self.remove_where(|line| line.as_group().is_some_and(|g| g.name == name))
    }

    /// Removes `use_backend` and `default_backend` lines naming `backend_name`
    pub fn remove_use_backend(&mut self, backend_name: &str) -> Vec<Line> {
        self.remove_where(|line| {
            line.as_use_backend()
                .is_some_and(|b| b.backend_name == backend_name)
        })
    }

    fn remove_where(&mut self, predicate: impl Fn(&Line) -> bool) -> Vec<Line> {
        let (removed, kept): (Vec<Line>, Vec<Line>) =
            std::mem::take(&mut self.lines).into_iter().partition(|line| predicate(line));
        self.lines = kept;
        if !removed.is_empty() {
            tracing::trace!("Removed {} line(s)", removed.len());
        }
        removed
    }
}

impl FromIterator<Line> for LineBlock {
    fn from_iter<I: IntoIterator<Item = Line>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LineBlock {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordType;

    fn sample() -> LineBlock {
        let mut block = LineBlock::new();
        block.add_config(Config::new("mode", "http"));
        block.add_acl(Acl::new("is_api", "path_beg /api"));
        block.add_server(Server::new("web1", "10.0.0.1", "80").with_attribute("check"));
        block.add_server(Server::new("web1", "10.0.0.2", "80"));
        block.add_use_backend(UseBackend::new("api", "if", "is_api"));
        block.add_use_backend(UseBackend::default_backend("static"));
        block
    }

    #[test]
    fn test_typed_views_keep_order() {
        let block = sample();
        assert_eq!(block.len(), 6);
        let hosts: Vec<&str> = block.servers().map(|s| s.host.as_str()).collect();
        assert_eq!(hosts, ["10.0.0.1", "10.0.0.2"]);
        assert_eq!(block.configs().count(), 1);
        assert_eq!(block.backends().count(), 2);
    }

    #[test]
    fn test_lookup_returns_first_match() {
        let block = sample();
        assert_eq!(block.server("web1").unwrap().host, "10.0.0.1");
        assert_eq!(block.acl("is_api").unwrap().value, "path_beg /api");
        assert_eq!(block.default_backend().unwrap().backend_name, "static");
        assert_eq!(block.use_backend("api").unwrap().condition, "is_api");
        assert!(block.use_backend("static").is_none());
        assert!(block.server("missing").is_none());
    }

    #[test]
    fn test_remove_by_name() {
        let mut block = sample();
        let removed = block.remove_server("web1");
        assert_eq!(removed.len(), 2);
        assert!(block.server("web1").is_none());

        assert_eq!(block.remove_acl("is_api").len(), 1);
        assert!(block.remove_acl("is_api").is_empty());
        assert_eq!(block.len(), 3);
        assert_eq!(block.lines()[0].kind(), LineKind::Config);
    }

    #[test]
    fn test_add_line_as_rejects_wrong_kind() {
        let mut block = LineBlock::new();
        let err = block
            .add_line_as(LineKind::Server, Acl::new("a", "b").into())
            .unwrap_err();
        assert_eq!(
            err,
            Error::WrongLineKind {
                expected: LineKind::Server,
                found: LineKind::Acl
            }
        );
        assert!(block.is_empty());

        block
            .add_line_as(LineKind::User, User::new("admin", PasswordType::InsecurePassword, "pw").into())
            .unwrap();
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let mut block = LineBlock::new();
        block.add_option(OptionLine::new("httplog", ""));
        block.add_option(OptionLine::new("httplog", ""));
        assert_eq!(block.options().count(), 2);
    }
}
