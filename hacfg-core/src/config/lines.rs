//! Directive line types
//!
//! One struct per directive shape plus the [`Line`] sum type that a
//! [`LineBlock`](super::LineBlock) stores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic `<keyword> <value>` directive, e.g. `maxconn 4096`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    pub keyword: String,
    #[serde(default)]
    pub value: String,
}

impl Config {
    pub fn new(keyword: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            value: value.into(),
        }
    }
}

/// `option <keyword> <value>` directive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionLine {
    pub keyword: String,
    #[serde(default)]
    pub value: String,
}

impl OptionLine {
    pub fn new(keyword: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            value: value.into(),
        }
    }
}

/// `server <name> <host>:<port> <attributes...>` directive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Server {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
            attributes: Vec::new(),
        }
    }

    /// Append a trailing attribute such as `check` or `weight 10`
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

/// `bind <host>:<port> <attributes...>` directive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bind {
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Bind {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

/// `acl <name> <criterion...>` directive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acl {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Acl {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// `use_backend <name> [if|unless <condition>]` or `default_backend <name>`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UseBackend {
    pub backend_name: String,
    /// `if`, `unless`, or empty
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub is_default: bool,
}

impl UseBackend {
    /// Conditional `use_backend` line
    pub fn new(
        backend_name: impl Into<String>,
        operator: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            backend_name: backend_name.into(),
            operator: operator.into(),
            condition: condition.into(),
            is_default: false,
        }
    }

    /// `default_backend` line
    pub fn default_backend(backend_name: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            is_default: true,
            ..Default::default()
        }
    }

    /// Directive keyword this line is written with
    pub fn directive(&self) -> &'static str {
        if self.is_default {
            "default_backend"
        } else {
            "use_backend"
        }
    }
}

/// How a userlist password is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordType {
    /// Hashed password (`password`)
    #[default]
    Password,
    /// Clear-text password (`insecure-password`)
    InsecurePassword,
}

impl PasswordType {
    pub fn as_str(self) -> &'static str {
        match self {
            PasswordType::Password => "password",
            PasswordType::InsecurePassword => "insecure-password",
        }
    }

    /// Parse the keyword used in a `user` line
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "password" => Some(PasswordType::Password),
            "insecure-password" => Some(PasswordType::InsecurePassword),
            _ => None,
        }
    }
}

impl fmt::Display for PasswordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `user <name> password|insecure-password <password> [groups a,b]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub password_type: PasswordType,
    #[serde(default)]
    pub group_names: Vec<String>,
}

impl User {
    pub fn new(name: impl Into<String>, password_type: PasswordType, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            password_type,
            group_names: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group_names.push(group.into());
        self
    }
}

/// `group <name> [users a,b]`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub user_names: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_names: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user_names.push(user.into());
        self
    }
}

/// Discriminant of [`Line`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Config,
    Option,
    Server,
    Bind,
    Acl,
    UseBackend,
    User,
    Group,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::Config => "config",
            LineKind::Option => "option",
            LineKind::Server => "server",
            LineKind::Bind => "bind",
            LineKind::Acl => "acl",
            LineKind::UseBackend => "use_backend",
            LineKind::User => "user",
            LineKind::Group => "group",
        };
        f.write_str(name)
    }
}

/// A single directive inside a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Line {
    Config(Config),
    Option(OptionLine),
    Server(Server),
    Bind(Bind),
    Acl(Acl),
    UseBackend(UseBackend),
    User(User),
    Group(Group),
}

impl Line {
    pub fn kind(&self) -> LineKind {
        match self {
            Line::Config(_) => LineKind::Config,
            Line::Option(_) => LineKind::Option,
            Line::Server(_) => LineKind::Server,
            Line::Bind(_) => LineKind::Bind,
            Line::Acl(_) => LineKind::Acl,
            Line::UseBackend(_) => LineKind::UseBackend,
            Line::User(_) => LineKind::User,
            Line::Group(_) => LineKind::Group,
        }
    }

    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Line::Config(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<&OptionLine> {
        match self {
            Line::Option(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_server(&self) -> Option<&Server> {
        match self {
            Line::Server(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_bind(&self) -> Option<&Bind> {
        match self {
            Line::Bind(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_acl(&self) -> Option<&Acl> {
        match self {
            Line::Acl(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_use_backend(&self) -> Option<&UseBackend> {
        match self {
            Line::UseBackend(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Line::User(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Line::Group(line) => Some(line),
            _ => None,
        }
    }
}

macro_rules! impl_from_line {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Line {
                fn from(line: $ty) -> Self {
                    Line::$variant(line)
                }
            }
        )*
    };
}

impl_from_line! {
    Config => Config,
    OptionLine => Option,
    Server => Server,
    Bind => Bind,
    Acl => Acl,
    UseBackend => UseBackend,
    User => User,
    Group => Group,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_kind() {
        let line: Line = Server::new("web1", "10.0.0.1", "80").into();
        assert_eq!(line.kind(), LineKind::Server);
        assert!(line.as_server().is_some());
        assert!(line.as_bind().is_none());
    }

    #[test]
    fn test_default_backend_directive() {
        let line = UseBackend::default_backend("static");
        assert!(line.is_default);
        assert_eq!(line.directive(), "default_backend");
        assert!(line.operator.is_empty());
        assert_eq!(UseBackend::new("api", "if", "is_api").directive(), "use_backend");
    }

    #[test]
    fn test_password_type_keyword() {
        assert_eq!(PasswordType::from_keyword("insecure-password"), Some(PasswordType::InsecurePassword));
        assert_eq!(PasswordType::from_keyword("secret"), None);
        assert_eq!(PasswordType::Password.to_string(), "password");
    }

    #[test]
    fn test_line_json_tagging() {
        let line: Line = Acl::new("is_api", "path_beg /api").into();
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["type"], "acl");
        assert_eq!(json["name"], "is_api");

        let back: Line = serde_json::from_value(json).unwrap();
        assert_eq!(back, line);
    }
}
