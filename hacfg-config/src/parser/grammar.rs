//! Grammar rules
//!
//! One method per rule. Every line, the last one included, ends with `\n`.
//!
//! ```text
//! configuration   = (comment_line | blank_line | <section>)*
//! <section>       = <header> config_block
//! config_block    = (server_line | option_line | bind_line | acl_line
//!                    | backend_line | group_line | user_line | config_line
//!                    | comment_line | blank_line)*
//! ```

use super::engine::{Parser, Seq};
use super::terminal::{
    BLANK, DIGIT, DNS, KEYWORD, NAME, NEWLINE, PASSWORD, SECTION_KEYWORDS, VALUE,
};
use super::tree::{Node, NodeKind};

impl<'src> Parser<'src> {
    pub(crate) fn configuration(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Configuration, pos, |p, pos| {
            p.zero_or_more(pos, |p, at| {
                p.choice(
                    at,
                    &[
                        Self::comment_line,
                        Self::blank_line,
                        Self::global_section,
                        Self::defaults_section,
                        Self::userlist_section,
                        Self::listen_section,
                        Self::frontend_section,
                        Self::backend_section,
                    ],
                )
            })
        })
    }

    // ========================================
    // Sections
    // ========================================

    fn section(
        &mut self,
        kind: NodeKind,
        pos: usize,
        header: fn(&mut Self, usize) -> Option<Node>,
    ) -> Option<Node> {
        self.rule(kind, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(header(p, s.end()))?;
            s.then(p.config_block(s.end()))?;
            s.finish()
        })
    }

    fn global_section(&mut self, pos: usize) -> Option<Node> {
        self.section(NodeKind::GlobalSection, pos, Self::global_header)
    }

    fn defaults_section(&mut self, pos: usize) -> Option<Node> {
        self.section(NodeKind::DefaultsSection, pos, Self::defaults_header)
    }

    fn userlist_section(&mut self, pos: usize) -> Option<Node> {
        self.section(NodeKind::UserlistSection, pos, Self::userlist_header)
    }

    fn listen_section(&mut self, pos: usize) -> Option<Node> {
        self.section(NodeKind::ListenSection, pos, Self::listen_header)
    }

    fn frontend_section(&mut self, pos: usize) -> Option<Node> {
        self.section(NodeKind::FrontendSection, pos, Self::frontend_header)
    }

    fn backend_section(&mut self, pos: usize) -> Option<Node> {
        self.section(NodeKind::BackendSection, pos, Self::backend_header)
    }

    // ========================================
    // Headers
    // ========================================

    fn global_header(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::GlobalHeader, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "global"))?;
            s.then(p.ws(s.end()))?;
            p.comment_tail(&mut s)?;
            s.finish()
        })
    }

    fn defaults_header(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::DefaultsHeader, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "defaults"))?;
            s.then(p.optional(s.end(), |p, at| {
                let mut named = Seq::new(at);
                named.then(p.ws1(named.end()))?;
                named.then(p.proxy_name(named.end()))?;
                named.finish()
            }))?;
            s.then(p.ws(s.end()))?;
            p.comment_tail(&mut s)?;
            s.finish()
        })
    }

    fn userlist_header(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::UserlistHeader, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "userlist"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.proxy_name(s.end()))?;
            s.then(p.ws(s.end()))?;
            p.comment_tail(&mut s)?;
            s.finish()
        })
    }

    fn listen_header(&mut self, pos: usize) -> Option<Node> {
        self.proxy_header(NodeKind::ListenHeader, pos, "listen", true)
    }

    fn frontend_header(&mut self, pos: usize) -> Option<Node> {
        self.proxy_header(NodeKind::FrontendHeader, pos, "frontend", true)
    }

    fn backend_header(&mut self, pos: usize) -> Option<Node> {
        self.proxy_header(NodeKind::BackendHeader, pos, "backend", false)
    }

    /// `ws <keyword> ws1 proxy_name ws [service_address?] value? comment? lb`
    fn proxy_header(
        &mut self,
        kind: NodeKind,
        pos: usize,
        keyword: &'static str,
        with_address: bool,
    ) -> Option<Node> {
        self.rule(kind, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), keyword))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.proxy_name(s.end()))?;
            s.then(p.ws(s.end()))?;
            if with_address {
                s.then(p.optional(s.end(), Self::service_address))?;
            }
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    // ========================================
    // Lines
    // ========================================

    fn config_block(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::ConfigBlock, pos, |p, pos| {
            p.zero_or_more(pos, |p, at| {
                p.choice(
                    at,
                    &[
                        Self::server_line,
                        Self::option_line,
                        Self::bind_line,
                        Self::acl_line,
                        Self::backend_line,
                        Self::group_line,
                        Self::user_line,
                        Self::config_line,
                        Self::comment_line,
                        Self::blank_line,
                    ],
                )
            })
        })
    }

    fn server_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::ServerLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "server"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.server_name(s.end()))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.service_address(s.end()))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    fn option_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::OptionLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "option"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.keyword(s.end()))?;
            s.then(p.ws(s.end()))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    fn bind_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::BindLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "bind"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.service_address(s.end()))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    fn acl_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::AclLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "acl"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.acl_name(s.end()))?;
            s.then(p.ws(s.end()))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    /// `use_backend <name> [if|unless <condition>]` or `default_backend <name>`
    fn backend_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::BackendLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.backend_type(s.end()))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.backend_name(s.end()))?;
            s.then(p.ws(s.end()))?;
            s.then(p.optional(s.end(), |p, at| {
                let mut op = Seq::new(at);
                op.then(p.operator(op.end()))?;
                op.then(p.ws1(op.end()))?;
                op.finish()
            }))?;
            s.then(p.optional(s.end(), Self::backend_condition))?;
            p.comment_tail(&mut s)?;
            s.finish()
        })
    }

    fn group_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::GroupLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "group"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.group_name(s.end()))?;
            s.then(p.ws(s.end()))?;
            s.then(p.optional(s.end(), |p, at| p.labelled(at, "users")))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    fn user_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::UserLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.literal(s.end(), "user"))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.user_name(s.end()))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.password_type(s.end()))?;
            s.then(p.ws1(s.end()))?;
            s.then(p.password(s.end()))?;
            s.then(p.ws(s.end()))?;
            s.then(p.optional(s.end(), |p, at| p.labelled(at, "groups")))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    /// Any other `<keyword> <value>` directive
    fn config_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::ConfigLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.not_followed_by(s.end(), |p, at| p.one_of(at, SECTION_KEYWORDS)))?;
            s.then(p.keyword(s.end()))?;
            s.then(p.ws(s.end()))?;
            p.line_tail(&mut s)?;
            s.finish()
        })
    }

    fn comment_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::CommentLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.comment_text(s.end()))?;
            s.then(p.lb(s.end()))?;
            s.finish()
        })
    }

    fn blank_line(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::BlankLine, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.ws(s.end()))?;
            s.then(p.lb(s.end()))?;
            s.finish()
        })
    }

    /// `value? comment_text? lb`
    fn line_tail(&mut self, s: &mut Seq) -> Option<()> {
        s.then(self.optional(s.end(), Self::value))?;
        self.comment_tail(s)
    }

    /// `comment_text? lb`
    fn comment_tail(&mut self, s: &mut Seq) -> Option<()> {
        s.then(self.optional(s.end(), Self::comment_text))?;
        s.then(self.lb(s.end()))
    }

    /// `<label> ws`
    fn labelled(&mut self, pos: usize, label: &str) -> Option<Node> {
        let mut s = Seq::new(pos);
        s.then(self.literal(s.end(), label))?;
        s.then(self.ws(s.end()))?;
        s.finish()
    }

    // ========================================
    // Tokens
    // ========================================

    fn comment_text(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::CommentText, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.literal(s.end(), "#"))?;
            s.then(p.zero_or_more(s.end(), |p, at| {
                let mut c = Seq::new(at);
                c.then(p.not_followed_by(c.end(), Self::lb))?;
                c.then(p.any_char(c.end()))?;
                c.finish()
            }))?;
            s.then(p.followed_by(s.end(), Self::lb))?;
            s.finish()
        })
    }

    fn lb(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::LineBreak, pos, |p, pos| p.class(pos, &NEWLINE))
    }

    fn ws(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Whitespace, pos, |p, pos| {
            p.zero_or_more(pos, |p, at| p.class(at, &BLANK))
        })
    }

    fn ws1(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::WhitespacePlus, pos, |p, pos| {
            p.one_or_more(pos, |p, at| p.class(at, &BLANK))
        })
    }

    /// Directive keyword; `timeout` and `errorfile` take their first
    /// argument along (`timeout connect`, `errorfile 503`)
    fn keyword(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Keyword, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.optional(s.end(), |p, at| {
                let mut prefix = Seq::new(at);
                prefix.then(p.one_of(prefix.end(), &["errorfile", "timeout"]))?;
                prefix.then(p.ws1(prefix.end()))?;
                prefix.finish()
            }))?;
            s.then(p.one_or_more(s.end(), |p, at| p.class(at, &KEYWORD)))?;
            s.finish()
        })
    }

    fn backend_type(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::BackendType, pos, |p, pos| {
            p.one_of(pos, &["use_backend", "default_backend"])
        })
    }

    fn operator(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Operator, pos, |p, pos| p.one_of(pos, &["if", "unless"]))
    }

    fn password_type(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::PasswordType, pos, |p, pos| {
            p.one_of(pos, &["password", "insecure-password"])
        })
    }

    fn proxy_name(&mut self, pos: usize) -> Option<Node> {
        self.name(NodeKind::ProxyName, pos)
    }

    fn server_name(&mut self, pos: usize) -> Option<Node> {
        self.name(NodeKind::ServerName, pos)
    }

    fn acl_name(&mut self, pos: usize) -> Option<Node> {
        self.name(NodeKind::AclName, pos)
    }

    fn backend_name(&mut self, pos: usize) -> Option<Node> {
        self.name(NodeKind::BackendName, pos)
    }

    fn group_name(&mut self, pos: usize) -> Option<Node> {
        self.name(NodeKind::GroupName, pos)
    }

    fn user_name(&mut self, pos: usize) -> Option<Node> {
        self.name(NodeKind::UserName, pos)
    }

    fn name(&mut self, kind: NodeKind, pos: usize) -> Option<Node> {
        self.rule(kind, pos, |p, pos| p.one_or_more(pos, |p, at| p.class(at, &NAME)))
    }

    fn password(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Password, pos, |p, pos| {
            p.one_or_more(pos, |p, at| p.class(at, &PASSWORD))
        })
    }

    fn value(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Value, pos, |p, pos| {
            p.one_or_more(pos, |p, at| p.class(at, &VALUE))
        })
    }

    fn backend_condition(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::BackendCondition, pos, |p, pos| {
            p.one_or_more(pos, |p, at| p.class(at, &VALUE))
        })
    }

    // ========================================
    // Addresses
    // ========================================

    /// `host ":"? port`, or a bare `:port`
    fn service_address(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::ServiceAddress, pos, |p, pos| {
            p.host_and_port(pos).or_else(|| p.port_only(pos))
        })
    }

    fn host_and_port(&mut self, pos: usize) -> Option<Node> {
        let mut s = Seq::new(pos);
        s.then(self.host(s.end()))?;
        s.then(self.optional(s.end(), |p, at| p.literal(at, ":")))?;
        s.then(self.port(s.end()))?;
        s.finish()
    }

    fn port_only(&mut self, pos: usize) -> Option<Node> {
        let mut s = Seq::new(pos);
        s.then(self.literal(s.end(), ":"))?;
        let port = self.port(s.end()).filter(|port| !port.is_empty());
        s.then(port)?;
        s.finish()
    }

    fn host(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Host, pos, |p, pos| {
            p.choice(pos, &[Self::ipv4_host, Self::dns_host, Self::wildcard_host])
        })
    }

    fn ipv4_host(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Ipv4Host, pos, |p, pos| {
            let mut s = Seq::new(pos);
            s.then(p.digits(s.end()))?;
            for _ in 0..3 {
                s.then(p.literal(s.end(), "."))?;
                s.then(p.digits(s.end()))?;
            }
            s.finish()
        })
    }

    fn dns_host(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::DnsHost, pos, |p, pos| {
            p.one_or_more(pos, |p, at| p.class(at, &DNS))
        })
    }

    fn wildcard_host(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::WildcardHost, pos, |p, pos| p.literal(pos, "*"))
    }

    fn port(&mut self, pos: usize) -> Option<Node> {
        self.rule(NodeKind::Port, pos, |p, pos| {
            p.zero_or_more(pos, |p, at| p.class(at, &DIGIT))
        })
    }

    fn digits(&mut self, pos: usize) -> Option<Node> {
        self.one_or_more(pos, |p, at| p.class(at, &DIGIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::engine::ParserConfig;

    fn parse(source: &str) -> Node {
        Parser::new(source).parse().unwrap()
    }

    fn line_kinds(section: &Node) -> Vec<NodeKind> {
        let block = section.find(NodeKind::ConfigBlock).unwrap();
        block
            .named_children()
            .into_iter()
            .map(|line| line.kind)
            .collect()
    }

    #[test]
    fn test_sections_in_order() {
        let root = parse("global\n\ndefaults\nfrontend www *:80\nbackend app\n");
        let kinds: Vec<NodeKind> = root
            .named_children()
            .into_iter()
            .map(|node| node.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                NodeKind::GlobalSection,
                NodeKind::DefaultsSection,
                NodeKind::FrontendSection,
                NodeKind::BackendSection,
            ]
        );
    }

    #[test]
    fn test_block_line_dispatch() {
        let source = "backend app\n    server web1 10.0.0.1:80 check\n    option httpchk\n    # note\n\n    acl a path /x\n    use_backend b if a\n    default_backend c\n    balance roundrobin\n";
        let root = parse(source);
        let backend = root.named_children()[0];
        assert_eq!(
            line_kinds(backend),
            [
                NodeKind::ServerLine,
                NodeKind::OptionLine,
                NodeKind::CommentLine,
                NodeKind::BlankLine,
                NodeKind::AclLine,
                NodeKind::BackendLine,
                NodeKind::BackendLine,
                NodeKind::ConfigLine,
            ]
        );
    }

    #[test]
    fn test_server_address_parts() {
        let source = "backend app\n    server web1 10.0.0.1:8080 check\n";
        let root = parse(source);
        let block = root.named_children()[0].find(NodeKind::ConfigBlock).unwrap();
        let server = block.named_children()[0];
        let address = server.find(NodeKind::ServiceAddress).unwrap();
        let host = address.find(NodeKind::Host).unwrap();
        assert_eq!(host.children[0].kind, NodeKind::Ipv4Host);
        assert_eq!(&source[host.span.start..host.span.end], "10.0.0.1");
        let port = address.find(NodeKind::Port).unwrap();
        assert_eq!(&source[port.span.start..port.span.end], "8080");
    }

    #[test]
    fn test_timeout_keyword_takes_argument() {
        let source = "defaults\n    timeout connect 5s\n";
        let root = parse(source);
        let block = root.named_children()[0].find(NodeKind::ConfigBlock).unwrap();
        let keyword = block.named_children()[0].find(NodeKind::Keyword).unwrap();
        assert_eq!(&source[keyword.span.start..keyword.span.end], "timeout connect");
    }

    #[test]
    fn test_section_keyword_is_not_a_config_line() {
        let err = Parser::new("global\n    listen\n").parse().unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_misspelled_section_lists_all_headers() {
        let err = Parser::new("fronted f\n").parse().unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 1);
        for keyword in SECTION_KEYWORDS {
            assert!(
                err.expected.contains(&format!("\"{keyword}\"")),
                "missing {keyword} in {:?}",
                err.expected
            );
        }
    }

    #[test]
    fn test_missing_final_newline() {
        let err = Parser::new("global\n    maxconn 10").parse().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.expected.contains(&"[\\n]".to_string()));
    }

    #[test]
    fn test_empty_input() {
        let root = parse("");
        assert!(root.children.is_empty());
        assert_eq!(root.kind, NodeKind::Configuration);
    }

    #[test]
    fn test_memoization_does_not_change_result() {
        let source = "frontend www\n    bind :443 ssl crt /etc/cert.pem\n    use_backend api unless is_static # route\n";
        let memoized = Parser::new(source).parse().unwrap();
        let plain = Parser::with_config(source, ParserConfig { memoize: false })
            .parse()
            .unwrap();
        assert_eq!(memoized, plain);
    }

    #[test]
    fn test_memo_never_adds_work() {
        let mut source = String::from("frontend www *:80\n    default_backend app0\n");
        for i in 0..200 {
            source.push_str(&format!("\nbackend app{i}\n    server s{i} 10.0.0.{i}:8080 check\n"));
        }

        let mut memoized = Parser::new(&source);
        let tree = memoized.parse().unwrap();
        let mut plain = Parser::with_config(&source, ParserConfig { memoize: false });
        assert_eq!(plain.parse().unwrap(), tree);

        let (memoized, plain) = (memoized.stats(), plain.stats());
        assert!(memoized.rule_calls <= plain.rule_calls);
        assert!(memoized.rule_calls - memoized.memo_hits < plain.rule_calls);
    }

    #[test]
    fn test_memo_hits_are_counted() {
        let mut parser = Parser::new("backend app\n    balance roundrobin\n");
        parser.parse().unwrap();
        let stats = parser.stats();
        assert!(stats.memo_hits > 0);
        assert!(stats.rule_calls > stats.memo_hits);
    }
}
