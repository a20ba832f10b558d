//! Configuration renderer
//!
//! Serializes a [`Configuration`] back to configuration text. Sections are
//! written by category (global, defaults, userlists, listens, frontends,
//! backends), each category in insertion order. Comments and blank lines of
//! the source text are not part of the model and are not reproduced.

use crate::config::{Configuration, Line, LineBlock, Section, SectionKind};
use std::fmt;

const INDENT: &str = "    ";

/// Render a configuration to text
pub fn render(config: &Configuration) -> String {
    let mut out = String::new();

    if let Some(global) = &config.global {
        render_section(&mut out, global, "");
    }
    for defaults in &config.defaults {
        render_section(&mut out, defaults, "");
    }
    for userlist in &config.userlists {
        render_section(&mut out, userlist, "");
    }
    for listen in &config.listens {
        let address = header_address(&listen.block, &listen.host, &listen.port);
        render_section(&mut out, listen, &address);
    }
    for frontend in &config.frontends {
        let address = header_address(&frontend.block, &frontend.host, &frontend.port);
        render_section(&mut out, frontend, &address);
    }
    for backend in &config.backends {
        render_section(&mut out, backend, "");
    }

    tracing::trace!(
        "Rendered {} section(s), {} byte(s)",
        config.section_count(),
        out.len()
    );
    out
}

/// `host[:port]`, the port separator is dropped when the port is empty
pub fn format_address(host: &str, port: &str) -> String {
    if port.is_empty() {
        host.to_string()
    } else {
        format!("{host}:{port}")
    }
}

/// Header address of a listen/frontend; a bind line supplies it instead
fn header_address(block: &LineBlock, host: &str, port: &str) -> String {
    if block.has_binds() {
        String::new()
    } else {
        format_address(host, port)
    }
}

fn render_section<S: Section>(out: &mut String, section: &S, address: &str) {
    if !out.is_empty() {
        out.push('\n');
    }

    let keyword = S::KIND.keyword();
    match S::KIND {
        SectionKind::Global => directive(out, "", &[keyword]),
        _ => directive(out, "", &[keyword, section.name(), address]),
    }

    for line in section.block() {
        render_line(out, line);
    }
}

fn render_line(out: &mut String, line: &Line) {
    match line {
        Line::Config(config) => directive(out, INDENT, &[&config.keyword, &config.value]),
        Line::Option(option) => {
            directive(out, INDENT, &["option", &option.keyword, &option.value]);
        }
        Line::Server(server) => {
            let address = format_address(&server.host, &server.port);
            let attributes = server.attributes.join(" ");
            directive(out, INDENT, &["server", &server.name, &address, &attributes]);
        }
        Line::Bind(bind) => {
            let address = format_address(&bind.host, &bind.port);
            let attributes = bind.attributes.join(" ");
            directive(out, INDENT, &["bind", &address, &attributes]);
        }
        Line::Acl(acl) => directive(out, INDENT, &["acl", &acl.name, &acl.value]),
        Line::UseBackend(backend) => directive(
            out,
            INDENT,
            &[
                backend.directive(),
                &backend.backend_name,
                &backend.operator,
                &backend.condition,
            ],
        ),
        Line::User(user) => {
            let groups = name_list("groups", &user.group_names);
            directive(
                out,
                INDENT,
                &[
                    "user",
                    &user.name,
                    user.password_type.as_str(),
                    &user.password,
                    &groups,
                ],
            );
        }
        Line::Group(group) => {
            let users = name_list("users", &group.user_names);
            directive(out, INDENT, &["group", &group.name, &users]);
        }
    }
}

/// `<label> a,b,c`, or nothing for an empty list
fn name_list(label: &str, names: &[String]) -> String {
    if names.is_empty() {
        String::new()
    } else {
        format!("{label} {}", names.join(","))
    }
}

/// Write one line: non-empty parts joined by single spaces
fn directive(out: &mut String, indent: &str, parts: &[&str]) {
    out.push_str(indent);
    let mut first = true;
    for part in parts.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        if !first {
            out.push(' ');
        }
        out.push_str(part);
        first = false;
    }
    out.push('\n');
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        render_line(&mut out, self);
        f.write_str(out.trim())
    }
}

impl fmt::Display for LineBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
