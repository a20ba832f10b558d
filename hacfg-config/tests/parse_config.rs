//! End-to-end parsing scenarios

use hacfg_config::{load, parse, render, BuildError, LoadError};
use hacfg_core::{Bind, Configuration, Frontend, Line, PasswordType, SectionKind, Server};

const SAMPLE: &str = r#"# Sample load balancer
global
    log 127.0.0.1 local0
    maxconn 4096
    user haproxy
    daemon

defaults
    log global
    mode http
    option httplog
    option dontlognull
    retries 3
    timeout connect 5000
    timeout client  50000
    timeout server  50000
    errorfile 503 /etc/haproxy/errors/503.http

userlist admins
    group ops users alice,bob
    user alice insecure-password hunter2 groups ops
    user bob password $6$salt$hash

listen stats 0.0.0.0:8404
    stats enable
    stats uri /stats

frontend www
    bind *:80
    bind *:443 ssl crt /etc/ssl/site.pem
    acl is_api path_beg /api
    acl is_static path_end .css .js
    use_backend api if is_api
    use_backend static unless !is_static
    default_backend web

backend web
    balance roundrobin
    server web1 10.0.0.1:8080 check inter 2000
    server web2 10.0.0.2:8080 check backup

backend api
    option httpchk GET /health
    server api1 api.internal:9000 check

backend static
    server cdn 10.0.1.5
"#;

fn sample() -> Configuration {
    load(SAMPLE).unwrap()
}

#[test]
fn test_section_counts() {
    let config = sample();
    assert!(config.global.is_some());
    assert_eq!(config.defaults.len(), 1);
    assert_eq!(config.userlists.len(), 1);
    assert_eq!(config.listens.len(), 1);
    assert_eq!(config.frontends.len(), 1);
    assert_eq!(config.backends.len(), 3);
    assert_eq!(config.section_count(), 8);
}

#[test]
fn test_line_counts_match_source() {
    let config = sample();
    assert_eq!(config.global().unwrap().block.len(), 4);
    assert_eq!(config.defaults[0].block.len(), 10);
    assert_eq!(config.frontends[0].block.len(), 7);
    assert_eq!(config.backends[0].block.servers().count(), 2);
}

#[test]
fn test_defaults_keywords() {
    let config = sample();
    let block = &config.defaults[0].block;
    assert_eq!(block.config("timeout client").unwrap().value, "50000");
    assert_eq!(block.config("errorfile 503").unwrap().value, "/etc/haproxy/errors/503.http");
    assert_eq!(block.options().count(), 2);
    assert!(block.option("dontlognull").is_some());
}

#[test]
fn test_frontend_routing() {
    let config = sample();
    let frontend = config.frontend("www").unwrap();
    assert_eq!(frontend.host, "*");
    assert_eq!(frontend.port, "80");

    let binds: Vec<&Bind> = frontend.block.binds().collect();
    assert_eq!(binds[1].attributes, ["ssl", "crt", "/etc/ssl/site.pem"]);

    let fallback = frontend.block.use_backend("static").unwrap();
    assert_eq!(fallback.operator, "unless");
    assert_eq!(fallback.condition, "!is_static");
    assert_eq!(frontend.block.default_backend().unwrap().backend_name, "web");
    assert_eq!(frontend.block.acl("is_static").unwrap().value, "path_end .css .js");
}

#[test]
fn test_listen_header_address() {
    let config = sample();
    let stats = config.listen("stats").unwrap();
    assert_eq!(stats.host, "0.0.0.0");
    assert_eq!(stats.port, "8404");
    assert_eq!(stats.block.configs().count(), 2);
}

#[test]
fn test_servers() {
    let config = sample();
    let api = config.backend("api").unwrap();
    let server = api.block.server("api1").unwrap();
    assert_eq!(server.host, "api.internal");
    assert_eq!(server.port, "9000");

    let cdn = config.backend("static").unwrap().block.server("cdn").unwrap();
    assert_eq!(cdn.host, "10.0.1.5");
    assert_eq!(cdn.port, "");
    assert!(cdn.attributes.is_empty());
}

#[test]
fn test_userlist() {
    let config = sample();
    let admins = config.userlist("admins").unwrap();
    assert_eq!(admins.block.group("ops").unwrap().user_names, ["alice", "bob"]);
    assert_eq!(admins.block.user("bob").unwrap().password_type, PasswordType::Password);
    assert_eq!(admins.block.user("bob").unwrap().password, "$6$salt$hash");
}

#[test]
fn test_render_reparses_to_same_model() {
    let config = sample();
    let again = load(&render(&config)).unwrap();
    assert_eq!(again, config);
}

#[test]
fn test_rendered_text_is_stable() {
    let first = render(&sample());
    let second = render(&load(&first).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_edit_and_render() {
    let mut config = sample();
    let web = config.backend_mut("web").unwrap();
    web.block.remove_server("web2");
    web.block
        .add_server(Server::new("web3", "10.0.0.3", "8080").with_attribute("check"));

    let mut frontend = Frontend::new("admin", "127.0.0.1", "9000");
    frontend.block.push(Line::from(Bind::new("127.0.0.1", "9000")));
    config.add_frontend(frontend);

    let text = render(&config);
    assert!(text.contains("    server web3 10.0.0.3:8080 check\n"));
    assert!(!text.contains("web2"));
    assert!(text.contains("frontend admin\n    bind 127.0.0.1:9000\n"));
}

#[test]
fn test_parse_error_message() {
    let err = parse("# header\n\nfronted www\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.column, 1);
    let message = err.to_string();
    assert!(message.starts_with("Line 3: expected "));
    assert!(message.ends_with("\nfronted www\n^"));
}

#[test]
fn test_trailing_garbage_position() {
    let err = parse("backend app\n    server web1 10.0.0.1:80\n    %%\n").unwrap_err();
    assert_eq!(err.line, 3);
    assert_eq!(err.column, 5);
}

#[test]
fn test_frontend_without_address() {
    let err = load("frontend www\n    mode http\n").unwrap_err();
    match err {
        LoadError::Build(BuildError::MissingAddress { section, name }) => {
            assert_eq!(section, SectionKind::Frontend);
            assert_eq!(name, "www");
        }
        other => panic!("unexpected error: {other}"),
    }
}
