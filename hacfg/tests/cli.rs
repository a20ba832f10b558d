use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const VALID: &str = "global\n    maxconn 256\n\nfrontend www\n    bind *:80\n    default_backend app\n\nbackend app\n    server web1   10.0.0.1:8080   check # primary\n";

struct TestConfig {
    dir: tempfile::TempDir,
    path: PathBuf,
}

impl TestConfig {
    fn new(body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haproxy.cfg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        Self { dir, path }
    }

    fn dir(&self) -> &Path {
        self.dir.path()
    }
}

fn hacfg(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hacfg"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run hacfg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_validate_valid_config() {
    let config = TestConfig::new(VALID);
    let output = hacfg(&["validate", config.path.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("is valid"));
}

#[test]
fn test_validate_syntax_error() {
    let config = TestConfig::new("global\n    maxconn 256\n  ?bogus\n");
    let output = hacfg(&["validate", config.path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("line 3"), "stderr: {err}");
    assert!(err.contains("expected"), "stderr: {err}");
}

#[test]
fn test_validate_missing_address() {
    let config = TestConfig::new("frontend www\n    mode http\n");
    let output = hacfg(&["validate", config.path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("has no address"));
}

#[test]
fn test_validate_missing_file() {
    let output = hacfg(&["validate", "/nonexistent/haproxy.cfg"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read"));
}

#[test]
fn test_fmt_to_stdout() {
    let config = TestConfig::new(VALID);
    let output = hacfg(&["fmt", config.path.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "global\n    maxconn 256\n\nfrontend www\n    bind *:80\n    default_backend app\n\nbackend app\n    server web1 10.0.0.1:8080 check\n"
    );
}

#[test]
fn test_fmt_to_file_without_memo() {
    let config = TestConfig::new(VALID);
    let target = config.dir().join("out.cfg");
    let output = hacfg(&[
        "--no-memo",
        "fmt",
        config.path.to_str().unwrap(),
        "-o",
        target.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let written = std::fs::read_to_string(&target).unwrap();
    assert!(written.starts_with("global\n"));
    assert!(written.contains("    server web1 10.0.0.1:8080 check\n"));
}

#[test]
fn test_dump_json() {
    let config = TestConfig::new(VALID);
    let output = hacfg(&["dump", config.path.to_str().unwrap()]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["frontends"][0]["name"], "www");
    assert_eq!(json["frontends"][0]["port"], "80");
    assert_eq!(json["backends"][0]["block"][0]["type"], "server");
    assert_eq!(json["backends"][0]["block"][0]["attributes"][0], "check");
}

#[test]
fn test_dump_toml() {
    let config = TestConfig::new(VALID);
    let output = hacfg(&["dump", config.path.to_str().unwrap(), "--format", "toml"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("[[backends]]"), "stdout: {text}");
    assert!(text.contains("name = \"app\""));
}

#[test]
fn test_version() {
    let output = hacfg(&["version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("hacfg v"));
}
