//! Error reporting and global flags.

use crate::support::*;
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unauthorized_is_reported_per_secret() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
        .mount(&server)
        .await;
    let t = Test::with_declarations(SINGLE_DECLARATION);

    let output = t.apply(&server.uri());
    assert_failure(&output);
    assert_stderr_contains(&output, "HTTP 401: Bad credentials");
    assert_stderr_contains(&output, "1 resource(s) failed");
    assert_stderr_contains(&output, "set GITHUB_TOKEN");
    assert!(t.state_path().exists());
    assert!(t.state().is_empty());
}

#[test]
fn test_invalid_api_url() {
    let t = Test::with_declarations(SINGLE_DECLARATION);
    let output = t.run_api("ftp://example.com", &["plan"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid API URL");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_api_url_from_environment() {
    let server = MockServer::start().await;
    let t = Test::with_declarations(SINGLE_DECLARATION);

    let output = t
        .cmd()
        .arg("plan")
        .env("GITHUB_API_URL", server.uri())
        .output()
        .unwrap();
    assert_success(&output);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_logs_on_stderr() {
    let server = MockServer::start().await;
    let t = Test::with_declarations(SINGLE_DECLARATION);

    let output = t.run_api(&server.uri(), &["--verbose", "--log-format", "json", "plan", "--json"]);
    assert_success(&output);

    let json = stdout_json(&output);
    assert_eq!(json["entries"][0]["action"], "create");

    let err = stderr(&output);
    let first = err.lines().find(|l| l.starts_with('{')).expect("no JSON log line");
    let line: serde_json::Value = serde_json::from_str(first).unwrap();
    assert!(line.get("level").is_some());
}

#[test]
fn test_token_never_printed() {
    let t = Test::new();
    let output = t
        .cmd()
        .args(["--help"])
        .env("GITHUB_TOKEN", "ghp_very_secret")
        .output()
        .unwrap();
    assert_success(&output);
    assert!(!stdout(&output).contains("ghp_very_secret"));
}
