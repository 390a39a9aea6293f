//! Tests for `gh-secrets plan`, `apply` and `refresh`.

use crate::support::*;
use gh_secrets::core::state::{fingerprint, StateFile, TrackedSecret};
use gh_secrets::core::types::LocalTrackedState;
use wiremock::MockServer;

const ID: &str = "acme:widgets:API_KEY";

fn tracked(value: &str) -> StateFile {
    let mut state = StateFile::default();
    state.insert(
        ID.to_string(),
        TrackedSecret::new(
            "acme/widgets",
            "API_KEY",
            fingerprint(value),
            LocalTrackedState {
                created_at: Some(CREATED_AT.to_string()),
                updated_at: Some(UPDATED_AT.to_string()),
            },
        ),
    );
    state
}

async fn methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.method.to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_plan_shows_create_and_writes_nothing() {
    let server = MockServer::start().await;
    let t = Test::with_declarations(SINGLE_DECLARATION);

    let output = t.plan(&server.uri());
    assert_success(&output);
    assert_stdout_contains(&output, "+ acme:widgets:API_KEY  create");
    assert_stderr_contains(&output, "1 change(s) pending");

    assert!(methods(&server).await.is_empty());
    assert!(!t.state_path().exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_creates_and_tracks() {
    let server = MockServer::start().await;
    let key = RepoKey::generate();
    mount_repository(&server, "acme", "widgets", "API_KEY", &key).await;
    let t = Test::with_declarations(SINGLE_DECLARATION);

    let output = t.apply(&server.uri());
    assert_success(&output);
    assert_stdout_contains(&output, "1 change(s) applied");
    assert_eq!(methods(&server).await, vec!["GET", "PUT", "GET"]);

    let state = t.state();
    let entry = state.get(ID).unwrap();
    assert_eq!(entry.value_sha256, fingerprint("s3cr3t"));
    assert_eq!(entry.updated_at.as_deref(), Some(UPDATED_AT));

    let raw = std::fs::read_to_string(t.state_path()).unwrap();
    assert!(!raw.contains("s3cr3t"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_in_sync_is_read_only() {
    let server = MockServer::start().await;
    mount_metadata(&server, "acme", "widgets", "API_KEY", UPDATED_AT).await;
    let t = Test::with_declarations(SINGLE_DECLARATION);
    t.save_state(&tracked("s3cr3t"));

    let output = t.apply(&server.uri());
    assert_success(&output);
    assert_stdout_contains(&output, "secrets match declarations");
    assert_eq!(methods(&server).await, vec!["GET"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_json_reports_drift_recreate() {
    let server = MockServer::start().await;
    let key = RepoKey::generate();
    mount_public_key(&server, "acme", "widgets", &key).await;
    mount_upsert(&server, "acme", "widgets", "API_KEY").await;
    mount_metadata(&server, "acme", "widgets", "API_KEY", UPDATED_ELSEWHERE).await;
    let t = Test::with_declarations(SINGLE_DECLARATION);
    t.save_state(&tracked("s3cr3t"));

    let output = t.run_api(&server.uri(), &["apply", "--json"]);
    assert_success(&output);

    let json = stdout_json(&output);
    assert_eq!(json["failures"], 0);
    assert_eq!(json["entries"][0]["id"], ID);
    assert_eq!(json["entries"][0]["action"], "recreate");
    assert_eq!(json["entries"][0]["reason"], "drifted");
    assert_eq!(json["entries"][0]["applied"], true);

    // Re-read after the recreate adopts the remote timestamp.
    let state = t.state();
    assert_eq!(state.get(ID).unwrap().updated_at.as_deref(), Some(UPDATED_ELSEWHERE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_deletes_undeclared() {
    let server = MockServer::start().await;
    mount_delete(&server, "acme", "widgets", "API_KEY").await;
    let t = Test::with_declarations("");
    t.save_state(&tracked("s3cr3t"));

    let output = t.apply(&server.uri());
    assert_success(&output);
    assert_stdout_contains(&output, "- acme:widgets:API_KEY  delete");
    assert!(t.state().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_apply_failure_exits_nonzero_and_keeps_state() {
    let server = MockServer::start().await;
    let t = Test::with_declarations("");
    t.save_state(&tracked("s3cr3t"));

    // No DELETE mock: the fake API answers 404.
    let output = t.apply(&server.uri());
    assert_failure(&output);
    assert_stderr_contains(&output, "1 resource(s) failed");
    assert!(t.state().get(ID).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_refresh_forgets_deleted_secret() {
    let server = MockServer::start().await;
    let t = Test::new();
    t.save_state(&tracked("s3cr3t"));

    let output = t.refresh(&server.uri());
    assert_success(&output);
    assert_stdout_contains(&output, "forget (deleted outside gh-secrets)");
    assert!(t.state().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_refresh_keeps_in_sync_secret() {
    let server = MockServer::start().await;
    mount_metadata(&server, "acme", "widgets", "API_KEY", UPDATED_AT).await;
    let t = Test::new();
    t.save_state(&tracked("s3cr3t"));

    let output = t.refresh(&server.uri());
    assert_success(&output);
    assert_eq!(t.state(), tracked("s3cr3t"));
}
