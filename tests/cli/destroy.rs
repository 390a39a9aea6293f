//! Tests for `gh-secrets destroy`.

use crate::support::*;
use gh_secrets::core::state::{fingerprint, StateFile, TrackedSecret};
use gh_secrets::core::types::LocalTrackedState;
use wiremock::MockServer;

fn state_with(names: &[&str]) -> StateFile {
    let mut state = StateFile::default();
    for name in names {
        state.insert(
            format!("acme:widgets:{}", name),
            TrackedSecret::new("acme/widgets", name, fingerprint("v"), LocalTrackedState::default()),
        );
    }
    state
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_destroy_deletes_all_tracked() {
    let server = MockServer::start().await;
    mount_delete(&server, "acme", "widgets", "A").await;
    mount_delete(&server, "acme", "widgets", "B").await;
    let t = Test::new();
    t.save_state(&state_with(&["A", "B"]));

    let output = t.destroy(&server.uri());
    assert_success(&output);
    assert_stdout_contains(&output, "2 secret(s) deleted");
    assert!(t.state().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_destroy_keeps_failed_ids() {
    let server = MockServer::start().await;
    mount_delete(&server, "acme", "widgets", "A").await;
    let t = Test::new();
    t.save_state(&state_with(&["A", "B"]));

    let output = t.destroy(&server.uri());
    assert_failure(&output);
    assert_eq!(t.state().ids(), vec!["acme:widgets:B".to_string()]);
}

#[test]
fn test_destroy_nothing_tracked() {
    let t = Test::new();
    let output = t.run(&["destroy", "--yes"]);
    assert_success(&output);
    assert_stdout_contains(&output, "nothing tracked");
}
