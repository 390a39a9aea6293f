//! Tests for `gh-secrets seal`.

use crate::support::*;

#[test]
fn test_seal_value_argument() {
    let t = Test::new();
    let key = RepoKey::generate();

    let output = t.run(&["seal", "--key", &key.public_b64, "--value", "s3cr3t"]);
    assert_success(&output);
    assert_eq!(key.open(stdout(&output).trim()), "s3cr3t");
}

#[test]
fn test_seal_reads_stdin_without_trailing_newline() {
    let t = Test::new();
    let key = RepoKey::generate();

    let output = t
        .cmd()
        .args(["seal", "--key", &key.public_b64])
        .write_stdin("from stdin\n")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(key.open(stdout(&output).trim()), "from stdin");
}

#[test]
fn test_seal_rejects_bad_key() {
    let t = Test::new();

    let output = t.run(&["seal", "--key", "not base64!", "--value", "x"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not valid base64");

    let output = t.run(&["seal", "--key", "AAAA", "--value", "x"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "32 bytes");
}
