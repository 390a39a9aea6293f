//! Tests for `gh-secrets validate` and `completions`.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_validate_accepts_good_declarations() {
    let t = Test::with_declarations(SINGLE_DECLARATION);
    let output = t.validate();
    assert_success(&output);
    assert_stdout_contains(&output, "1 declaration(s) valid");
}

#[test]
fn test_validate_reports_every_problem() {
    let t = Test::with_declarations(INVALID_DECLARATIONS);
    let output = t.validate();
    assert_failure(&output);

    let err = stderr(&output);
    assert!(err.contains("bad repo name format: acme"), "{}", err);
    assert!(err.contains("1github-token"), "{}", err);
    assert!(err.contains("GITHUB_SHA"), "{}", err);
    assert!(err.contains("3 resource(s) failed"), "{}", err);
}

#[test]
fn test_validate_rejects_id_delimiter_in_repo() {
    let t = Test::with_declarations(
        "[[secret]]\nrepo = \"a:b/c\"\nname = \"API_KEY\"\nvalue = \"a\"\n",
    );
    let output = t.validate();
    assert_failure(&output);
    assert_stderr_contains(&output, "a:b/c/API_KEY: repo name cannot contain `:`");
    assert_stderr_contains(&output, "1 resource(s) failed");
}

#[test]
fn test_validate_missing_file_hints() {
    let t = Test::new();
    let output = t.validate();
    assert_failure(&output);
    assert_stderr_contains(&output, "declarations file not found");
    assert_stderr_contains(&output, "--file");
}

#[test]
fn test_validate_custom_file() {
    let t = Test::new();
    std::fs::write(t.dir.path().join("prod.toml"), SINGLE_DECLARATION).unwrap();
    let output = t.run(&["validate", "--file", "prod.toml"]);
    assert_success(&output);
}

#[test]
fn test_validate_value_env_resolution() {
    let t = Test::with_declarations(
        "[[secret]]\nrepo = \"acme/widgets\"\nname = \"API_KEY\"\nvalue_env = \"GH_SECRETS_TEST_VALUE\"\n",
    );

    let output = t.validate();
    assert_failure(&output);
    assert_stderr_contains(&output, "GH_SECRETS_TEST_VALUE is not set");

    let output = t
        .cmd()
        .arg("validate")
        .env("GH_SECRETS_TEST_VALUE", "from-env")
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_completions() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef gh-secrets"));
}

#[test]
fn test_help_lists_commands() {
    let t = Test::new();
    t.cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("plan")
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("destroy"))
            .and(predicate::str::contains("seal")),
    );
}
