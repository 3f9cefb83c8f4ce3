//! Copy command integration tests.

mod support;

use support::*;

#[test]
fn test_copy_creates_at_destination() {
    let t = Test::with_secrets(&[("API_KEY", "super-secret-value")]);

    let output = t.copy("API_KEY", "dev", "staging", &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "API_KEY");
    assert_stdout_contains(&output, "created");

    let fetched = t.get_reveal("API_KEY", "staging");
    assert_success(&fetched);
    assert_stdout_contains(&fetched, "super-secret-value");
}

#[test]
fn test_copy_across_vaults() {
    let t = Test::with_secrets(&[("DB_URL", "postgres://dev")]);

    let output = t.copy("DB_URL", "local:dev", "remote:dev", &[]);
    assert_success(&output);

    let fetched = t.get_reveal("DB_URL", "remote:dev");
    assert_success(&fetched);
    assert_stdout_contains(&fetched, "postgres://dev");
}

#[test]
fn test_copy_conflict_leaves_destination_unchanged() {
    let t = Test::with_secrets(&[("K", "new-value")]);
    assert_success(&t.set("K", "old-value", "staging"));

    let output = t.copy("K", "dev", "staging", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");

    let fetched = t.get_reveal("K", "staging");
    assert_stdout_contains(&fetched, "old-value");
}

#[test]
fn test_copy_overwrite_twice_increments_version() {
    let t = Test::with_secrets(&[("K", "value")]);

    let first = t.copy("K", "dev", "staging", &["--overwrite"]);
    assert_success(&first);
    assert_stdout_contains(&first, "v1");

    let second = t.copy("K", "dev", "staging", &["--overwrite"]);
    assert_success(&second);
    assert_stdout_contains(&second, "updated");
    assert_stdout_contains(&second, "v2");

    let fetched = t.get_reveal("K", "staging");
    assert_stdout_contains(&fetched, "value");
}

#[test]
fn test_copy_missing_source_key() {
    let t = Test::init();
    let output = t.copy("GHOST", "dev", "staging", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
    assert_stderr_contains(&output, "GHOST");
}

#[test]
fn test_copy_same_context_rejected() {
    let t = Test::with_secrets(&[("K", "v")]);
    let output = t.copy("K", "dev", "local:dev", &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "same context");
}

#[test]
fn test_copy_dry_run_masks_and_writes_nothing() {
    let t = Test::with_secrets(&[("API_KEY", "secret-api-key")]);

    let output = t.copy("API_KEY", "dev", "staging", &["--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "secr**********");
    assert_stdout_excludes(&output, "secret-api-key");

    let fetched = t.get("API_KEY", "staging");
    assert_failure(&fetched);
}

#[test]
fn test_copy_dry_run_reveal_shows_value() {
    let t = Test::with_secrets(&[("API_KEY", "secret-api-key")]);
    let output = t.copy("API_KEY", "dev", "staging", &["--dry-run", "--reveal"]);
    assert_success(&output);
    assert_stdout_contains(&output, "secret-api-key");
}

#[test]
fn test_bulk_copy_partial_failure_exits_nonzero() {
    let t = Test::with_secrets(&[("DB_URL", "url"), ("DB_PASSWORD", "pw")]);
    assert_success(&t.set("DB_PASSWORD", "existing", "staging"));

    let output = t.copy_bulk("dev", "staging", &["--only", "DB_*"]);
    assert_failure(&output);
    assert_stdout_contains(&output, "DB_URL");
    assert_stderr_contains(&output, "DB_PASSWORD");
    assert_stdout_contains(&output, "1 succeeded, 1 failed");

    // the successful key was committed despite the failure
    let fetched = t.get_reveal("DB_URL", "staging");
    assert_success(&fetched);
    assert_stdout_contains(&fetched, "url");

    // the conflicting key kept its old value
    let kept = t.get_reveal("DB_PASSWORD", "staging");
    assert_stdout_contains(&kept, "existing");
}

#[test]
fn test_bulk_copy_no_matches_is_success() {
    let t = Test::with_secrets(&[("API_KEY", "abc")]);
    let output = t.copy_bulk("dev", "staging", &["--only", "SMTP_*"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no keys matched");
}

#[test]
fn test_bulk_copy_except_pattern() {
    let t = Test::with_secrets(&[("A_ONE", "1"), ("A_TWO", "2")]);
    let output = t.copy_bulk("dev", "staging", &["--only", "A_*", "--except", "A_TWO"]);
    assert_success(&output);

    assert_success(&t.get("A_ONE", "staging"));
    assert_failure(&t.get("A_TWO", "staging"));
}

#[test]
fn test_key_and_pattern_are_mutually_exclusive() {
    let t = Test::with_secrets(&[("K", "v")]);
    let output = t.copy("K", "dev", "staging", &["--only", "K*"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "mutually exclusive");
}

#[test]
fn test_bulk_copy_json_itemizes_failures() {
    let t = Test::with_secrets(&[("DB_URL", "url"), ("DB_PASSWORD", "pw")]);
    assert_success(&t.set("DB_PASSWORD", "existing", "staging"));

    let output = t.copy_bulk("dev", "staging", &["--only", "DB_*", "--json"]);
    assert_failure(&output);

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let entries = parsed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], "DB_PASSWORD");
    assert_eq!(entries[0]["status"], "failed");
    assert_eq!(entries[0]["error_kind"], "conflict");
    assert_eq!(entries[1]["key"], "DB_URL");
    assert_eq!(entries[1]["status"], "done");
    assert_eq!(parsed["failed"], 1);
}

#[test]
fn test_copy_preserves_secure_flag() {
    let t = Test::init();
    assert_success(&t.set_secure("TOKEN", "secret", "dev"));

    assert_success(&t.copy("TOKEN", "dev", "staging", &[]));

    let listed = t.list("staging");
    assert_success(&listed);
    assert_stdout_contains(&listed, "TOKEN");
    assert_stdout_contains(&listed, "(secure)");
}
