//! End-to-end runs of the `locsync` binary that need no network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command in an empty working directory with only `vars` set.
fn locsync(dir: &TempDir, vars: &[(&str, String)]) -> Command {
    let mut cmd = Command::cargo_bin("locsync").expect("locsync binary");
    cmd.current_dir(dir.path()).env_clear();
    for (key, value) in vars {
        cmd.env(key, value);
    }
    cmd
}

/// Settings pointing at a closed local port so any fetch fails fast.
fn offline_env(dir: &TempDir) -> Vec<(&'static str, String)> {
    vec![
        ("GOOGLE_SHEETS_URL", "http://127.0.0.1:9/export?format=csv&".to_string()),
        ("GOOGLE_SHEET_STATIC_GID", "0".to_string()),
        ("GOOGLE_SHEET_GAME_GID", "1".to_string()),
        ("GRIDLY_API_KEY", "test-key".to_string()),
        ("GRIDLY_API_URL", "http://127.0.0.1:9/v1".to_string()),
        ("GRIDLY_STATIC_TEXTS_VIEW_ID", "view-static".to_string()),
        ("GRIDLY_GAME_TEXT_VIEW_ID", "view-game".to_string()),
        ("LOCSYNC_DATABASE", dir.path().join("loc.db").display().to_string()),
        ("LOCSYNC_MARKER", dir.path().join("module_run.flag").display().to_string()),
        ("LOCSYNC_HTTP_TIMEOUT_SECS", "2".to_string()),
        ("LOCSYNC_REMOTE_RETRIES", "0".to_string()),
    ]
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    locsync(&dir, &[])
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("sync")
                .and(predicate::str::contains("diff"))
                .and(predicate::str::contains("status"))
                .and(predicate::str::contains("init")),
        );
}

#[test]
fn missing_settings_are_reported_by_name() {
    let dir = TempDir::new().unwrap();
    locsync(&dir, &[])
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GOOGLE_SHEETS_URL"));
}

#[test]
fn init_with_existing_marker_is_a_noop() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("module_run.flag"), "{}").unwrap();

    locsync(&dir, &offline_env(&dir))
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn unreachable_spreadsheet_is_fatal_and_leaves_no_marker() {
    let dir = TempDir::new().unwrap();

    locsync(&dir, &offline_env(&dir))
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to fetch"));

    assert!(!dir.path().join("module_run.flag").exists());
}

#[test]
fn sync_aborts_when_the_spreadsheet_is_unreachable() {
    let dir = TempDir::new().unwrap();

    locsync(&dir, &offline_env(&dir))
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("sync failed"));
}

#[test]
fn unknown_table_argument_is_rejected() {
    let dir = TempDir::new().unwrap();
    locsync(&dir, &offline_env(&dir))
        .args(["diff", "--table", "menus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown table"));
}
