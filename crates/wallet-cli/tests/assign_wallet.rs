//! End-to-end tests: the `assign-wallet` binary against a scratch data dir.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_assign-wallet");

fn assign_wallet(data_dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("WALLET_DATA_DIR")
        .env_remove("WALLET_POOL_FILE")
        .env_remove("WALLET_USERS_FILE")
        .env_remove("WALLET_LOCK_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    cmd
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    assign_wallet(data_dir, args).output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn seed_pool(dir: &Path, count: usize) {
    let lines: Vec<String> = (0..count).map(|i| format!("addr{i}|seed words {i}")).collect();
    fs::write(dir.join("wallet_pool.txt"), lines.join("\n") + "\n").unwrap();
}

#[test]
fn test_assign_prints_address() {
    let dir = tempfile::tempdir().unwrap();
    seed_pool(dir.path(), 2);

    let first = run(dir.path(), &["assign", "100"]);
    assert_eq!(first.status.code(), Some(0), "{}", stderr(&first));
    assert_eq!(stdout(&first), "addr0");

    let again = run(dir.path(), &["assign", "100"]);
    assert_eq!(stdout(&again), "addr0");

    let users = fs::read_to_string(dir.path().join("users.txt")).unwrap();
    assert_eq!(users, "100|addr0|seed words 0\n");
}

#[test]
fn test_missing_user_id_exits_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["assign"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!stderr(&output).is_empty());
}

#[test]
fn test_blank_user_id_exits_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    seed_pool(dir.path(), 1);

    for blank in ["", "  "] {
        let output = run(dir.path(), &["assign", blank]);
        assert_eq!(output.status.code(), Some(1), "{}", stderr(&output));
        assert!(output.stdout.is_empty());
    }
    assert!(!dir.path().join("users.txt").exists());
}

#[test]
fn test_padded_user_id_is_trimmed() {
    let dir = tempfile::tempdir().unwrap();
    seed_pool(dir.path(), 2);

    let output = run(dir.path(), &["assign", " 100 "]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(stdout(&output), "addr0");
    assert_eq!(stdout(&run(dir.path(), &["assign", "100"])), "addr0");

    let users = fs::read_to_string(dir.path().join("users.txt")).unwrap();
    assert_eq!(users, "100|addr0|seed words 0\n");
}

#[test]
fn test_exhausted_pool_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(dir.path(), &["assign", "300"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("ERROR: wallet pool is exhausted"));
}

#[test]
fn test_errors_hide_paths_and_seeds() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("wallet_pool.txt"), "only-secret-words\n").unwrap();

    let output = run(dir.path(), &["assign", "1"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(2));
    assert!(err.contains("malformed pool store record #1"));
    assert!(!err.contains("only-secret-words"));
    assert!(!err.contains(&dir.path().display().to_string()));
}

#[test]
fn test_concurrent_processes_get_distinct_wallets() {
    let dir = tempfile::tempdir().unwrap();
    seed_pool(dir.path(), 12);

    let children: Vec<_> = (0..12)
        .map(|i| {
            assign_wallet(dir.path(), &["assign", &format!("user{i}")])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .unwrap()
        })
        .collect();

    let mut addresses = HashSet::new();
    for child in children {
        let output = child.wait_with_output().unwrap();
        assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
        assert!(addresses.insert(stdout(&output)));
    }

    assert_eq!(addresses.len(), 12);
    let pool = fs::read_to_string(dir.path().join("wallet_pool.txt")).unwrap();
    assert!(pool.trim().is_empty());
    let users = fs::read_to_string(dir.path().join("users.txt")).unwrap();
    assert_eq!(users.lines().count(), 12);
}

#[test]
fn test_replenish_from_stdin_then_stats() {
    let dir = tempfile::tempdir().unwrap();

    let mut child = assign_wallet(dir.path(), &["replenish"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"addrA|seed A\naddrB|seed B\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let added: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(added["added"], 2);

    assert_eq!(stdout(&run(dir.path(), &["assign", "7"])), "addrA");

    let stats: serde_json::Value =
        serde_json::from_slice(&run(dir.path(), &["stats"]).stdout).unwrap();
    assert_eq!(stats["free"], 1);
    assert_eq!(stats["assigned"], 1);

    let wallets = run(dir.path(), &["wallets", "--query", "ADDRA"]);
    let listed: serde_json::Value = serde_json::from_slice(&wallets.stdout).unwrap();
    assert_eq!(listed[0]["address"], "addrA");
    assert_eq!(listed[0]["assigned_user_id"], "7");
    assert!(!stdout(&wallets).contains("seed"));
}

#[test]
fn test_replenish_duplicate_rejected() {
    let dir = tempfile::tempdir().unwrap();
    seed_pool(dir.path(), 1);
    let batch = dir.path().join("batch.txt");
    fs::write(&batch, "addr0|other seed\n").unwrap();

    let output = run(dir.path(), &["replenish", batch.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("already present"));
}
