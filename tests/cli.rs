use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn buckets(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("buckets").unwrap();
    cmd.arg("--dir").arg(dir).env_remove("RUST_LOG");
    cmd
}

fn write_buckets(dir: &Path, savings: f64, needs: f64, wants: f64) {
    let file = json!([
        { "name": "Savings", "amount": savings },
        { "name": "Needs", "amount": needs, "patterns": ["kroger", "rent"] },
        { "name": "Wants", "amount": wants, "patterns": ["netflix"] },
        {
            "name": "Paycheck",
            "amount": 0.0,
            "patterns": ["payroll"],
            "split": { "Savings": 0.1, "Needs": 0.6, "Wants": 0.3 }
        },
        { "name": "Total", "amount": savings + needs + wants }
    ]);
    fs::write(
        dir.join("buckets.json"),
        serde_json::to_string_pretty(&file).unwrap(),
    )
    .unwrap();
}

fn balance(dir: &Path, name: &str) -> f64 {
    let contents = fs::read_to_string(dir.join("buckets.json")).unwrap();
    let records: Vec<Value> = serde_json::from_str(&contents).unwrap();
    records
        .iter()
        .find(|r| r["name"] == name)
        .and_then(|r| r["amount"].as_f64())
        .unwrap()
}

fn drop_export(dir: &Path, name: &str, contents: &str) {
    let input = dir.join("input");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join(name), contents).unwrap();
}

#[test]
fn init_then_status() {
    let temp = TempDir::new().unwrap();

    buckets(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));
    assert!(temp.path().join("buckets.json").exists());

    buckets(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Savings"))
        .stdout(predicate::str::contains("Total"));

    buckets(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn withdraw_updates_bucket_and_log() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);

    buckets(temp.path())
        .args(["withdraw", "needs", "50", "groceries"])
        .assert()
        .success();

    assert_eq!(balance(temp.path(), "Needs"), 50.0);
    assert_eq!(balance(temp.path(), "Savings"), 100.0);
    assert_eq!(balance(temp.path(), "Total"), 250.0);

    let log = fs::read_to_string(temp.path().join("history/withdraw_log.csv")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "timestamp,bucket,amount,reason");
    assert!(lines[1].ends_with(",Needs,50.00,groceries"));
}

#[test]
fn transfer_moves_money_between_buckets() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);

    buckets(temp.path())
        .args(["transfer", "Wants", "Savings", "25.50"])
        .assert()
        .success();

    assert_eq!(balance(temp.path(), "Wants"), 74.5);
    assert_eq!(balance(temp.path(), "Savings"), 125.5);
    assert_eq!(balance(temp.path(), "Total"), 300.0);
}

#[test]
fn insufficient_funds_fails_without_changes() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);

    buckets(temp.path())
        .args(["withdraw", "Wants", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Insufficient funds"));

    assert_eq!(balance(temp.path(), "Wants"), 100.0);
    assert!(!temp.path().join("history/withdraw_log.csv").exists());
}

#[test]
fn transfer_rejects_total() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);

    buckets(temp.path())
        .args(["transfer", "Total", "Savings", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bucket"));
}

#[test]
fn paycheck_is_split_across_buckets() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 0.0, 0.0, 0.0);
    drop_export(
        temp.path(),
        "checking.csv",
        "Date,Description,Debit,Credit\n01/15/2025,ACME PAYROLL,,1000.00\n",
    );

    buckets(temp.path()).arg("ingest").assert().success();

    assert_eq!(balance(temp.path(), "Savings"), 100.0);
    assert_eq!(balance(temp.path(), "Needs"), 600.0);
    assert_eq!(balance(temp.path(), "Wants"), 300.0);
    assert_eq!(balance(temp.path(), "Total"), 1000.0);
    assert!(!temp.path().join("input/checking.csv").exists());
}

#[test]
fn ingest_twice_is_idempotent() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);
    drop_export(
        temp.path(),
        "checking.csv",
        "Date,Description,Debit,Credit\n\
         01/02/2025,KROGER #12,40.00,\n\
         01/04/2025,NETFLIX,15.99,\n\
         01/05/2025,COFFEE,4.50,\n",
    );

    buckets(temp.path())
        .args(["ingest", "--keep-inputs"])
        .assert()
        .success();
    let needs = balance(temp.path(), "Needs");
    let wants = balance(temp.path(), "Wants");
    assert_eq!(needs, 60.0);
    assert_eq!(wants, 79.51);

    buckets(temp.path())
        .args(["ingest", "--keep-inputs"])
        .assert()
        .success();
    assert_eq!(balance(temp.path(), "Needs"), needs);
    assert_eq!(balance(temp.path(), "Wants"), wants);

    let history = fs::read_to_string(temp.path().join("history/history.csv")).unwrap();
    assert_eq!(history.lines().count(), 4);
}

#[test]
fn dry_run_leaves_files_untouched() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);
    drop_export(
        temp.path(),
        "checking.csv",
        "Date,Description,Debit,Credit\n01/02/2025,KROGER,40.00,\n",
    );

    buckets(temp.path())
        .args(["ingest", "--dry-run"])
        .assert()
        .success();

    assert_eq!(balance(temp.path(), "Needs"), 100.0);
    assert!(temp.path().join("input/checking.csv").exists());
    assert!(!temp.path().join("history/history.csv").exists());
}

#[test]
fn three_inputs_are_rejected() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);
    for name in ["a.csv", "b.csv", "c.csv"] {
        drop_export(
            temp.path(),
            name,
            "Date,Description,Debit,Credit\n01/02/2025,KROGER,40.00,\n",
        );
    }

    buckets(temp.path())
        .arg("ingest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected 1 or 2 input files, found 3"));
    assert_eq!(balance(temp.path(), "Needs"), 100.0);
}

#[test]
fn row_without_amount_is_malformed() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);
    drop_export(
        temp.path(),
        "checking.csv",
        "Date,Description,Debit,Credit\n01/02/2025,KROGER,40.00,\n01/03/2025,MYSTERY,,\n",
    );

    buckets(temp.path())
        .arg("ingest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed row"));

    assert_eq!(balance(temp.path(), "Needs"), 100.0);
    assert!(temp.path().join("input/checking.csv").exists());
}

#[test]
fn backup_create_and_list() {
    let temp = TempDir::new().unwrap();
    write_buckets(temp.path(), 100.0, 100.0, 100.0);

    buckets(temp.path())
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created: backup-"));

    buckets(temp.path())
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 backup(s)"));

    buckets(temp.path())
        .args(["-v", "backup", "list", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Size:"));
}
