use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile::NamedTempFile;

mod common;

#[test]
fn test_malformed_csv_handling() {
    let file = NamedTempFile::new().unwrap();
    common::write_commands(
        file.path(),
        &[
            "register, , , , , alice",
            // Unknown op
            "refund, 1, , , 10,",
            // Non-numeric amount
            "deposit, 1, , , lots,",
            // Missing amount
            "deposit, 1, , , ,",
            "deposit, 1, , , 30,",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("marketledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("error reading command"))
        .stderr(predicate::str::contains("command rejected"))
        .stdout(predicate::str::contains("1,alice,30"));
}

#[test]
fn test_non_positive_top_up_rejected() {
    let file = NamedTempFile::new().unwrap();
    common::write_commands(
        file.path(),
        &[
            "register, , , , , alice",
            "deposit, 1, , , 0,",
            "deposit, 1, , , -20,",
            "deposit, 1, , , 5,",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("marketledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("amount must be positive"))
        .stdout(predicate::str::contains("1,alice,5"));
}

#[test]
fn test_unknown_references_leave_state_untouched() {
    let file = NamedTempFile::new().unwrap();
    common::write_commands(
        file.path(),
        &[
            "register, , , , , alice",
            "deposit, 1, , , 80,",
            "purchase, 1, 99, , ,",
            "sell, 1, 99, , ,",
            "list, 1, , 5, 10, Chair",
        ],
    )
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("marketledger"));
    cmd.arg(file.path()).arg("--report").arg("items");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("item 99 not found"))
        .stderr(predicate::str::contains("category 5 not found"))
        .stdout(predicate::str::diff(
            "item,name,owner,category,price,status\n",
        ));
}
