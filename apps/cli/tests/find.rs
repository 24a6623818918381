use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn find_reports_first_match_span() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("greeting.txt");
    fs::write(&file, "hello world")?;

    Command::cargo_bin("textpad-cli")?
        .args(["find", file.to_str().unwrap(), "world"])
        .assert()
        .success()
        .stdout("Match at byte 6 (len 5), line 1, column 7\n");

    Ok(())
}

#[test]
fn find_reports_line_of_later_match() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("lines.txt");
    fs::write(&file, "alpha\nbeta needle\nneedle")?;

    Command::cargo_bin("textpad-cli")?
        .args(["find", file.to_str().unwrap(), "needle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("line 2, column 6"));

    Ok(())
}

#[test]
fn find_without_match_still_succeeds() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("greeting.txt");
    fs::write(&file, "hello world")?;

    Command::cargo_bin("textpad-cli")?
        .args(["find", file.to_str().unwrap(), "World"])
        .assert()
        .success()
        .stdout("No match\n");

    Ok(())
}

#[test]
fn find_rejects_empty_query() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("greeting.txt");
    fs::write(&file, "hello world")?;

    Command::cargo_bin("textpad-cli")?
        .args(["find", file.to_str().unwrap(), ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));

    Ok(())
}
