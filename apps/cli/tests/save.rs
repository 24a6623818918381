use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn save_appends_txt_to_bare_names() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.txt");
    fs::write(&input, "abc")?;
    let output = dir.path().join("out");

    Command::cargo_bin("textpad-cli")?
        .args([
            "save",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--format",
            "text",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("out.txt"));

    assert_eq!(fs::read_to_string(dir.path().join("out.txt"))?, "abc");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn save_as_pdf_writes_pdf_bytes() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.txt");
    fs::write(&input, "first line\nsecond line")?;
    let output = dir.path().join("report");

    Command::cargo_bin("textpad-cli")?
        .args([
            "save",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--format",
            "pdf",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.pdf"));

    let bytes = fs::read(dir.path().join("report.pdf"))?;
    assert!(bytes.starts_with(b"%PDF-"));
    Ok(())
}

#[test]
fn save_infers_pdf_from_output_name() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.txt");
    fs::write(&input, "hello")?;
    let output = dir.path().join("hello.pdf");

    Command::cargo_bin("textpad-cli")?
        .args(["save", input.to_str().unwrap(), output.to_str().unwrap()])
        .assert()
        .success();

    assert!(fs::read(&output)?.starts_with(b"%PDF-"));
    Ok(())
}

#[test]
fn save_rejects_malformed_config() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.txt");
    fs::write(&input, "hello")?;
    let config = dir.path().join("textpad.json");
    fs::write(&config, "{ not json")?;

    Command::cargo_bin("textpad-cli")?
        .args([
            "--config",
            config.to_str().unwrap(),
            "save",
            input.to_str().unwrap(),
            dir.path().join("out").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("textpad.json"));

    assert!(!dir.path().join("out.txt").exists());
    Ok(())
}
