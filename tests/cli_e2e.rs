//! End-to-end CLI tests for the article-packager binary.
//!
//! Records carry no asset URLs, so no test here touches the network.

use std::fs;
use std::io::Read;
use std::path::Path;

use assert_cmd::Command;
use flate2::read::GzDecoder;
use predicates::prelude::*;
use tempfile::TempDir;

const RECORDS: &str = r#"[
    { "url": "https://news.example.com/a", "title": "First", "author": "Ann", "text": "Alpha body" },
    { "url": "https://news.example.com/b", "error": "HTTP 404" },
    { "url": "https://news.example.com/c", "title": "Third", "text": "Gamma body" }
]"#;

/// Command isolated from any user config file.
fn packager_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("article-packager").unwrap();
    cmd.env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

fn archive_paths(archive: &Path) -> Vec<String> {
    let bytes = fs::read(archive).expect("archive should exist");
    let mut reader = tar::Archive::new(GzDecoder::new(bytes.as_slice()));
    reader
        .entries()
        .expect("archive should list entries")
        .map(|entry| {
            entry
                .expect("entry should decode")
                .path()
                .expect("path should decode")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

fn gunzip_file(archive: &Path) -> Vec<u8> {
    let bytes = fs::read(archive).expect("archive should exist");
    let mut raw = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut raw)
        .expect("archive should decompress");
    raw
}

#[test]
fn test_binary_help_displays_usage() {
    let dir = TempDir::new().unwrap();
    packager_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bundle extracted web articles"));
}

#[test]
fn test_binary_version_displays_version() {
    let dir = TempDir::new().unwrap();
    packager_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("article-packager"));
}

#[test]
fn test_binary_requires_input() {
    let dir = TempDir::new().unwrap();
    packager_cmd(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let dir = TempDir::new().unwrap();
    packager_cmd(dir.path())
        .args(["-i", "records.json", "--invalid-flag"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_packages_records_and_prints_manifest() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    let output = dir.path().join("out.tar.gz");
    fs::write(&input, RECORDS).unwrap();

    packager_cmd(dir.path())
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--mtime", "0", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 3"))
        .stdout(predicate::str::contains("\"success\": 2"))
        .stdout(predicate::str::contains("\"failed\": 1"));

    let paths = archive_paths(&output);
    assert!(paths.contains(&"001_First/index.md".to_string()));
    assert!(paths.contains(&"002_news.example.com/error.md".to_string()));
    assert!(paths.contains(&"003_Third/index.md".to_string()));
    assert_eq!(paths.last().map(String::as_str), Some("manifest.json"));
}

#[test]
fn test_binary_positional_urls_select_records() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    let output = dir.path().join("out.tar.gz");
    fs::write(&input, RECORDS).unwrap();

    packager_cmd(dir.path())
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["-q", "https://news.example.com/c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 1"));

    let paths = archive_paths(&output);
    assert!(paths.contains(&"001_Third/index.md".to_string()));
    assert!(!paths.iter().any(|p| p.starts_with("002_")));
}

#[test]
fn test_binary_reads_records_from_stdin() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("stdin.tar.gz");

    packager_cmd(dir.path())
        .args(["-i", "-", "-q"])
        .arg("-o")
        .arg(&output)
        .write_stdin(RECORDS)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": 2"));

    assert!(output.exists());
}

#[test]
fn test_binary_fixed_mtime_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    fs::write(&input, RECORDS).unwrap();

    let mut streams = Vec::new();
    for name in ["one.tar.gz", "two.tar.gz"] {
        let output = dir.path().join(name);
        packager_cmd(dir.path())
            .arg("-i")
            .arg(&input)
            .arg("-o")
            .arg(&output)
            .args(["--mtime", "1700000000", "-q"])
            .assert()
            .success();
        streams.push(gunzip_file(&output));
    }

    assert_eq!(streams[0], streams[1]);
}

#[test]
fn test_binary_rejects_malformed_records() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    fs::write(&input, "{ not json").unwrap();

    packager_cmd(dir.path())
        .arg("-i")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse extraction records"));
}

#[test]
fn test_binary_rejects_invalid_url_without_writing_archive() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    let output = dir.path().join("out.tar.gz");
    fs::write(&input, RECORDS).unwrap();

    packager_cmd(dir.path())
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["-q", "ftp://files.example.com/x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ftp"));

    assert!(!output.exists());
}

#[test]
fn test_binary_reports_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    let config = dir.path().join("custom.toml");
    fs::write(&input, RECORDS).unwrap();
    fs::write(&config, "rate_limit = 5\n").unwrap();

    packager_cmd(dir.path())
        .arg("-i")
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_binary_reads_default_config_location() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    let output = dir.path().join("out.tar.gz");
    fs::write(&input, RECORDS).unwrap();
    let config_dir = dir.path().join("article-packager");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "job_concurrency = 99\n").unwrap();

    packager_cmd(dir.path())
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("job_concurrency"));
}
