//! CLI integration tests
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("news-extract")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Serves one canned HTTP response on a local port and returns its URL.
fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "{}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}/story", addr)
}

#[test]
fn test_cli_file_input() {
    let output = cmd().arg(get_fixture_path("article.html")).output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["title"], "City council approves new transit plan");
    assert_eq!(json["meta"]["site"], "Example Daily");
    assert_eq!(json["meta"]["lang"], "en");
    assert!(json["meta"]["source"].as_str().unwrap().starts_with("file://"));
}

#[test]
fn test_cli_stdin_input_with_source_url() {
    let html = std::fs::read_to_string(get_fixture_path("article.html")).unwrap();
    let output = cmd()
        .args(["-", "--url", "https://www.example.com/city/transit-plan"])
        .write_stdin(html)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["meta"]["source"], "https://www.example.com/city/transit-plan");
}

#[test]
fn test_cli_text_format() {
    cmd()
        .args(["-f", "text", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("City council approves new transit plan\n"))
        .stdout(predicate::str::contains("This article discusses All rights reserved copyrights in general."))
        .stdout(predicate::str::contains("Copyright 2024 Example Corp").not());
}

#[test]
fn test_cli_trim_newlines() {
    let output = cmd()
        .args(["-f", "text", "--trim-newlines", &get_fixture_path("article.html")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(!text.contains("  "));
}

#[test]
fn test_cli_korean_fixture() {
    cmd()
        .args(["-f", "json", &get_fixture_path("korean_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lang\": \"ko\""))
        .stdout(predicate::str::contains("hong@example.com").not());
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("output.json");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("article.html"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Output written to"));

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert!(written["text"].as_str().is_some_and(|t| !t.is_empty()));
}

#[test]
fn test_cli_remote_url() {
    let html = std::fs::read_to_string(get_fixture_path("article.html")).unwrap();
    let url = serve_once("HTTP/1.1 200 OK", html);

    let output = cmd().arg(&url).output().unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["meta"]["source"], url.as_str());
}

#[test]
fn test_cli_url_flag_without_input() {
    let html = std::fs::read_to_string(get_fixture_path("thin_article.html")).unwrap();
    let url = serve_once("HTTP/1.1 200 OK", html);

    cmd()
        .args(["--url", &url, "-f", "text"])
        .assert()
        .success()
        .stdout("The office is closed on Monday for the holiday.\n");
}

#[test]
fn test_cli_upstream_error_status() {
    let url = serve_once("HTTP/1.1 404 Not Found", "missing".to_string());

    cmd()
        .arg(&url)
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));
}

#[test]
fn test_cli_invalid_file() {
    cmd()
        .arg("nonexistent.html")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_cli_no_content() {
    cmd()
        .arg(get_fixture_path("navigation_only.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No content extracted"));
}

#[test]
fn test_cli_requires_input() {
    cmd().assert().failure();
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "markdown", &get_fixture_path("article.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("news-extract"))
        .stderr(predicate::str::contains("Extraction Details"));
}
