//! Integration tests for the grab-dl binary
//!
//! These run the built CLI against a local mock server, so they need no
//! network access. Each test works in its own temporary directory.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runs grab-dl with `args` inside `dir`, with an empty stdin
async fn run_grab_dl(dir: &Path, args: Vec<String>) -> Output {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_grab-dl"))
            .args(&args)
            .current_dir(&dir)
            .env_remove("RUST_LOG")
            .stdin(Stdio::null())
            .output()
            .expect("Failed to run grab-dl")
    })
    .await
    .expect("grab-dl task panicked")
}

async fn mount_file(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_downloads_all_arguments() {
    let server = MockServer::start().await;
    mount_file(&server, "/one.txt", b"first file").await;
    mount_file(&server, "/two.bin", &[0u8; 4096]).await;

    let dir = tempdir().unwrap();
    let output = run_grab_dl(
        dir.path(),
        vec![
            format!("{}/one.txt", server.uri()),
            format!("{}/two.bin", server.uri()),
        ],
    )
    .await;

    let stderr = String::from_utf8_lossy(&output.stderr);
    println!("Stderr: {stderr}");

    assert!(output.status.success(), "Expected success, stderr: {stderr}");
    assert!(stderr.contains("2/2 successful"));
    assert_eq!(std::fs::read(dir.path().join("one.txt")).unwrap(), b"first file");
    assert_eq!(std::fs::metadata(dir.path().join("two.bin")).unwrap().len(), 4096);
}

#[tokio::test]
async fn test_failure_is_isolated_and_counted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked.pdf"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_file(&server, "/ok.pdf", b"%PDF").await;

    let dir = tempdir().unwrap();
    let output = run_grab_dl(
        dir.path(),
        vec![
            format!("{}/blocked.pdf", server.uri()),
            format!("{}/ok.pdf", server.uri()),
        ],
    )
    .await;

    let stderr = String::from_utf8_lossy(&output.stderr);
    println!("Stderr: {stderr}");

    assert!(!output.status.success(), "A failed URL should give a non-zero exit");
    assert!(stderr.contains("access blocked"));
    assert!(stderr.contains("1/2 successful"));
    assert!(!dir.path().join("blocked.pdf").exists());
    assert!(dir.path().join("ok.pdf").exists());
}

#[tokio::test]
async fn test_reads_list_file_and_avoids_collisions() {
    let server = MockServer::start().await;
    mount_file(&server, "/report.pdf", b"new report").await;

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("report.pdf"), b"old report").unwrap();
    std::fs::write(
        dir.path().join("downloads.txt"),
        format!(
            "# weekly reports\n\n{uri}/report.pdf\n{uri}/report.pdf\n",
            uri = server.uri()
        ),
    )
    .unwrap();

    let output = run_grab_dl(dir.path(), vec![]).await;
    let stderr = String::from_utf8_lossy(&output.stderr);
    println!("Stderr: {stderr}");

    assert!(output.status.success(), "Expected success, stderr: {stderr}");
    assert!(stderr.contains("2/2 successful"));
    assert_eq!(std::fs::read(dir.path().join("report.pdf")).unwrap(), b"old report");
    assert_eq!(std::fs::read(dir.path().join("report (1).pdf")).unwrap(), b"new report");
    assert_eq!(std::fs::read(dir.path().join("report (2).pdf")).unwrap(), b"new report");
}

#[tokio::test]
async fn test_output_dir_is_created() {
    let server = MockServer::start().await;
    mount_file(&server, "/data.csv", b"a,b\n1,2\n").await;

    let dir = tempdir().unwrap();
    let output = run_grab_dl(
        dir.path(),
        vec![
            "--output-dir".to_string(),
            "nested/out".to_string(),
            format!("{}/data.csv", server.uri()),
        ],
    )
    .await;

    assert!(output.status.success());
    assert!(dir.path().join("nested/out/data.csv").exists());
}

#[tokio::test]
async fn test_dry_run_downloads_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let output = run_grab_dl(
        dir.path(),
        vec!["--dry-run".to_string(), format!("{}/file.iso", server.uri())],
    )
    .await;

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stderr.contains("[DRY RUN]"));
    assert!(stderr.contains("file.iso"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_no_urls_exits_with_error() {
    let dir = tempdir().unwrap();
    let output = run_grab_dl(dir.path(), vec![]).await;

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("No URLs to download"));
}
