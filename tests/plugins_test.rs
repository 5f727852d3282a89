use std::io::Write;

use jenkins_smoke::plugins::{load_manifest, parse_manifest};

#[tokio::test]
async fn loads_manifest_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "credentials:2.3.0").unwrap();
    writeln!(file, "workflow-job:2.40").unwrap();
    writeln!(file, "openshift-sync:1.0.45").unwrap();

    let plugins = load_manifest(file.path()).await.unwrap();
    assert_eq!(plugins.len(), 3);
    assert_eq!(
        plugins.get("openshift-sync").map(String::as_str),
        Some("1.0.45")
    );
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_manifest(&dir.path().join("no-such-file.txt"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no-such-file.txt"));
}

#[test]
fn duplicate_names_keep_the_last_version() {
    let text = "credentials:1.0\nworkflow-job:2.40\ncredentials:2.3.0\n";
    let plugins = parse_manifest(text).unwrap();
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins.get("credentials").map(String::as_str), Some("2.3.0"));
}

#[test]
fn malformed_line_names_its_position() {
    let text = "credentials:1.0\nbroken-line\n";
    let err = parse_manifest(text).unwrap_err();
    assert!(err.to_string().contains("line 2"));
}
