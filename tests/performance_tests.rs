use assert_cmd::cargo_bin;
use std::process::Command;

mod common;

#[test]
fn test_large_import() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("large_test.csv");
    common::generate_csv(&output_path, 50_000).expect("Failed to generate large CSV");

    let output = Command::new(cargo_bin!("split-ledger"))
        .arg("import")
        .arg(&output_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Binary failed to import 50k rows");

    // Every row: Hồng pays 30 for three
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hong,1500000,500000,1000000"));
    assert!(stdout.contains("binh,hong,500000"));
    assert!(stdout.contains("minh,hong,500000"));
}

#[test]
fn test_large_random_import() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("large_random_test.csv");
    common::generate_random_csv(&output_path, 20_000).expect("Failed to generate large CSV");

    let status = Command::new(cargo_bin!("split-ledger"))
        .arg("import")
        .arg(&output_path)
        .status()
        .expect("Failed to execute command");
    assert!(status.success(), "Binary failed to import 20k random rows");
}
