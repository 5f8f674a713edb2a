use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MOMO_RECEIPT: &str = "MoMo\nGiao dịch thành công\nMã giao dịch: MOMO123456\nSố tiền: 50.000đ\n";
const ELECTRICITY_BILL: &str = "EVN HCMC\nTiền điện tháng 3\nMã khách hàng: PE0100099999\n-294.948d\n";

/// `hoadon` with the user config directory pointed into `home`.
fn hoadon(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hoadon").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

#[test]
fn process_momo_receipt_as_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("receipt.txt");
    fs::write(&input, MOMO_RECEIPT).unwrap();

    hoadon(&home)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"invoice_code\": \"MOMO-MOMO123456\""))
        .stdout(predicate::str::contains("\"invoice_type\": \"momo_payment\""))
        .stdout(predicate::str::contains("\"fallback\": false"));
}

#[test]
fn process_stdin_as_csv() {
    let home = TempDir::new().unwrap();

    hoadon(&home)
        .args(["process", "-", "--filename", "evn_bill.txt", "-f", "csv"])
        .write_stdin(ELECTRICITY_BILL)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("filename,invoice_code,invoice_type"))
        .stdout(predicate::str::contains("evn_bill.txt,PE0100099999,electricity"))
        .stdout(predicate::str::contains("-294948"));
}

#[test]
fn process_empty_file_returns_placeholder() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("invoice_42.txt");
    fs::write(&input, "").unwrap();

    hoadon(&home)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fallback\": true"))
        .stdout(predicate::str::contains("\"invoice_code\": \"INV-42\""))
        .stderr(predicate::str::contains("review recommended"));
}

#[test]
fn process_missing_file_fails() {
    let home = TempDir::new().unwrap();

    hoadon(&home)
        .args(["process", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_writes_text_output_file() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("bill.txt");
    let output = home.path().join("bill.out");
    fs::write(&input, ELECTRICITY_BILL).unwrap();

    hoadon(&home)
        .arg("process")
        .arg(&input)
        .args(["-f", "text", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("Invoice: PE0100099999"));
    assert!(written.contains("Total: -294,948 VND"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("ocr");
    let outputs = home.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a_momo.txt"), MOMO_RECEIPT).unwrap();
    fs::write(inputs.join("b_evn.txt"), ELECTRICITY_BILL).unwrap();
    fs::write(inputs.join("ignored.png"), "not text").unwrap();

    let pattern = format!("{}/*", inputs.display());
    hoadon(&home)
        .args(["batch", &pattern, "--summary", "-j", "2", "-o"])
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("Summary written to"));

    assert!(outputs.join("a_momo.json").exists());
    assert!(outputs.join("b_evn.json").exists());

    let mut reader = csv::Reader::from_path(outputs.join("summary.csv")).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "a_momo.txt");
    assert_eq!(&rows[0][1], "MOMO-MOMO123456");
    assert_eq!(&rows[1][0], "b_evn.txt");
    assert_eq!(&rows[1][1], "PE0100099999");
}

#[test]
fn batch_keeps_outputs_with_shared_stems() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("ocr");
    let outputs = home.path().join("out");
    fs::create_dir_all(inputs.join("march")).unwrap();
    fs::create_dir_all(inputs.join("april")).unwrap();
    fs::write(inputs.join("april").join("bill.txt"), MOMO_RECEIPT).unwrap();
    fs::write(inputs.join("march").join("bill.txt"), ELECTRICITY_BILL).unwrap();

    let pattern = format!("{}/**/*.txt", inputs.display());
    hoadon(&home)
        .args(["batch", &pattern, "-o"])
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let first = fs::read_to_string(outputs.join("bill.json")).unwrap();
    let second = fs::read_to_string(outputs.join("bill_2.json")).unwrap();
    assert!(first.contains("MOMO-MOMO123456"));
    assert!(second.contains("PE0100099999"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = format!("{}/*.txt", home.path().display());

    hoadon(&home)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set_roundtrip() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("hoadon.json");

    hoadon(&home)
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    hoadon(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.min_text_length"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10"));

    hoadon(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.review_threshold", "0.5"])
        .assert()
        .success();

    hoadon(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.review_threshold"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.5"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("hoadon.json");

    hoadon(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("hoadon.json");
    fs::write(&config, "{}").unwrap();

    hoadon(&home)
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn explicit_config_must_exist() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("receipt.txt");
    fs::write(&input, MOMO_RECEIPT).unwrap();

    hoadon(&home)
        .arg("--config")
        .arg(home.path().join("missing.json"))
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
