use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECIBO: &str = "RECIBO\n\
Recebi de MARIA DE SOUZA, CPF 123.456.789-09, a importância de R$ 2.300,00\n\
referente a serviços de pintura, dando plena quitação.\n\
Recife, 10/04/2024\n";

/// A `brdoc` command isolated from the user's configuration.
fn brdoc(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("brdoc").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"));
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_models_list() {
    let home = TempDir::new().unwrap();
    brdoc(&home)
        .args(["models", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contracheque"))
        .stdout(predicate::str::contains("Recibo de Pagamento"))
        .stdout(predicate::str::contains("Boleto Bancário"));
}

#[test]
fn test_models_show_unknown_fails() {
    let home = TempDir::new().unwrap();
    brdoc(&home)
        .args(["models", "show", "Modelo Inexistente"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown document model"));
}

#[test]
fn test_process_text_file_as_json() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "recibo.txt", RECIBO);

    brdoc(&home)
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"model\": \"Recibo de Pagamento\""))
        .stdout(predicate::str::contains("2.300,00"))
        .stdout(predicate::str::contains("generated_at"));
}

#[test]
fn test_process_csv_to_file() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "recibo.txt", RECIBO);
    let output = home.path().join("recibo.csv");

    brdoc(&home)
        .arg("process")
        .arg(&input)
        .args(["-f", "csv", "-o"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("tipo_documento;valor;data;cpf\n"));
    assert!(csv.contains("Recibo de Pagamento;2.300,00;10/04/2024;123.456.789-09"));
}

#[test]
fn test_process_missing_file_fails() {
    let home = TempDir::new().unwrap();
    brdoc(&home)
        .args(["process", "nao_existe.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_unknown_model_fails() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "recibo.txt", RECIBO);
    brdoc(&home)
        .arg("process")
        .arg(&input)
        .args(["-m", "Modelo Inexistente"])
        .assert()
        .failure();
}

#[test]
fn test_entities_report() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "recibo.txt", RECIBO);

    brdoc(&home)
        .arg("entities")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cpf\""))
        .stdout(predicate::str::contains("123.456.789-09"))
        .stdout(predicate::str::contains("TIPO_DOC"));
}

#[test]
fn test_batch_with_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("entrada");
    fs::create_dir_all(&inputs).unwrap();
    write(&inputs, "a.txt", RECIBO);
    write(&inputs, "b.pdf", "não é um PDF");
    write(&inputs, "c.txt", "   ");
    let out_dir = home.path().join("saida");

    brdoc(&home)
        .arg("batch")
        .arg(format!("{}/*", inputs.display()))
        .arg("-d")
        .arg(&out_dir)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(out_dir.join("a.json").exists());
    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt;ok;Recibo de Pagamento"));
    assert!(summary.contains("b.pdf;erro"));
    assert!(summary.contains("c.txt;ok"));
}

#[test]
fn test_config_init_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("brdoc.json");

    brdoc(&home)
        .args(["config", "init", "-o"])
        .arg(&config)
        .assert()
        .success();

    brdoc(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "ocr.language"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"por\""));
}
