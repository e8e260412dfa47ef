//! Casos de erro da CLI

use integracar::config::Config;
use integracar::error::IntegraCarError;
use integracar::loader;
use integracar::session::Session;
use std::path::Path;
use tempfile::tempdir;

/// Planilha inexistente
#[test]
fn test_missing_input() {
    let result = loader::load_sheet(Path::new("/nonexistent/path/car.csv"));
    assert!(matches!(result, Err(IntegraCarError::FileNotFound(_))));
}

/// Extensão sem leitor
#[test]
fn test_unsupported_extension() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("car.json");
    std::fs::write(&path, "[]").unwrap();

    let err = loader::load_sheet(&path).unwrap_err();
    assert!(matches!(err, IntegraCarError::UnsupportedFormat(_)));
    assert!(err.to_string().contains(".xlsx"));
}

/// XLSX corrompido
#[test]
fn test_broken_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("car.xlsx");
    std::fs::write(&path, "isto não é um zip").unwrap();

    assert!(matches!(loader::load_sheet(&path), Err(IntegraCarError::Spreadsheet(_))));
}

/// Referência com JSON inválido vira erro do motor
#[test]
fn test_invalid_reference_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("car.csv");
    std::fs::write(&csv, "Campus;Status\nAlegre;Pendente\n").unwrap();
    let reference = dir.path().join("ref.json");
    std::fs::write(&reference, "{ quebrado").unwrap();

    let result = Session::open(&csv, &Config::default(), Some(&reference));
    assert!(matches!(result, Err(IntegraCarError::Common(_))));
}

/// Configuração com prazo inválido
#[test]
fn test_invalid_engine_config() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"engine": {"default_deadline_days": -1}}"#).unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("prazo padrão"));
}

/// Planilha só com cabeçalho
#[test]
fn test_header_only_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv = dir.path().join("vazio.csv");
    std::fs::write(&csv, "Campus;Município;Status\n").unwrap();

    let session = Session::open(&csv, &Config::default(), None).unwrap();
    assert!(session.state.is_empty());
    assert_eq!(session.state.roles().len(), 3);
}
