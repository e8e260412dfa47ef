//! Exportação CSV/XLSX do recorte

use integracar::config::Config;
use integracar::export::{self, ExportFormat};
use integracar::loader;
use integracar::session::{resolve_now, Session};
use integracar_common::export::{export_table, DERIVED_COLUMNS};
use integracar_common::{Dimension, RecordFilter};
use tempfile::tempdir;

const CSV: &str = "\
Campus,Município,Status,Data de abertura,Meta
Campus Alegre,Alegre - ES,03 - Aprovado,2024-06-10,15 dias
Vitória,vitoria,Pendente,2024-06-01,
";

fn session(dir: &std::path::Path) -> (std::path::PathBuf, Session) {
    let input = dir.join("car.csv");
    std::fs::write(&input, CSV).unwrap();
    let session = Session::open(&input, &Config::default(), None).unwrap();
    (input, session)
}

#[test]
fn test_csv_export() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (input, mut session) = session(dir.path());
    let view = session.refresh(&RecordFilter::default(), resolve_now(Some("2024-06-30")).unwrap());
    let table = export_table(&session.state, &view);

    let path = export::output_path_for_format(None, &input, ExportFormat::Csv);
    let written = export::export_table(&table, None, ExportFormat::Csv, &path).unwrap();
    assert_eq!(written, dir.path().join("car_recorte.csv"));

    let content = std::fs::read_to_string(&written).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("\"Campus\";\"Município\";"));
    assert_eq!(header.split(';').count(), 5 + DERIVED_COLUMNS.len());

    let first = lines.next().unwrap();
    assert!(first.contains("\"Alegre\""));
    assert!(first.contains("\"concluido\""));
    assert_eq!(lines.count(), 1);
}

#[test]
fn test_csv_export_filtered() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (_, mut session) = session(dir.path());
    let filter = RecordFilter { municipio: Some("VITORIA".into()), ..RecordFilter::default() };
    let view = session.refresh(&filter, resolve_now(Some("2024-06-30")).unwrap());
    let table = export_table(&session.state, &view);
    assert_eq!(table.len(), 1);

    let path = dir.path().join("vitoria.csv");
    export::export_table(&table, None, ExportFormat::Csv, &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"vitoria\""));
    assert!(!content.contains("Campus Alegre"));
}

#[test]
fn test_xlsx_export_reads_back() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (_, mut session) = session(dir.path());
    let view = session.refresh(&RecordFilter::default(), resolve_now(Some("2024-06-30")).unwrap());
    let table = export_table(&session.state, &view);
    let pivot = view.status_pivot(Dimension::Municipio, &session.engine.reference().status_labels, 10);

    let path = dir.path().join("saida.xlsx");
    export::export_table(&table, Some((&pivot, "Município")), ExportFormat::Xlsx, &path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    // a primeira aba volta pelo mesmo leitor da entrada
    let sheet = loader::load_sheet(&path).unwrap();
    assert_eq!(sheet.headers.len(), 5 + DERIVED_COLUMNS.len());
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(sheet.rows[1].get("Município (canônico)"), Some("Vitória"));
}

#[test]
fn test_export_into_missing_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (_, mut session) = session(dir.path());
    let view = session.refresh(&RecordFilter::default(), resolve_now(Some("2024-06-30")).unwrap());
    let table = export_table(&session.state, &view);

    let path = dir.path().join("nao_existe").join("saida.csv");
    assert!(export::export_table(&table, None, ExportFormat::Csv, &path).is_err());
}
