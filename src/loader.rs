//! Leitura das planilhas de entrada
//!
//! - CSV: separador `,` ou `;` detectado na linha de cabeçalho
//! - XLSX / XLS / ODS: primeira aba, primeira linha como cabeçalho

use crate::error::{IntegraCarError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate};
use integracar_common::RawRecord;
use log::debug;
use std::path::Path;

/// Planilha carregada: cabeçalhos aparados + linhas não vazias
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl Sheet {
    fn from_rows(headers: Vec<String>, cells: impl IntoIterator<Item = Vec<String>>) -> Self {
        let mut skipped = 0usize;
        let rows: Vec<RawRecord> = cells
            .into_iter()
            .map(|row| {
                RawRecord::new(
                    headers
                        .iter()
                        .enumerate()
                        .map(|(i, h)| (h.as_str(), row.get(i).map(String::as_str).unwrap_or(""))),
                )
            })
            .filter(|record| {
                let blank = record.is_blank();
                if blank {
                    skipped += 1;
                }
                !blank
            })
            .collect();

        if skipped > 0 {
            debug!("{} linhas vazias ignoradas", skipped);
        }
        Self { headers, rows }
    }
}

/// Carrega a planilha pelo tipo da extensão
pub fn load_sheet(path: &Path) -> Result<Sheet> {
    if !path.exists() {
        return Err(IntegraCarError::FileNotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => {
            let bytes = std::fs::read(path)?;
            read_csv(&String::from_utf8_lossy(&bytes))
        }
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook(path),
        _ => Err(IntegraCarError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Separador com mais ocorrências na linha de cabeçalho (`,` no empate)
pub fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

pub fn read_csv(content: &str) -> Result<Sheet> {
    let content = content.trim_start_matches('\u{feff}');
    let delimiter = sniff_delimiter(content);
    debug!("CSV com separador '{}'", delimiter as char);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record?;
        cells.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(Sheet::from_rows(headers, cells))
}

fn read_workbook(path: &Path) -> Result<Sheet> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IntegraCarError::Spreadsheet(e.to_string()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IntegraCarError::Spreadsheet(format!("sem abas: {}", path.display())))?;
    debug!("Lendo aba \"{}\"", sheet_name);

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IntegraCarError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| cell_to_string(c).trim().to_string()).collect(),
        None => return Ok(Sheet::default()),
    };

    let cells = rows.map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    Ok(Sheet::from_rows(headers, cells))
}

/// Texto da célula como apareceria no CSV exportado
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_iso(dt.as_f64()).unwrap_or_default(),
        Data::Error(_) => String::new(),
    }
}

/// `15.0` → `15`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Serial do Excel (dias desde 1899-12-30) em ISO
///
/// Sem fração de dia sai só a data.
pub fn excel_serial_to_iso(serial: f64) -> Option<String> {
    // 9999-12-31
    if !serial.is_finite() || !(0.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    let dt = epoch.checked_add_signed(Duration::seconds(seconds))?;

    if seconds % 86_400 == 0 {
        Some(dt.format("%Y-%m-%d").to_string())
    } else {
        Some(dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}
