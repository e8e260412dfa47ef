//! Gravação do recorte filtrado (CSV / XLSX)

use crate::error::{IntegraCarError, Result};
use integracar_common::export::{excel_core, ExportTable};
use integracar_common::PivotTable;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            _ => Err(format!("Formato desconhecido: {}. Use csv ou xlsx", s)),
        }
    }
}

/// Nome de arquivo a partir do nome da planilha ("CAR 2024 (final)" → "CAR_2024_final")
pub fn file_stem_for(input: &Path) -> String {
    lazy_static! {
        static ref UNSAFE: Regex = Regex::new(r"[^\p{L}\p{N}_-]+").unwrap();
    }
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("recorte");
    let cleaned = UNSAFE.replace_all(stem, "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "recorte".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Caminho final: diretório / sem extensão recebe `<entrada>_recorte.<ext>`
pub fn output_path_for_format(output: Option<&Path>, input: &Path, format: ExportFormat) -> PathBuf {
    let file_name = format!("{}_recorte.{}", file_stem_for(input), format.extension());
    match output {
        Some(out) if out.is_dir() || out.extension().is_none() => out.join(file_name),
        Some(out) => out.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}

/// CSV com `;` e todos os campos entre aspas
pub fn write_csv(table: &ExportTable, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_xlsx(table: &ExportTable, pivot: Option<(&PivotTable, &str)>, path: &Path) -> Result<()> {
    let buffer = excel_core::generate_excel_buffer(table, pivot)?;
    std::fs::write(path, buffer)?;
    Ok(())
}

/// Grava no formato escolhido e devolve o caminho usado
pub fn export_table(
    table: &ExportTable,
    pivot: Option<(&PivotTable, &str)>,
    format: ExportFormat,
    path: &Path,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(IntegraCarError::FileNotFound(parent.display().to_string()));
        }
    }

    match format {
        ExportFormat::Csv => write_csv(table, path)?,
        ExportFormat::Xlsx => write_xlsx(table, pivot, path)?,
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_file_stem_for() {
        assert_eq!(file_stem_for(Path::new("/tmp/CAR 2024 (final).xlsx")), "CAR_2024_final");
        assert_eq!(file_stem_for(Path::new("análise.csv")), "análise");
        assert_eq!(file_stem_for(Path::new("(((.csv")), "recorte");
    }

    #[test]
    fn test_output_path_for_format() {
        let input = Path::new("/dados/car.csv");
        assert_eq!(
            output_path_for_format(None, input, ExportFormat::Xlsx),
            PathBuf::from("/dados/car_recorte.xlsx")
        );
        assert_eq!(
            output_path_for_format(Some(Path::new("/saida/final.csv")), input, ExportFormat::Csv),
            PathBuf::from("/saida/final.csv")
        );
        assert_eq!(
            output_path_for_format(Some(Path::new("/saida")), input, ExportFormat::Csv),
            PathBuf::from("/saida/car_recorte.csv")
        );
    }
}
