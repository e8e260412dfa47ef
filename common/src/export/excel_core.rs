//! Geração de XLSX (biblioteca comum)
//!
//! Planilha "Processos" com o recorte e, opcionalmente, uma planilha "Pivô"
//! com mapa de calor nas células.

use super::ExportTable;
use crate::aggregate::{heat_color, PivotTable};
use crate::error::{Error, Result};
use rust_xlsxwriter::*;

const DATA_SHEET: &str = "Processos";
const PIVOT_SHEET: &str = "Pivô";

fn export_error(context: &str, e: XlsxError) -> Error {
    Error::Export(format!("{}: {}", context, e))
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x1F6F43))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn write_table(worksheet: &mut Worksheet, table: &ExportTable) -> Result<()> {
    let header_format = header_format();
    let cell_format = Format::new()
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, header, &header_format)
            .map_err(|e| export_error("cabeçalho", e))?;
        let width = (header.chars().count() as f64 + 2.0).clamp(10.0, 40.0);
        worksheet
            .set_column_width(col, width)
            .map_err(|e| export_error("largura de coluna", e))?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string_with_format(r, col as u16, value, &cell_format)
                .map_err(|e| export_error("célula", e))?;
        }
    }

    if !table.headers.is_empty() {
        worksheet
            .set_freeze_panes(1, 0)
            .map_err(|e| export_error("painel congelado", e))?;
        worksheet
            .autofilter(0, 0, table.rows.len() as u32, table.headers.len() as u16 - 1)
            .map_err(|e| export_error("autofiltro", e))?;
    }

    Ok(())
}

fn write_pivot(worksheet: &mut Worksheet, pivot: &PivotTable, dimension_label: &str) -> Result<()> {
    let header_format = header_format();
    let total_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let range = pivot.cell_range();
    let total_col = pivot.columns.len() as u16 + 1;

    worksheet
        .write_string_with_format(0, 0, dimension_label, &header_format)
        .map_err(|e| export_error("cabeçalho do pivô", e))?;
    for (c, column) in pivot.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, c as u16 + 1, column, &header_format)
            .map_err(|e| export_error("cabeçalho do pivô", e))?;
    }
    worksheet
        .write_string_with_format(0, total_col, "Total", &header_format)
        .map_err(|e| export_error("cabeçalho do pivô", e))?;
    worksheet
        .set_column_width(0, 32.0)
        .map_err(|e| export_error("largura de coluna", e))?;

    for (i, row) in pivot.rows.iter().enumerate() {
        let r = i as u32 + 1;
        worksheet
            .write_string(r, 0, &row.label)
            .map_err(|e| export_error("linha do pivô", e))?;

        for (c, count) in row.counts.iter().enumerate() {
            let mut format = Format::new().set_border(FormatBorder::Hair);
            if let Some((lo, hi)) = range {
                if let Some((red, green, blue)) = heat_color(*count, lo, hi) {
                    let rgb = (u32::from(red) << 16) | (u32::from(green) << 8) | u32::from(blue);
                    format = format.set_background_color(Color::RGB(rgb));
                }
            }
            worksheet
                .write_number_with_format(r, c as u16 + 1, *count as f64, &format)
                .map_err(|e| export_error("célula do pivô", e))?;
        }

        worksheet
            .write_number_with_format(r, total_col, row.total as f64, &total_format)
            .map_err(|e| export_error("total do pivô", e))?;
    }

    let footer = pivot.rows.len() as u32 + 1;
    worksheet
        .write_string_with_format(footer, 0, "Total", &total_format)
        .map_err(|e| export_error("rodapé do pivô", e))?;
    for (c, total) in pivot.column_totals.iter().enumerate() {
        worksheet
            .write_number_with_format(footer, c as u16 + 1, *total as f64, &total_format)
            .map_err(|e| export_error("rodapé do pivô", e))?;
    }
    worksheet
        .write_number_with_format(footer, total_col, pivot.grand_total as f64, &total_format)
        .map_err(|e| export_error("rodapé do pivô", e))?;

    Ok(())
}

/// Gera o XLSX em memória
///
/// # Arguments
/// * `table` - recorte filtrado (ver [`super::export_table`])
/// * `pivot` - pivô opcional com o rótulo da dimensão
pub fn generate_excel_buffer(table: &ExportTable, pivot: Option<(&PivotTable, &str)>) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(DATA_SHEET)
        .map_err(|e| export_error("nome da planilha", e))?;
    write_table(worksheet, table)?;

    if let Some((pivot, dimension_label)) = pivot {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(PIVOT_SHEET)
            .map_err(|e| export_error("nome da planilha", e))?;
        write_pivot(worksheet, pivot, dimension_label)?;
    }

    workbook.save_to_buffer().map_err(|e| export_error("gravação do XLSX", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::status_pivot;

    fn table() -> ExportTable {
        ExportTable {
            headers: vec!["Município".into(), "Status".into()],
            rows: vec![
                vec!["Serra".into(), "03 - Aprovado".into()],
                vec!["Vitória".into(), "".into()],
            ],
        }
    }

    #[test]
    fn test_generate_excel_buffer() {
        let buffer = generate_excel_buffer(&table(), None).unwrap();
        // XLSX é um zip
        assert_eq!(&buffer[..2], b"PK");
    }

    #[test]
    fn test_generate_with_pivot() {
        let labels = vec!["03 - Aprovado".to_string(), "02 - Reprovado".to_string()];
        let pivot = status_pivot([("Serra", "03 - Aprovado"), ("Vitória", "02 - Reprovado")], &labels, 10);
        let buffer = generate_excel_buffer(&table(), Some((&pivot, "Município"))).unwrap();
        assert!(buffer.len() > 100);
    }

    #[test]
    fn test_empty_table() {
        let buffer = generate_excel_buffer(&ExportTable::default(), None).unwrap();
        assert_eq!(&buffer[..2], b"PK");
    }
}
