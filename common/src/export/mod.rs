//! Exportação do recorte filtrado
//!
//! Monta a tabela (colunas originais + colunas derivadas) que a CLI grava em
//! CSV e que `excel_core` grava em XLSX.

#[cfg(feature = "excel")]
pub mod excel_core;

use crate::pipeline::{DashboardState, DashboardView};
use crate::status::Polarity;
use crate::types::NormalizedRecord;

/// Colunas acrescentadas depois das originais
pub const DERIVED_COLUMNS: [&str; 9] = [
    "Município (canônico)",
    "Campus (canônico)",
    "Avaliador (canônico)",
    "Classe do status",
    "Desfecho",
    "Dias decorridos",
    "Meta efetiva (dias)",
    "Meta padrão",
    "Dentro do prazo",
];

/// Tabela pronta para gravação
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn yes_no(value: bool) -> String {
    if value { "Sim" } else { "Não" }.to_string()
}

fn derived_cells(record: &NormalizedRecord) -> Vec<String> {
    let polarity = match record.polarity {
        Polarity::Positive => "positivo",
        Polarity::Negative => "negativo",
        Polarity::Neutral => "",
    };

    let (elapsed, deadline, is_default, within) = match &record.sla {
        Some(outcome) => (
            outcome.elapsed_days.to_string(),
            outcome
                .effective_deadline_days
                .map(|d| d.to_string())
                .unwrap_or_else(|| "isento".to_string()),
            yes_no(outcome.is_default_deadline),
            yes_no(outcome.within_target),
        ),
        None => (String::new(), String::new(), String::new(), String::new()),
    };

    vec![
        record.municipio.clone(),
        record.campus.clone(),
        record.avaliador.clone(),
        record.status_class.as_str().to_string(),
        polarity.to_string(),
        elapsed,
        deadline,
        is_default,
        within,
    ]
}

/// Tabela do recorte: colunas originais na ordem da planilha + derivadas
pub fn export_table(state: &DashboardState, view: &DashboardView) -> ExportTable {
    let original = state.headers();
    let mut headers = original.to_vec();
    headers.extend(DERIVED_COLUMNS.iter().map(|h| h.to_string()));

    let rows = view
        .rows(state)
        .map(|(record, normalized)| {
            let mut cells: Vec<String> = original
                .iter()
                .map(|h| record.raw.get(h).unwrap_or("").to_string())
                .collect();
            cells.extend(derived_cells(normalized));
            cells
        })
        .collect();

    ExportTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Engine, RecordFilter};
    use crate::types::RawRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_export_table_columns() {
        let engine = Engine::espirito_santo().unwrap();
        let rows = vec![
            RawRecord::new([("Município", "serra/es"), ("Status", "Deferido"), ("Meta", "10"), ("Início", "01/06/2024")]),
            RawRecord::new([("Município", "Linharez"), ("Status", ""), ("Meta", ""), ("Início", "")]),
        ];
        let mut state = engine.load(&[], rows);
        let now = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let view = engine.refresh(&mut state, &RecordFilter::default(), now);

        let table = export_table(&state, &view);
        assert_eq!(table.headers.len(), 4 + DERIVED_COLUMNS.len());
        assert_eq!(table.headers[4], "Município (canônico)");
        assert_eq!(table.len(), 2);

        let first = &table.rows[0];
        assert_eq!(first[0], "serra/es");
        assert_eq!(first[4], "Serra");
        assert_eq!(first[7], "concluido");
        assert_eq!(first[8], "positivo");
        assert_eq!(first[9], "4");
        assert_eq!(first[10], "10");
        assert_eq!(first[11], "Não");
        assert_eq!(first[12], "Sim");

        let second = &table.rows[1];
        assert_eq!(second[4], "Linhares");
        assert_eq!(second[7], "indefinido");
        assert_eq!(second[9], "");
    }
}
