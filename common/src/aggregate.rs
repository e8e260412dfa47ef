//! Contagens agrupadas e tabelas dinâmicas
//!
//! Todas as ordenações são estáveis: empate fica na ordem de primeira
//! aparição, então o mesmo lote gera sempre a mesma saída.

use crate::status::StatusClass;
use crate::text;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Rótulo de linha quando a dimensão está vazia
pub const NOT_INFORMED: &str = "Não informado";

/// Quantidade por rótulo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

/// Conta rótulos; maior contagem primeiro, empate pela primeira aparição
pub fn group_counts<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<GroupCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<GroupCount> = Vec::new();

    for label in labels {
        match index.get(label) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(label, counts.len());
                counts.push(GroupCount { label: label.to_string(), count: 1 });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Valor mais frequente (ignora vazios); empate pela primeira aparição
pub fn find_most_frequent<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    group_counts(values.into_iter().filter(|v| !v.is_empty()))
        .into_iter()
        .next()
        .map(|g| g.label)
}

/// Conta pessoas pela chave de agrupamento
///
/// Recebe pares (chave, nome de exibição); o grupo é exibido pelo nome mais
/// frequente entre os seus membros.
pub fn person_group_counts<'a>(people: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<GroupCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(usize, Vec<&str>)> = Vec::new();

    for (key, display) in people {
        match index.get(key) {
            Some(&i) => {
                groups[i].0 += 1;
                groups[i].1.push(display);
            }
            None => {
                index.insert(key, groups.len());
                groups.push((1, vec![display]));
            }
        }
    }

    let mut counts: Vec<GroupCount> = groups
        .into_iter()
        .map(|(count, names)| GroupCount {
            label: find_most_frequent(names.iter().copied()).unwrap_or_default(),
            count,
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Primeiros `n` itens (n = 0 mantém todos)
pub fn top_n(mut counts: Vec<GroupCount>, n: usize) -> Vec<GroupCount> {
    if n > 0 {
        counts.truncate(n);
    }
    counts
}

/// Valores distintos ordenados pela chave normalizada
pub fn unique_sorted<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<(String, String)> = Vec::new();

    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let key = text::normalize(value);
        if seen.insert(key.clone()) {
            out.push((key, value.to_string()));
        }
    }

    out.sort_by(|a, b| a.0.cmp(&b.0));
    out.into_iter().map(|(_, v)| v).collect()
}

/// Linha da tabela dinâmica
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub label: String,
    /// Contagem por coluna, na ordem de `PivotTable::columns`
    pub counts: Vec<usize>,
    pub total: usize,
}

/// Tabela dinâmica dimensão × coluna
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotTable {
    pub columns: Vec<String>,
    /// Linhas exibidas (já cortadas no top N)
    pub rows: Vec<PivotRow>,
    /// Totais por coluna sobre as linhas exibidas
    pub column_totals: Vec<usize>,
    pub grand_total: usize,
    /// Linhas antes do corte
    pub total_rows: usize,
    /// Registros cujo valor não casou com nenhuma coluna
    pub ignored: usize,
}

impl PivotTable {
    /// Monta a tabela a partir de pares (linha, coluna)
    ///
    /// Coluna `None` conta como ignorado, mas a linha ainda aparece (total 0).
    pub fn build<'a>(
        columns: Vec<String>,
        entries: impl IntoIterator<Item = (&'a str, Option<usize>)>,
        top: usize,
    ) -> Self {
        let width = columns.len();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut rows: Vec<PivotRow> = Vec::new();
        let mut ignored = 0;

        for (label, column) in entries {
            let label = if label.trim().is_empty() { NOT_INFORMED } else { label };
            let i = *index.entry(label).or_insert_with(|| {
                rows.push(PivotRow { label: label.to_string(), counts: vec![0; width], total: 0 });
                rows.len() - 1
            });

            match column.filter(|c| *c < width) {
                Some(c) => {
                    rows[i].counts[c] += 1;
                    rows[i].total += 1;
                }
                None => ignored += 1,
            }
        }

        rows.sort_by(|a, b| b.total.cmp(&a.total));
        let total_rows = rows.len();
        if top > 0 {
            rows.truncate(top);
        }

        let mut column_totals = vec![0; width];
        for row in &rows {
            for (total, count) in column_totals.iter_mut().zip(&row.counts) {
                *total += count;
            }
        }
        let grand_total = rows.iter().map(|r| r.total).sum();

        Self { columns, rows, column_totals, grand_total, total_rows, ignored }
    }

    /// Menor e maior contagem entre as células exibidas
    pub fn cell_range(&self) -> Option<(usize, usize)> {
        let mut cells = self.rows.iter().flat_map(|r| r.counts.iter().copied());
        let first = cells.next()?;
        Some(cells.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Tabela por rótulo de status esperado ("01 - Digitalizado e Autuado", ...)
///
/// O status casa pela chave normalizada; fora da lista é ignorado.
pub fn status_pivot<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    status_labels: &[String],
    top: usize,
) -> PivotTable {
    let keys: HashMap<String, usize> = status_labels
        .iter()
        .enumerate()
        .map(|(i, label)| (text::normalize(label), i))
        .collect();

    PivotTable::build(
        status_labels.to_vec(),
        entries
            .into_iter()
            .map(|(row, status)| (row, keys.get(&text::normalize(status)).copied())),
        top,
    )
}

/// Tabela por classe de status
pub fn class_pivot<'a>(entries: impl IntoIterator<Item = (&'a str, StatusClass)>, top: usize) -> PivotTable {
    let columns = StatusClass::ALL.iter().map(|c| c.label().to_string()).collect();
    PivotTable::build(
        columns,
        entries.into_iter().map(|(row, class)| {
            let column = StatusClass::ALL.iter().position(|c| *c == class);
            (row, column)
        }),
        top,
    )
}

/// Cor de fundo da célula: vermelho (baixo) → amarelo → verde (alto)
pub fn heat_color(value: usize, min: usize, max: usize) -> Option<(u8, u8, u8)> {
    if max <= min {
        return None;
    }

    let lerp = |a: f64, b: f64, t: f64| (a + (b - a) * t).round() as u8;
    let t = (value.clamp(min, max) - min) as f64 / (max - min) as f64;

    Some(if t <= 0.5 {
        let tt = t / 0.5;
        (lerp(232.0, 250.0, tt), lerp(110.0, 215.0, tt), lerp(97.0, 105.0, tt))
    } else {
        let tt = (t - 0.5) / 0.5;
        (lerp(250.0, 120.0, tt), lerp(215.0, 200.0, tt), lerp(105.0, 155.0, tt))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[GroupCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|g| (g.label.as_str(), g.count)).collect()
    }

    #[test]
    fn test_group_counts_order() {
        let counts = group_counts(["Serra", "Vitória", "Serra", "Alegre", "Vitória", "Iúna"]);
        assert_eq!(
            labels(&counts),
            vec![("Serra", 2), ("Vitória", 2), ("Alegre", 1), ("Iúna", 1)]
        );
    }

    #[test]
    fn test_group_counts_empty() {
        let empty: [&str; 0] = [];
        assert!(group_counts(empty).is_empty());
    }

    #[test]
    fn test_find_most_frequent() {
        assert_eq!(find_most_frequent(["A", "B", "A", "C", "A"]), Some("A".to_string()));
        assert_eq!(find_most_frequent(["B", "A", "A", "B"]), Some("B".to_string()));
        assert_eq!(find_most_frequent(["", ""]), None);
    }

    #[test]
    fn test_person_group_counts() {
        let people = [
            ("isab rodr", "Isabella Rodrigues"),
            ("isab rodr", "Isabela Rodriguez"),
            ("isab rodr", "Isabela Rodriguez"),
            ("joao silv", "João Silva"),
            ("", "Sem avaliador"),
        ];
        let counts = person_group_counts(people);
        assert_eq!(
            labels(&counts),
            vec![("Isabela Rodriguez", 3), ("João Silva", 1), ("Sem avaliador", 1)]
        );
    }

    #[test]
    fn test_top_n() {
        let counts = group_counts(["a", "b", "b", "c"]);
        assert_eq!(top_n(counts.clone(), 2).len(), 2);
        assert_eq!(top_n(counts, 0).len(), 3);
    }

    #[test]
    fn test_unique_sorted() {
        let values = ["Vitória", "alegre", "VITÓRIA", " ", "Água Doce do Norte", "Alegre"];
        assert_eq!(unique_sorted(values), vec!["Água Doce do Norte", "alegre", "Vitória"]);
    }

    #[test]
    fn test_status_pivot() {
        let status_labels: Vec<String> = ["01 - Digitalizado e Autuado", "02 - Reprovado", "03 - Aprovado"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let entries = [
            ("Alegre", "03 - Aprovado"),
            ("Alegre", "03 – APROVADO"),
            ("Alegre", "02 - Reprovado"),
            ("Serra", "01 - Digitalizado e Autuado"),
            ("Serra", "Em análise"),
            ("", "03 - Aprovado"),
        ];
        let pivot = status_pivot(entries, &status_labels, 0);

        assert_eq!(pivot.rows.len(), 3);
        assert_eq!(pivot.rows[0].label, "Alegre");
        assert_eq!(pivot.rows[0].counts, vec![0, 1, 2]);
        assert_eq!(pivot.rows[0].total, 3);
        assert_eq!(pivot.rows[1].label, "Serra");
        assert_eq!(pivot.rows[2].label, NOT_INFORMED);
        assert_eq!(pivot.ignored, 1);
        assert_eq!(pivot.column_totals, vec![1, 1, 3]);
        assert_eq!(pivot.grand_total, 5);
    }

    #[test]
    fn test_pivot_top_cut_totals() {
        let status_labels = vec!["Aprovado".to_string()];
        let entries = [("A", "Aprovado"), ("A", "Aprovado"), ("B", "Aprovado"), ("C", "x")];
        let pivot = status_pivot(entries, &status_labels, 1);

        assert_eq!(pivot.rows.len(), 1);
        assert_eq!(pivot.total_rows, 3);
        assert_eq!(pivot.grand_total, 2);
        assert_eq!(pivot.column_totals, vec![2]);
    }

    #[test]
    fn test_class_pivot() {
        let entries = [
            ("Alegre", StatusClass::Completed),
            ("Alegre", StatusClass::Pending),
            ("Serra", StatusClass::Undefined),
        ];
        let pivot = class_pivot(entries, 10);
        assert_eq!(pivot.columns.len(), StatusClass::ALL.len());
        assert_eq!(pivot.rows[0].counts, vec![1, 0, 1, 0, 0]);
        assert_eq!(pivot.rows[1].counts, vec![0, 0, 0, 0, 1]);
        assert_eq!(pivot.ignored, 0);
        assert_eq!(pivot.cell_range(), Some((0, 1)));
    }

    #[test]
    fn test_heat_color() {
        assert_eq!(heat_color(5, 5, 5), None);
        assert_eq!(heat_color(0, 0, 10), Some((232, 110, 97)));
        assert_eq!(heat_color(5, 0, 10), Some((250, 215, 105)));
        assert_eq!(heat_color(10, 0, 10), Some((120, 200, 155)));
    }
}
