//! Relatórios de texto para o terminal

use integracar_common::aggregate::GroupCount;
use integracar_common::geo::MapView;
use integracar_common::pipeline::{CriticalPending, DistinctCounts, Summary};
use integracar_common::sla::format_percentage;
use integracar_common::{ColumnRoleMap, DashboardView, PivotTable, Role, StatusClass};
use serde::Serialize;
use std::fmt::Write;

/// Corpo do `summary --json`
#[derive(Serialize)]
pub struct SummaryReport<'a> {
    pub summary: &'a Summary,
    pub distinct: &'a DistinctCounts,
    pub municipios: &'a [GroupCount],
    pub campi: &'a [GroupCount],
    pub avaliadores: &'a [GroupCount],
    pub statuses: &'a [GroupCount],
}

fn head(counts: &[GroupCount], top: usize) -> &[GroupCount] {
    &counts[..counts.len().min(top)]
}

impl<'a> SummaryReport<'a> {
    pub fn new(view: &'a DashboardView, top: usize) -> Self {
        Self {
            summary: &view.summary,
            distinct: &view.distinct,
            municipios: head(&view.municipios, top),
            campi: head(&view.campi, top),
            avaliadores: head(&view.avaliadores, top),
            statuses: head(&view.statuses, top),
        }
    }
}

pub fn render_columns(roles: &ColumnRoleMap, headers: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Colunas detectadas ({} cabeçalhos):", headers.len());
    for role in Role::ALL {
        match roles.get(role) {
            Some(header) => {
                let _ = writeln!(out, "  ✔ {:<10} → {}", role.as_str(), header);
            }
            None => {
                let _ = writeln!(out, "  - {:<10} (não encontrada)", role.as_str());
            }
        }
    }
    out
}

fn render_ranking(out: &mut String, title: &str, counts: &[GroupCount], top: usize) {
    let _ = writeln!(out, "\n{}:", title);
    if counts.is_empty() {
        let _ = writeln!(out, "  (vazio)");
        return;
    }
    for (i, group) in counts.iter().take(top).enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<40} {:>5}", i + 1, group.label, group.count);
    }
    if counts.len() > top {
        let _ = writeln!(out, "  ... e mais {}", counts.len() - top);
    }
}

pub fn render_summary(view: &DashboardView, top: usize) -> String {
    let s = &view.summary;
    let mut out = String::new();

    let _ = writeln!(out, "Processos no recorte: {}", s.total);
    for class in StatusClass::ALL {
        let _ = writeln!(out, "  {:<12} {:>5}", class.label(), s.classes.get(class));
    }
    let _ = writeln!(
        out,
        "  (concluídos: {} positivos, {} negativos)",
        s.classes.positive, s.classes.negative
    );

    let _ = writeln!(
        out,
        "\nDentro da meta: {} ({} de {} avaliados)",
        format_percentage(s.sla_percentage),
        s.sla.within_target,
        s.sla.evaluated
    );
    let _ = writeln!(
        out,
        "Meta padrão de {} dias: {} ({} de {})",
        s.default_deadline_days,
        format_percentage(s.default_deadline_percentage),
        s.sla.default_deadline_within,
        s.sla.default_deadline_total
    );
    let _ = writeln!(out, "Concluídos fora da meta: {}", s.sla.completed_outside_target);

    let _ = writeln!(
        out,
        "\nCampi: {}  Municípios: {}  Avaliadores: {}",
        view.distinct.campuses, view.distinct.municipalities, view.distinct.evaluators
    );

    render_ranking(&mut out, "Municípios", &view.municipios, top);
    render_ranking(&mut out, "Campi", &view.campi, top);
    render_ranking(&mut out, "Avaliadores", &view.avaliadores, top);
    render_ranking(&mut out, "Status", &view.statuses, top);
    out
}

pub fn render_pivot(pivot: &PivotTable, dimension_label: &str) -> String {
    let mut out = String::new();
    let width = pivot
        .rows
        .iter()
        .map(|r| r.label.chars().count())
        .chain(std::iter::once(dimension_label.chars().count()))
        .max()
        .unwrap_or(10)
        .min(40);

    let _ = write!(out, "{:<width$}", dimension_label, width = width);
    for column in &pivot.columns {
        let _ = write!(out, " | {}", column);
    }
    let _ = writeln!(out, " | Total");

    for row in &pivot.rows {
        let _ = write!(out, "{:<width$}", row.label, width = width);
        for (count, column) in row.counts.iter().zip(&pivot.columns) {
            let _ = write!(out, " | {:>w$}", count, w = column.chars().count());
        }
        let _ = writeln!(out, " | {:>5}", row.total);
    }

    let _ = write!(out, "{:<width$}", "Total", width = width);
    for (total, column) in pivot.column_totals.iter().zip(&pivot.columns) {
        let _ = write!(out, " | {:>w$}", total, w = column.chars().count());
    }
    let _ = writeln!(out, " | {:>5}", pivot.grand_total);

    if pivot.total_rows > pivot.rows.len() {
        let _ = writeln!(out, "({} de {} linhas)", pivot.rows.len(), pivot.total_rows);
    }
    if pivot.ignored > 0 {
        let _ = writeln!(out, "({} registros com status fora das colunas)", pivot.ignored);
    }
    out
}

pub fn render_pendencias(pendencias: &[CriticalPending]) -> String {
    let mut out = String::new();
    if pendencias.is_empty() {
        let _ = writeln!(out, "Nenhuma pendência crítica.");
        return out;
    }

    let _ = writeln!(out, "Pendências críticas: {}", pendencias.len());
    for p in pendencias {
        let situacao = if p.remaining_days < 0 {
            format!("atrasado {} dias", -p.remaining_days)
        } else {
            format!("faltam {} dias", p.remaining_days)
        };
        let codigo = if p.codigo.is_empty() { "-" } else { p.codigo.as_str() };
        let _ = writeln!(
            out,
            "  {} | {} / {} | {} | {}/{} dias | {} | {}",
            codigo, p.campus, p.municipio, p.status, p.elapsed_days, p.deadline_days, p.avaliador, situacao
        );
    }
    out
}

pub fn render_map(map: &MapView) -> String {
    let mut out = String::new();
    let b = &map.bounds;
    let _ = writeln!(
        out,
        "Enquadramento: lon [{:.3}, {:.3}] lat [{:.3}, {:.3}]",
        b.min_lon, b.max_lon, b.min_lat, b.max_lat
    );
    for p in &map.points {
        let _ = writeln!(out, "  {:<30} {:>8.3} {:>8.3} {:>5}", p.municipio, p.lon, p.lat, p.count);
    }
    if !map.unplaced.is_empty() {
        let _ = writeln!(out, "Sem centroide:");
        for g in &map.unplaced {
            let _ = writeln!(out, "  {:<30} {:>5}", g.label, g.count);
        }
    }
    out
}
