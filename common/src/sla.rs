//! Prazo (SLA) dos processos
//!
//! Dias decorridos entre o início e a última atualização (ou "agora"),
//! comparados com a meta explícita ou com o prazo padrão.

use crate::config::EngineConfig;
use crate::status::{self, StatusClass};
use crate::types::ProcessRecord;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

/// Texto exibido quando não há processo avaliado
pub const PERCENT_PLACEHOLDER: &str = "–";

const MILLIS_PER_DAY: i64 = 86_400_000;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Interpreta datas ISO e `dd/mm/aaaa`; qualquer outra coisa é ausência
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Lê a meta em dias pelos dígitos iniciais ("15 dias" → 15)
///
/// Texto sem dígitos iniciais ou com sinal negativo não é meta.
pub fn parse_deadline_days(raw: &str) -> Option<i64> {
    lazy_static::lazy_static! {
        static ref LEADING_DAYS_RE: Regex = Regex::new(r"^\s*\+?(\d+)").unwrap();
    }

    LEADING_DAYS_RE
        .captures(raw)
        .and_then(|cap| cap[1].parse::<i64>().ok())
}

/// Dias inteiros de `start` até `end`, arredondando para baixo
pub fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Resultado da avaliação de prazo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlaOutcome {
    pub elapsed_days: i64,
    /// `None` quando o status terminal dispensou a meta
    pub effective_deadline_days: Option<i64>,
    pub is_default_deadline: bool,
    pub within_target: bool,
    /// Sem meta explícita, mas com status "finalizado"/"autuado"
    pub terminal_exemption: bool,
}

/// Avalia o prazo do registro; `None` quando não há início válido
pub fn evaluate(record: &ProcessRecord, now: NaiveDateTime, config: &EngineConfig) -> Option<SlaOutcome> {
    let start = record.inicio.as_deref().and_then(parse_date)?;
    let reference = record.ultima.as_deref().and_then(parse_date).unwrap_or(now);
    let elapsed_days = days_between(start, reference);

    match record.meta.as_deref().and_then(parse_deadline_days) {
        Some(deadline) => Some(SlaOutcome {
            elapsed_days,
            effective_deadline_days: Some(deadline),
            is_default_deadline: false,
            within_target: elapsed_days <= deadline,
            terminal_exemption: false,
        }),
        None if status::is_terminal(record.status_text(), &config.terminal_keywords) => Some(SlaOutcome {
            elapsed_days,
            effective_deadline_days: None,
            is_default_deadline: true,
            within_target: true,
            terminal_exemption: true,
        }),
        None => Some(SlaOutcome {
            elapsed_days,
            effective_deadline_days: Some(config.default_deadline_days),
            is_default_deadline: true,
            within_target: elapsed_days <= config.default_deadline_days,
            terminal_exemption: false,
        }),
    }
}

/// Folga de um processo em aberto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PendingDeadline {
    pub elapsed_days: i64,
    pub deadline_days: i64,
    /// Prazo menos dias decorridos (negativo = atrasado)
    pub remaining_days: i64,
}

/// Folga do processo quando ele entra na janela crítica
///
/// Processos concluídos, sem início válido ou com meta zero ficam de fora.
/// Aqui o status terminal não dispensa o prazo padrão.
pub fn pending_deadline(
    record: &ProcessRecord,
    class: StatusClass,
    now: NaiveDateTime,
    config: &EngineConfig,
) -> Option<PendingDeadline> {
    if class == StatusClass::Completed {
        return None;
    }

    let start = record.inicio.as_deref().and_then(parse_date)?;
    let reference = record.ultima.as_deref().and_then(parse_date).unwrap_or(now);
    let elapsed_days = days_between(start, reference);

    let deadline_days = record
        .meta
        .as_deref()
        .and_then(parse_deadline_days)
        .unwrap_or(config.default_deadline_days);
    if deadline_days == 0 {
        return None;
    }

    let remaining_days = deadline_days.saturating_sub(elapsed_days);
    (remaining_days <= config.critical_window_days).then_some(PendingDeadline {
        elapsed_days,
        deadline_days,
        remaining_days,
    })
}

/// Percentual inteiro com arredondamento "meio para cima"
pub fn rounded_percentage(part: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let value = (200 * part + total) / (2 * total);
    u8::try_from(value.min(100)).ok()
}

/// Formata o percentual ou o marcador de ausência
pub fn format_percentage(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{}%", v),
        None => PERCENT_PLACEHOLDER.to_string(),
    }
}

/// Agregado de prazo de um conjunto de registros
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlaSummary {
    pub evaluated: usize,
    pub within_target: usize,
    pub outside_target: usize,
    /// Avaliados sem meta explícita
    pub default_deadline_total: usize,
    pub default_deadline_within: usize,
    pub default_deadline_outside: usize,
    /// Concluídos que estouraram o prazo
    pub completed_outside_target: usize,
}

impl SlaSummary {
    pub fn record(&mut self, outcome: &SlaOutcome, class: StatusClass) {
        self.evaluated += 1;
        if outcome.within_target {
            self.within_target += 1;
        } else {
            self.outside_target += 1;
            if class == StatusClass::Completed {
                self.completed_outside_target += 1;
            }
        }

        if outcome.is_default_deadline {
            self.default_deadline_total += 1;
            if outcome.within_target {
                self.default_deadline_within += 1;
            } else {
                self.default_deadline_outside += 1;
            }
        }
    }

    /// Percentual dentro do prazo; `None` quando nada foi avaliado
    pub fn percentage(&self) -> Option<u8> {
        rounded_percentage(self.within_target, self.evaluated)
    }

    /// Percentual de avaliados que usaram o prazo padrão
    pub fn default_deadline_percentage(&self) -> Option<u8> {
        rounded_percentage(self.default_deadline_total, self.evaluated)
    }
}
