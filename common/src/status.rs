//! Classificação de status
//!
//! Função total sobre o texto normalizado. A ordem de precedência é fixa:
//! concluído > em análise > pendente > outros.

use crate::text;
use serde::{Deserialize, Serialize};

const POSITIVE_KEYWORDS: &[&str] = &["aprov", "defer", "emitido"];
const NEGATIVE_KEYWORDS: &[&str] = &["reprov", "indefer", "cancel", "nao aprov", "nao defer"];
const UNDER_REVIEW_KEYWORDS: &[&str] = &["analise", "andamento"];
const PENDING_KEYWORDS: &[&str] = &["pend", "aguard", "nao iniciado", "notificacao"];

/// Classe do status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Completed,
    UnderReview,
    Pending,
    Other,
    Undefined,
}

impl StatusClass {
    pub const ALL: [StatusClass; 5] = [
        StatusClass::Completed,
        StatusClass::UnderReview,
        StatusClass::Pending,
        StatusClass::Other,
        StatusClass::Undefined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Completed => "concluido",
            StatusClass::UnderReview => "em_analise",
            StatusClass::Pending => "pendente",
            StatusClass::Other => "outros",
            StatusClass::Undefined => "indefinido",
        }
    }

    /// Rótulo para relatórios
    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Completed => "Concluídos",
            StatusClass::UnderReview => "Em análise",
            StatusClass::Pending => "Pendentes",
            StatusClass::Other => "Outros",
            StatusClass::Undefined => "Sem status",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatusClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match text::normalize(s).replace(' ', "_").as_str() {
            "concluido" | "completed" => Ok(StatusClass::Completed),
            "em_analise" | "under_review" => Ok(StatusClass::UnderReview),
            "pendente" | "pending" => Ok(StatusClass::Pending),
            "outros" | "other" => Ok(StatusClass::Other),
            "indefinido" | "undefined" => Ok(StatusClass::Undefined),
            _ => Err(format!("Classe de status desconhecida: {}", s)),
        }
    }
}

/// Desfecho de um processo concluído
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Aprovado, deferido, emitido
    Positive,
    /// Reprovado, indeferido, cancelado
    Negative,
    /// Processo não concluído
    Neutral,
}

/// Classe e polaridade juntas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub class: StatusClass,
    pub polarity: Polarity,
}

fn contains_any(key: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| key.contains(k))
}

/// Classifica o status bruto
pub fn classify(raw: &str) -> StatusClass {
    classify_with_polarity(raw).class
}

/// Classifica e informa a polaridade do desfecho
///
/// "indeferido" contém "defer" e "não aprovado" contém "aprov", por isso os
/// termos negativos são testados antes dos positivos.
pub fn classify_with_polarity(raw: &str) -> Classification {
    let key = text::normalize(raw);

    let (class, polarity) = if key.is_empty() {
        (StatusClass::Undefined, Polarity::Neutral)
    } else if contains_any(&key, NEGATIVE_KEYWORDS) {
        (StatusClass::Completed, Polarity::Negative)
    } else if contains_any(&key, POSITIVE_KEYWORDS) {
        (StatusClass::Completed, Polarity::Positive)
    } else if contains_any(&key, UNDER_REVIEW_KEYWORDS) {
        (StatusClass::UnderReview, Polarity::Neutral)
    } else if contains_any(&key, PENDING_KEYWORDS) {
        (StatusClass::Pending, Polarity::Neutral)
    } else {
        (StatusClass::Other, Polarity::Neutral)
    };

    Classification { class, polarity }
}

/// Indica se o status dispensa o prazo padrão ("finalizado", "autuado")
pub fn is_terminal(raw: &str, terminal_keywords: &[String]) -> bool {
    let key = text::normalize(raw);
    !key.is_empty()
        && terminal_keywords
            .iter()
            .map(|k| text::normalize(k))
            .any(|k| !k.is_empty() && key.contains(&k))
}
