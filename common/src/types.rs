//! Tipos de registro
//!
//! - RawRecord: linha da planilha como veio (cabeçalho → texto)
//! - ProcessRecord: campos por papel + a linha original
//! - NormalizedRecord: rótulos canônicos e classe, recalculados a cada atualização

use crate::columns::{ColumnRoleMap, Role};
use crate::sla::SlaOutcome;
use crate::status::{Polarity, StatusClass};
use serde::{Deserialize, Serialize};

/// Linha bruta, na ordem das colunas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Cria a linha aparando cabeçalhos ("NOME MUNICÍPIO ") e valores
    pub fn new<K, V, I>(fields: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_string(), v.as_ref().trim().to_string()))
                .collect(),
        }
    }

    /// Valor da coluna (primeira ocorrência do cabeçalho)
    pub fn get(&self, header: &str) -> Option<&str> {
        let header = header.trim();
        self.fields
            .iter()
            .find(|(k, _)| k == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Todas as células vazias
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }
}

/// Registro de processo tipado
///
/// Cada campo é `None` quando o papel não foi detectado ou a célula está vazia.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub status: Option<String>,
    pub municipio: Option<String>,
    pub campus: Option<String>,
    pub avaliador: Option<String>,
    pub codigo: Option<String>,
    pub inicio: Option<String>,
    pub ultima: Option<String>,
    pub meta: Option<String>,
    pub raw: RawRecord,
}

impl ProcessRecord {
    pub fn from_raw(raw: RawRecord, roles: &ColumnRoleMap) -> Self {
        let pick = |role: Role| -> Option<String> {
            roles
                .get(role)
                .and_then(|header| raw.get(header))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            status: pick(Role::Status),
            municipio: pick(Role::Municipio),
            campus: pick(Role::Campus),
            avaliador: pick(Role::Avaliador),
            codigo: pick(Role::Codigo),
            inicio: pick(Role::Inicio),
            ultima: pick(Role::Ultima),
            meta: pick(Role::Meta),
            raw,
        }
    }

    /// Campo do papel
    pub fn field(&self, role: Role) -> Option<&str> {
        match role {
            Role::Status => self.status.as_deref(),
            Role::Municipio => self.municipio.as_deref(),
            Role::Campus => self.campus.as_deref(),
            Role::Avaliador => self.avaliador.as_deref(),
            Role::Codigo => self.codigo.as_deref(),
            Role::Inicio => self.inicio.as_deref(),
            Role::Ultima => self.ultima.as_deref(),
            Role::Meta => self.meta.as_deref(),
        }
    }

    pub fn status_text(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }
}

/// Visão derivada de um registro
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub municipio: String,
    pub campus: String,
    /// Rótulo canônico completo do avaliador
    pub avaliador: String,
    /// Primeiro + último nome, para exibição
    pub avaliador_display: String,
    /// Chave de agrupamento (vazia quando não informado)
    #[serde(skip)]
    pub avaliador_group: String,
    /// Texto do status limpo (sem classificar)
    pub status: String,
    pub status_class: StatusClass,
    pub polarity: Polarity,
    pub sla: Option<SlaOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::detect_columns;

    fn sample() -> (ColumnRoleMap, RawRecord) {
        let raw = RawRecord::new([
            ("Campus ", " Alegre "),
            ("Município", "Alegre"),
            ("Status", ""),
            ("Prazo", "15"),
        ]);
        let headers: Vec<&str> = raw.headers().collect();
        (detect_columns(&headers), raw)
    }

    #[test]
    fn test_raw_record_trims() {
        let (_, raw) = sample();
        assert_eq!(raw.get("Campus"), Some("Alegre"));
        assert_eq!(raw.get("Campus "), Some("Alegre"));
        assert_eq!(raw.get("Avaliador"), None);
        assert!(!raw.is_blank());
        assert!(RawRecord::new([("a", " "), ("b", "")]).is_blank());
    }

    #[test]
    fn test_process_record_fields() {
        let (roles, raw) = sample();
        let record = ProcessRecord::from_raw(raw, &roles);

        assert_eq!(record.campus.as_deref(), Some("Alegre"));
        assert_eq!(record.municipio.as_deref(), Some("Alegre"));
        assert_eq!(record.meta.as_deref(), Some("15"));
        // célula vazia e papel ausente ficam iguais
        assert_eq!(record.status, None);
        assert_eq!(record.avaliador, None);
        assert_eq!(record.status_text(), "");
        assert_eq!(record.field(Role::Meta), Some("15"));
    }
}
