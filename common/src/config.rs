//! Parâmetros do motor
//!
//! Os valores padrão são os observados nos painéis (prazo de 30 dias,
//! tolerância de 2–3 edições, janela crítica de 5 dias).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Prazo padrão (dias) quando a planilha não traz meta explícita
pub const DEFAULT_DEADLINE_DAYS: i64 = 30;

/// Limiares do casamento aproximado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// A partir deste tamanho (em caracteres normalizados) a chave é "longa"
    pub long_key_min_chars: usize,
    /// Distância máxima aceita para chaves longas
    pub long_key_max_distance: usize,
    /// Distância máxima aceita para chaves curtas
    pub short_key_max_distance: usize,
    /// Cada edição tolerada exige ao menos este número de caracteres na chave
    pub min_chars_per_edit: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            long_key_min_chars: 12,
            long_key_max_distance: 3,
            short_key_max_distance: 2,
            min_chars_per_edit: 3,
        }
    }
}

impl FuzzyConfig {
    /// Distância máxima tolerada para uma chave já normalizada
    ///
    /// "uba" não pode virar "iuna" com duas edições em três letras.
    pub fn max_distance(&self, key: &str) -> usize {
        let len = key.chars().count();
        let tier = if len >= self.long_key_min_chars {
            self.long_key_max_distance
        } else {
            self.short_key_max_distance
        };
        match self.min_chars_per_edit {
            0 => tier,
            per_edit => tier.min(len / per_edit),
        }
    }
}

/// Configuração do motor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prazo aplicado quando a coluna de meta está ausente ou inválida
    pub default_deadline_days: i64,
    pub fuzzy: FuzzyConfig,
    /// Tamanho do prefixo de cada token na chave de agrupamento de pessoas
    pub grouping_prefix_len: usize,
    /// Processos com até esta folga (dias) entram nas pendências críticas
    pub critical_window_days: i64,
    /// Trechos de status que isentam o processo do prazo padrão
    pub terminal_keywords: Vec<String>,
    /// Quantidade de itens nos rankings
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_deadline_days: DEFAULT_DEADLINE_DAYS,
            fuzzy: FuzzyConfig::default(),
            grouping_prefix_len: 4,
            critical_window_days: 5,
            terminal_keywords: vec!["finaliz".into(), "autuad".into()],
            top_n: 15,
        }
    }
}

impl EngineConfig {
    /// Rejeita valores sem sentido antes de montar o motor
    pub fn validate(&self) -> Result<()> {
        if self.default_deadline_days <= 0 {
            return Err(Error::Config(format!(
                "prazo padrão deve ser positivo: {}",
                self.default_deadline_days
            )));
        }
        if self.grouping_prefix_len == 0 {
            return Err(Error::Config("grouping_prefix_len deve ser maior que zero".into()));
        }
        if self.critical_window_days < 0 {
            return Err(Error::Config(format!(
                "janela crítica negativa: {}",
                self.critical_window_days
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_distance_scales_with_length() {
        let fuzzy = FuzzyConfig::default();
        assert_eq!(fuzzy.max_distance("iuna"), 1);
        assert_eq!(fuzzy.max_distance("ab"), 0);
        assert_eq!(fuzzy.max_distance("linharez"), 2);
        assert_eq!(fuzzy.max_distance("abcdefghijk"), 2);
        assert_eq!(fuzzy.max_distance("abcdefghijkl"), 3);
        assert_eq!(fuzzy.max_distance("cachoeiro de itapemirim"), 3);
    }

    #[test]
    fn test_max_distance_plain_tiers() {
        let fuzzy = FuzzyConfig { min_chars_per_edit: 0, ..FuzzyConfig::default() };
        assert_eq!(fuzzy.max_distance("uba"), 2);
        assert_eq!(fuzzy.max_distance("ab"), 2);
        assert_eq!(fuzzy.max_distance("abcdefghijk"), 2);
        assert_eq!(fuzzy.max_distance("abcdefghijkl"), 3);
        assert_eq!(fuzzy.max_distance("cachoeiro de itapemirim"), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"default_deadline_days": 45}"#).unwrap();
        assert_eq!(config.default_deadline_days, 45);
        assert_eq!(config.fuzzy, FuzzyConfig::default());
        assert_eq!(config.terminal_keywords, vec!["finaliz", "autuad"]);
    }

    #[test]
    fn test_validate() {
        assert!(EngineConfig::default().validate().is_ok());

        let config = EngineConfig { default_deadline_days: 0, ..EngineConfig::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = EngineConfig { grouping_prefix_len: 0, ..EngineConfig::default() };
        assert!(config.validate().is_err());
    }
}
