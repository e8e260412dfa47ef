//! Canonicalização de entidades
//!
//! Município, campus e avaliador usam o mesmo algoritmo, com precedência:
//! 1. apelido (tabela explícita)
//! 2. igualdade exata com a lista oficial
//! 3. casamento aproximado dentro do limiar
//! 4. texto limpo original
//!
//! Antes da busca o texto perde sufixos de UF / prefixos de campus e recebe
//! as correções literais de digitação.

use crate::config::FuzzyConfig;
use crate::error::Result;
use crate::fuzzy;
use crate::reference::ReferenceData;
use crate::text;
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Tipo de entidade canonicalizada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Municipio,
    Campus,
    Avaliador,
}

impl EntityKind {
    /// Rótulo usado quando o valor está vazio
    pub fn not_informed(&self) -> &'static str {
        match self {
            EntityKind::Municipio => "Sem município",
            EntityKind::Campus => "Sem campus",
            EntityKind::Avaliador => "Sem avaliador",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Municipio => write!(f, "município"),
            EntityKind::Campus => write!(f, "campus"),
            EntityKind::Avaliador => write!(f, "avaliador"),
        }
    }
}

/// Como o rótulo foi obtido
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MatchSource {
    NotInformed,
    Alias,
    Exact,
    Fuzzy { distance: usize },
    Fallback,
}

/// Resultado de uma canonicalização
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub label: String,
    pub source: MatchSource,
}

/// Canonicalizador de um domínio fechado
///
/// Imutável depois de construído; a memoização fica em [`CanonicalCache`].
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    kind: EntityKind,
    /// Rótulos oficiais na ordem da tabela de referência
    labels: Vec<String>,
    /// Chaves paralelas a `labels`
    keys: Vec<String>,
    exact: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    typo_fixes: Vec<(String, String)>,
    strip_patterns: Vec<Regex>,
    fuzzy: FuzzyConfig,
}

impl Canonicalizer {
    /// Monta o canonicalizador
    ///
    /// # Arguments
    /// * `canonical` - rótulos oficiais (ordem define o desempate)
    /// * `aliases` - apelido → rótulo; o destino entra na lista oficial se faltar
    /// * `typo_fixes` - pares (errado, certo) aplicados à chave normalizada
    /// * `prefixes` - palavras removidas do início ou do fim ("Campus", "Ifes")
    /// * `suffixes` - sufixos de região removidos do fim ("ES")
    pub fn new(
        kind: EntityKind,
        canonical: &[String],
        aliases: &BTreeMap<String, String>,
        typo_fixes: &[(String, String)],
        prefixes: &[String],
        suffixes: &[String],
        fuzzy: FuzzyConfig,
    ) -> Result<Self> {
        let mut strip_patterns = Vec::new();
        for word in suffixes.iter().chain(prefixes) {
            strip_patterns.push(suffix_pattern(word)?);
        }
        for word in prefixes {
            strip_patterns.push(prefix_pattern(word)?);
        }

        let mut canon = Self {
            kind,
            labels: Vec::new(),
            keys: Vec::new(),
            exact: HashMap::new(),
            aliases: HashMap::new(),
            typo_fixes: typo_fixes
                .iter()
                .map(|(from, to)| (text::normalize(from), text::normalize(to)))
                .filter(|(from, to)| !from.is_empty() && from != to)
                .collect(),
            strip_patterns,
            fuzzy,
        };

        for label in canonical {
            canon.push_label(label);
        }

        for (alias, target) in aliases {
            let key = canon.key(&canon.clean(alias));
            if key.is_empty() {
                continue;
            }
            let target = text::clean(target);
            if let Some(&index) = canon.exact.get(&key) {
                if canon.labels[index] != target {
                    warn!(
                        "apelido de {} ignorado: '{}' já é o rótulo oficial '{}'",
                        kind, alias, canon.labels[index]
                    );
                }
                continue;
            }
            canon.push_label(&target);
            canon.aliases.insert(key, target);
        }

        Ok(canon)
    }

    /// Canonicalizador de municípios a partir dos dados de referência
    pub fn municipio(reference: &ReferenceData, fuzzy: FuzzyConfig) -> Result<Self> {
        let labels: Vec<String> = reference.municipalities.iter().map(|m| m.name.clone()).collect();
        Self::new(
            EntityKind::Municipio,
            &labels,
            &reference.aliases.municipio,
            &reference.typo_fixes.municipio,
            &[],
            &reference.region_suffixes,
            fuzzy,
        )
    }

    /// Canonicalizador de campi a partir dos dados de referência
    pub fn campus(reference: &ReferenceData, fuzzy: FuzzyConfig) -> Result<Self> {
        Self::new(
            EntityKind::Campus,
            &reference.campuses,
            &reference.aliases.campus,
            &reference.typo_fixes.campus,
            &reference.campus_prefixes,
            &reference.region_suffixes,
            fuzzy,
        )
    }

    /// Canonicalizador de avaliadores (sem lista oficial, só apelidos)
    pub fn avaliador(reference: &ReferenceData, fuzzy: FuzzyConfig) -> Result<Self> {
        Self::new(
            EntityKind::Avaliador,
            &[],
            &reference.aliases.avaliador,
            &reference.typo_fixes.avaliador,
            &[],
            &[],
            fuzzy,
        )
    }

    fn push_label(&mut self, label: &str) {
        let label = text::clean(label);
        let key = self.key(&self.clean(&label));
        if key.is_empty() {
            return;
        }
        if let Some(&index) = self.exact.get(&key) {
            if self.labels[index] != label {
                debug!("rótulo de {} duplicado: '{}' ≡ '{}'", self.kind, label, self.labels[index]);
            }
            return;
        }
        self.exact.insert(key.clone(), self.labels.len());
        self.labels.push(label);
        self.keys.push(key);
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Rótulos oficiais (inclui destinos de apelidos)
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Remove sufixos/prefixos e colapsa espaços, preservando caixa
    pub fn clean(&self, raw: &str) -> String {
        let mut current = text::clean(raw);
        // repete até estabilizar: "Serra - ES (ES)"
        loop {
            let mut next = current.clone();
            for pattern in &self.strip_patterns {
                next = pattern.replace(&next, "").into_owned();
            }
            let next = text::collapse_whitespace(&next);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Chave de busca: normalização + correções de digitação
    pub fn key(&self, cleaned: &str) -> String {
        let mut key = text::normalize(cleaned);
        for (from, to) in &self.typo_fixes {
            if key.contains(from.as_str()) {
                key = key.replace(from.as_str(), to);
            }
        }
        key
    }

    /// Resolve o rótulo canônico
    pub fn resolve(&self, raw: &str) -> Resolution {
        let cleaned = self.clean(raw);
        let key = self.key(&cleaned);

        if key.is_empty() || key == text::normalize(self.kind.not_informed()) {
            return Resolution {
                label: self.kind.not_informed().to_string(),
                source: MatchSource::NotInformed,
            };
        }

        if let Some(label) = self.aliases.get(&key) {
            return Resolution { label: label.clone(), source: MatchSource::Alias };
        }

        if let Some(&index) = self.exact.get(&key) {
            return Resolution { label: self.labels[index].clone(), source: MatchSource::Exact };
        }

        if let Some(m) = fuzzy::match_within(&self.fuzzy, &key, self.keys.iter().map(String::as_str)) {
            debug!("{}: '{}' ≈ '{}' (distância {})", self.kind, raw, self.labels[m.index], m.distance);
            return Resolution {
                label: self.labels[m.index].clone(),
                source: MatchSource::Fuzzy { distance: m.distance },
            };
        }

        Resolution { label: text::title_case(&cleaned), source: MatchSource::Fallback }
    }

    /// Rótulo canônico (nunca descarta o valor)
    pub fn canonicalize(&self, raw: &str) -> String {
        self.resolve(raw).label
    }
}

fn suffix_pattern(word: &str) -> Result<Regex> {
    let word = regex::escape(&text::clean(word));
    Ok(Regex::new(&format!(r"(?i)\s*(?:\(\s*{word}\s*\)|[-/,]\s*{word})\s*$"))?)
}

fn prefix_pattern(word: &str) -> Result<Regex> {
    let word = regex::escape(&text::clean(word));
    Ok(Regex::new(&format!(r"(?i)^\s*{word}(?:\s*[-/:]\s*|\s+)"))?)
}

/// Memoização raw → resolução
///
/// Não guarda referência ao canonicalizador: o estado pertence ao chamador
/// e sobrevive entre atualizações do painel.
#[derive(Debug, Clone)]
pub struct CanonicalCache {
    kind: EntityKind,
    memo: HashMap<String, Resolution>,
}

impl CanonicalCache {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind, memo: HashMap::new() }
    }

    /// Resolve usando a memória; só consulta o canonicalizador na primeira vez
    pub fn resolve(&mut self, canonicalizer: &Canonicalizer, raw: &str) -> &Resolution {
        debug_assert_eq!(self.kind, canonicalizer.kind());
        self.memo
            .entry(raw.to_string())
            .or_insert_with(|| canonicalizer.resolve(raw))
    }

    pub fn canonicalize(&mut self, canonicalizer: &Canonicalizer, raw: &str) -> String {
        self.resolve(canonicalizer, raw).label.clone()
    }

    /// Quantidade de valores distintos já vistos
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }
}

/// Chave de agrupamento de pessoas (nunca exibida)
///
/// Primeiro e último token, sem letras repetidas em sequência, truncados em
/// `prefix_len` caracteres: "Isabella Rodrigues" e "Isabela Rodriguez"
/// caem no mesmo grupo sem tabela de apelidos por servidor.
pub fn person_grouping_key(name: &str, prefix_len: usize) -> String {
    let key = text::normalize(name);
    let tokens: Vec<&str> = key.split(' ').filter(|t| !t.is_empty()).collect();

    let part = |token: &str| -> String {
        let mut collapsed = String::with_capacity(token.len());
        let mut last: Option<char> = None;
        for c in token.chars() {
            if last != Some(c) {
                collapsed.push(c);
            }
            last = Some(c);
        }
        collapsed.chars().take(prefix_len).collect()
    };

    match tokens.as_slice() {
        [] => String::new(),
        [only] => part(only),
        [first, .., last] => format!("{} {}", part(first), part(last)),
    }
}

/// Nome de exibição: primeiro + último token, sem alterações
pub fn person_display_name(name: &str) -> String {
    let cleaned = text::clean(name);
    let tokens: Vec<&str> = cleaned.split(' ').collect();
    match tokens.as_slice() {
        [first, .., last] => format!("{} {}", first, last),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn es() -> ReferenceData {
        ReferenceData::espirito_santo()
    }

    #[test]
    fn test_municipio_scenario() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();
        assert_eq!(canon.canonicalize(" Cachoeiro   de Itapemírim "), "Cachoeiro de Itapemirim");
        assert_eq!(canon.canonicalize("cachoeiro de itapemirim"), "Cachoeiro de Itapemirim");
    }

    #[test]
    fn test_municipio_suffixes() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();
        assert_eq!(canon.canonicalize("Serra - ES"), "Serra");
        assert_eq!(canon.canonicalize("Serra/ES"), "Serra");
        assert_eq!(canon.canonicalize("SERRA (ES)"), "Serra");
        assert_eq!(canon.canonicalize("Serra – ES (ES)"), "Serra");
        assert_eq!(canon.canonicalize("Vitória, Espírito Santo"), "Vitória");
    }

    #[test]
    fn test_municipio_typo_fix_and_fuzzy() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();

        let r = canon.resolve("Cachoeiro de Itapemerim");
        assert_eq!(r.label, "Cachoeiro de Itapemirim");
        assert_eq!(r.source, MatchSource::Exact);

        let r = canon.resolve("Linharez");
        assert_eq!(r.label, "Linhares");
        assert_eq!(r.source, MatchSource::Fuzzy { distance: 1 });

        assert_eq!(canon.canonicalize("Sta Teresa"), "Santa Teresa");
    }

    #[test]
    fn test_short_names_do_not_drift() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();
        assert_eq!(canon.canonicalize("Irupí"), "Irupi");
        // "uba" está a 2 edições de "iuna", demais para 3 letras
        let r = canon.resolve("Ubá");
        assert_eq!(r.source, MatchSource::Fallback);
        assert_eq!(r.label, "Ubá");
    }

    #[test]
    fn test_fallback_title_case() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();
        let r = canon.resolve("BELO HORIZONTE - MG");
        assert_eq!(r.source, MatchSource::Fallback);
        assert_eq!(r.label, "Belo Horizonte - Mg");
    }

    #[test]
    fn test_empty_is_not_informed() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();
        assert_eq!(canon.canonicalize(""), "Sem município");
        assert_eq!(canon.canonicalize("   "), "Sem município");
        assert_eq!(canon.canonicalize("(ES)"), "Sem município");
        assert_eq!(canon.canonicalize("Sem município"), "Sem município");
    }

    #[test]
    fn test_alias_precedence_over_fuzzy() {
        let mut aliases = BTreeMap::new();
        // "Serrra" está a 1 edição de "Serra", mas o apelido manda
        aliases.insert("Serrra".to_string(), "Viana".to_string());
        let canonical = vec!["Serra".to_string(), "Viana".to_string()];
        let canon = Canonicalizer::new(
            EntityKind::Municipio,
            &canonical,
            &aliases,
            &[],
            &[],
            &[],
            FuzzyConfig::default(),
        )
        .unwrap();

        let r = canon.resolve("serrra");
        assert_eq!(r.label, "Viana");
        assert_eq!(r.source, MatchSource::Alias);
    }

    #[test]
    fn test_alias_cannot_shadow_canonical() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Serra".to_string(), "Viana".to_string());
        let canonical = vec!["Serra".to_string(), "Viana".to_string()];
        let canon = Canonicalizer::new(
            EntityKind::Municipio,
            &canonical,
            &aliases,
            &[],
            &[],
            &[],
            FuzzyConfig::default(),
        )
        .unwrap();
        assert_eq!(canon.canonicalize("Serra"), "Serra");
    }

    #[test]
    fn test_campus_prefixes() {
        let canon = Canonicalizer::campus(&es(), FuzzyConfig::default()).unwrap();
        assert_eq!(canon.canonicalize("Campus Alegre"), "Alegre");
        assert_eq!(canon.canonicalize("Ifes - Campus Santa Tereza"), "Santa Teresa");
        assert_eq!(canon.canonicalize("Centro Serrano"), "Centro-Serrano");
        assert_eq!(canon.canonicalize("VENDA NOVA - Ifes"), "Venda Nova do Imigrante");
    }

    #[test]
    fn test_avaliador_without_reference() {
        let canon = Canonicalizer::avaliador(&es(), FuzzyConfig::default()).unwrap();
        assert_eq!(canon.canonicalize("MARIA DAS GRAÇAS SOUZA"), "Maria das Graças Souza");
        assert_eq!(canon.canonicalize("João da SILVA"), "João da SILVA");
        assert_eq!(canon.canonicalize(""), "Sem avaliador");
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let data = es();
        let canons = [
            Canonicalizer::municipio(&data, FuzzyConfig::default()).unwrap(),
            Canonicalizer::campus(&data, FuzzyConfig::default()).unwrap(),
            Canonicalizer::avaliador(&data, FuzzyConfig::default()).unwrap(),
        ];
        let inputs = [
            "",
            "Serra - ES - ES",
            "cachoeira de itapemerim",
            "Linharez",
            "BELO HORIZONTE",
            "Campus Campus Alegre",
            "12345",
            "!!!",
            "maria  josé",
            "ES",
            "a",
        ];
        for canon in &canons {
            for input in inputs {
                let once = canon.canonicalize(input);
                assert_eq!(canon.canonicalize(&once), once, "{}: {:?}", canon.kind(), input);
            }
        }
    }

    #[test]
    fn test_cache_memoizes() {
        let canon = Canonicalizer::municipio(&es(), FuzzyConfig::default()).unwrap();
        let mut cache = CanonicalCache::new(EntityKind::Municipio);
        assert!(cache.is_empty());
        assert_eq!(cache.canonicalize(&canon, "vitoria"), "Vitória");
        assert_eq!(cache.canonicalize(&canon, "vitoria"), "Vitória");
        assert_eq!(cache.canonicalize(&canon, "VITÓRIA"), "Vitória");
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.resolve(&canon, "").source, MatchSource::NotInformed);
    }

    #[test]
    fn test_person_grouping_key() {
        assert_eq!(person_grouping_key("Isabella Rodrigues", 4), "isab rodr");
        assert_eq!(person_grouping_key("Isabela  Rodriguez", 4), "isab rodr");
        assert_eq!(person_grouping_key("Isabela Maria Rodrigues", 4), "isab rodr");
        assert_eq!(person_grouping_key("ANNA", 4), "ana");
        assert_eq!(person_grouping_key("Matheus Lopes Carvalho", 4), "math carv");
        assert_eq!(person_grouping_key("", 4), "");
    }

    #[test]
    fn test_person_display_name() {
        assert_eq!(person_display_name("Maria das Graças Souza"), "Maria Souza");
        assert_eq!(person_display_name("  Pedro  "), "Pedro");
        assert_eq!(person_display_name("JOÃO DA SILVA"), "JOÃO SILVA");
        assert_eq!(person_display_name(""), "");
    }
}
